// ABOUTME: Friend graph loaded from JSON, and breadth-first gossip spreading over it.
// ABOUTME: Uses an explicit queue and visited set so cycles and deep graphs are safe.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RosterError;

/// A person and the ids of the people they talk to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub friends: Vec<String>,
}

/// Friends indexed by id.
#[derive(Debug, Clone, Default)]
pub struct FriendGraph {
    friends: HashMap<String, Friend>,
}

impl FriendGraph {
    /// Build a graph. Ids must be unique.
    pub fn new(friends: Vec<Friend>) -> Result<Self, RosterError> {
        let mut map = HashMap::with_capacity(friends.len());
        for friend in friends {
            if map.contains_key(&friend.id) {
                return Err(RosterError::DuplicateFriend(friend.id));
            }
            map.insert(friend.id.clone(), friend);
        }
        Ok(Self { friends: map })
    }

    /// Parse a JSON array of `{id, name, friends}` objects.
    pub fn from_json_str(json: &str) -> Result<Self, RosterError> {
        let friends: Vec<Friend> = serde_json::from_str(json)?;
        Self::new(friends)
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn get(&self, id: &str) -> Option<&Friend> {
        self.friends.get(id)
    }

    pub fn len(&self) -> usize {
        self.friends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.friends.is_empty()
    }

    /// Ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.friends.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Spread gossip from `root` and return everyone who hears it, in the
    /// order they hear it.
    ///
    /// The root hears first, then its friends in listed order, then theirs.
    /// Each person hears at most once. Edges pointing at unknown ids are
    /// skipped with a warning.
    pub fn spread(&self, root: &str) -> Result<Vec<&Friend>, RosterError> {
        let start = self
            .get(root)
            .ok_or_else(|| RosterError::UnknownFriend(root.to_string()))?;

        let mut heard = vec![start];
        let mut visited: HashSet<&str> = HashSet::from([start.id.as_str()]);
        let mut queue: VecDeque<&Friend> = VecDeque::from([start]);
        tracing::debug!(friend = %start.name, "heard the gossip");

        while let Some(current) = queue.pop_front() {
            for id in &current.friends {
                if !visited.insert(id.as_str()) {
                    continue;
                }
                let Some(next) = self.get(id) else {
                    tracing::warn!(from = %current.id, to = %id, "skipping unknown friend");
                    continue;
                };
                tracing::debug!(friend = %next.name, "heard the gossip");
                heard.push(next);
                queue.push_back(next);
            }
        }

        Ok(heard)
    }
}
