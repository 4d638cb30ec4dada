// ABOUTME: Playlist merging - k-way merge of per-album song lists by play count.
// ABOUTME: Keeps one head per album in a binary heap; loads albums from JSON.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RosterError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
    pub album: String,
    pub play_count: u64,
}

/// The next unmerged song of one album.
#[derive(Debug, PartialEq, Eq)]
struct Head {
    play_count: u64,
    album: usize,
    position: usize,
}

impl Ord for Head {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on play count; on a tie the lower album index comes out first
        self.play_count
            .cmp(&other.play_count)
            .then_with(|| other.album.cmp(&self.album))
    }
}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Merge albums into one playlist ordered by descending play count.
///
/// Every album must already be sorted by descending play count. The heap
/// never holds more than one song per album. Empty albums contribute nothing.
pub fn merge_albums(albums: &[Vec<Song>]) -> Vec<Song> {
    let total = albums.iter().map(Vec::len).sum();
    let mut playlist = Vec::with_capacity(total);

    let mut heads: BinaryHeap<Head> = albums
        .iter()
        .enumerate()
        .filter_map(|(album, songs)| {
            songs.first().map(|song| Head {
                play_count: song.play_count,
                album,
                position: 0,
            })
        })
        .collect();

    while let Some(head) = heads.pop() {
        let songs = &albums[head.album];
        playlist.push(songs[head.position].clone());

        let position = head.position + 1;
        if let Some(next) = songs.get(position) {
            heads.push(Head {
                play_count: next.play_count,
                album: head.album,
                position,
            });
        }
    }

    playlist
}

/// Parse albums from a JSON array of song arrays.
pub fn parse_albums(json: &str) -> Result<Vec<Vec<Song>>, RosterError> {
    Ok(serde_json::from_str(json)?)
}

/// Load albums from a JSON file.
pub fn load_albums(path: impl AsRef<Path>) -> Result<Vec<Vec<Song>>, RosterError> {
    let content = std::fs::read_to_string(path)?;
    parse_albums(&content)
}
