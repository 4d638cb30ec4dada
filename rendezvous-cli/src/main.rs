// ABOUTME: Command-line runner for rendezvous exchanges, auctions, and the smaller exercises.
// ABOUTME: Loads optional JSON settings, applies flag overrides, and prints each run's outcome.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use rendezvous::prelude::*;

/// Bounded concurrent exchanges, auctions, and friends
#[derive(Parser, Debug)]
#[command(name = "rendezvous")]
#[command(version)]
struct Args {
    /// JSON settings file with "exchange" and "auction" sections
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Baristas serve customers until the order limit is reached
    Exchange {
        #[arg(long)]
        producers: Option<usize>,
        #[arg(long)]
        consumers: Option<usize>,
        #[arg(long)]
        limit: Option<u64>,
        /// Milliseconds spent on each order
        #[arg(long)]
        work_time_ms: Option<u64>,
    },
    /// An auctioneer sells items to bidders, one round per item
    Auction {
        #[arg(long)]
        bidders: Option<usize>,
        #[arg(long)]
        wallet: Option<u64>,
        /// Seed for reproducible bids
        #[arg(long)]
        seed: Option<u64>,
        /// Item to sell; repeat for several
        #[arg(long = "item")]
        items: Vec<String>,
    },
    /// Spread gossip through a friend graph
    Gossip {
        /// JSON file of [{id, name, friends}]
        #[arg(long)]
        friends: PathBuf,
        /// Friend who starts the gossip; random when omitted
        #[arg(long)]
        root: Option<String>,
    },
    /// Merge albums into one playlist by play count
    Playlist {
        /// JSON file holding an array of albums
        #[arg(long)]
        songs: PathBuf,
    },
    /// Check an expression for balanced brackets
    Brackets {
        #[arg(long)]
        expr: String,
    },
    /// Repeat messages concurrently, or run the walk sequences
    Fanout {
        /// Concurrent copies per message
        #[arg(long, default_value = "3")]
        factor: usize,
        /// Run the owner/dog walk instead of repeating messages
        #[arg(long)]
        walk: bool,
    },
}

const MESSAGES: [&str; 5] = [
    "Hello!",
    "How are you?",
    "Are you just going to repeat what I say?",
    "So immature",
    "Stop copying me!",
];

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let settings = match &args.config {
        Some(path) => {
            let settings = Settings::from_file(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?;
            tracing::info!("Loaded settings from {}", path.display());
            settings
        }
        None => {
            tracing::debug!("No settings file given, using defaults");
            Settings::default()
        }
    };

    match args.command {
        Command::Exchange {
            producers,
            consumers,
            limit,
            work_time_ms,
        } => {
            let mut config = settings.exchange;
            config.producers = producers.unwrap_or(config.producers);
            config.consumers = consumers.unwrap_or(config.consumers);
            config.limit = limit.unwrap_or(config.limit);
            config.work_time_ms = work_time_ms.unwrap_or(config.work_time_ms);
            run_exchange(config).await
        }
        Command::Auction {
            bidders,
            wallet,
            seed,
            items,
        } => {
            let mut config = settings.auction;
            config.bidders = bidders.unwrap_or(config.bidders);
            config.wallet = wallet.unwrap_or(config.wallet);
            config.seed = seed.or(config.seed);
            if !items.is_empty() {
                config.items = items;
            }
            run_auction(config).await
        }
        Command::Gossip { friends, root } => run_gossip(&friends, root.as_deref()),
        Command::Playlist { songs } => run_playlist(&songs),
        Command::Brackets { expr } => {
            if is_balanced(&expr) {
                println!("{} is balanced.", expr);
            } else {
                println!("{} is not balanced.", expr);
            }
            Ok(())
        }
        Command::Fanout { factor, walk } => {
            if walk {
                run_walk().await
            } else {
                run_repeat(factor).await
            }
        }
    }
}

async fn run_exchange(config: ExchangeConfig) -> Result<()> {
    let report = Exchange::new(config)?.run().await?;

    println!(
        "{} of {} orders completed, {} dropped after closing",
        report.completions, report.limit, report.rejected
    );
    for producer in &report.producers {
        println!("  {} served {}", producer.name, producer.units);
    }
    Ok(())
}

async fn run_auction(config: AuctionConfig) -> Result<()> {
    let auction = Auction::new(config)?;
    tracing::info!("Replay this auction with --seed {}", auction.seed());
    let report = auction.run().await?;

    for sale in &report.sales {
        println!(
            "  {} -> {} for {} ({} left)",
            sale.item, sale.winner, sale.amount, sale.remaining_wallet
        );
    }
    Ok(())
}

fn run_gossip(path: &Path, root: Option<&str>) -> Result<()> {
    let graph = FriendGraph::from_file(path)
        .with_context(|| format!("failed to load friends from {}", path.display()))?;
    anyhow::ensure!(!graph.is_empty(), "friend list is empty");

    let root = match root {
        Some(root) => root.to_string(),
        None => {
            let ids = graph.ids();
            ids[rand::thread_rng().gen_range(0..ids.len())].to_string()
        }
    };

    for friend in graph.spread(&root)? {
        println!("{} has heard the gossip!", friend.name);
    }
    Ok(())
}

fn run_playlist(path: &Path) -> Result<()> {
    let albums = load_albums(path)
        .with_context(|| format!("failed to load albums from {}", path.display()))?;

    println!("{:<6}{:<32}{:<24}Play count", "####", "Song", "Album");
    for (i, song) in merge_albums(&albums).iter().enumerate() {
        let rank = format!("[{}]:", i + 1);
        println!(
            "{:<6}{:<32}{:<24}{}",
            rank, song.name, song.album, song.play_count
        );
    }
    Ok(())
}

async fn run_repeat(factor: usize) -> Result<()> {
    for message in MESSAGES {
        println!("[Main]:{}", message);
        fan_out(factor, move |i| async move {
            println!("[G{}]:{}", i, message);
        })
        .await?;
    }
    Ok(())
}

fn chore(who: &'static str, start: &'static str, finish: &'static str) -> Step {
    let pause = Duration::from_millis(500 + rand::thread_rng().gen_range(0..3_000));
    Box::pin(async move {
        println!("{} {}", who, start);
        tokio::time::sleep(pause).await;
        println!("{} {}", who, finish);
    })
}

async fn run_walk() -> Result<()> {
    let owner = Sequence::new("Jimmy")
        .step(chore("Jimmy", "starts putting shoes on.", "finishes putting shoes on."))
        .step(chore("Jimmy", "starts looking for keys.", "has found keys."))
        .step(chore("Jimmy", "starts locking the door.", "has locked the door."));
    let dog = Sequence::new("Lucky")
        .step(chore("Lucky", "goes to fetch leash.", "has fetched leash. Woof woof!"))
        .step(chore("Lucky", "goes to fetch treats.", "has fetched the treats. Woof woof!"))
        .step(chore("Lucky", "starts running outside.", "is having fun outside. Woof woof!"));

    run_sequences(vec![owner, dog]).await?;
    println!("Off for a walk!");
    Ok(())
}
