//! persistq command-line front-end.
//!
//! Each invocation opens the queue (running recovery), performs one operation
//! and exits.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use persistq::queue::{PersistentQueue, SqliteConfig};
use persistq::telemetry;

#[derive(Parser)]
#[command(name = "persistq", version, about = "Durable FIFO queue backed by SQLite")]
struct Cli {
    /// Path to the queue database (overrides QUEUE_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a payload at the tail, or at a position with --index
    Enqueue {
        payload: String,
        #[arg(long, allow_negative_numbers = true)]
        index: Option<i64>,
    },
    /// Remove the front payload, or the one at --index
    Dequeue {
        #[arg(long, allow_negative_numbers = true)]
        index: Option<i64>,
    },
    /// Show the front payload, or the item at --index
    Peek {
        #[arg(long, allow_negative_numbers = true)]
        index: Option<i64>,
    },
    /// Print the number of queued items
    Size,
    /// List every item front to back
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check the persisted chain against the metadata
    Verify,
    /// Copy the database to a backup file
    Backup { path: PathBuf },
}

fn main() -> ExitCode {
    telemetry::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::from(2)
        }
    }
}

/// Execute one command. `Ok(false)` means the queue rejected the request
/// (empty payload, bad index, empty queue).
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = SqliteConfig::from_env();
    if let Some(db) = cli.db {
        config.path = db;
    }
    let queue = PersistentQueue::open(config)?;

    let accepted = match cli.command {
        Command::Enqueue { payload, index } => {
            let accepted = match index {
                Some(i) => queue.insert_at(i, &payload)?,
                None => queue.enqueue(&payload)?,
            };
            println!("{accepted}");
            accepted
        }
        Command::Dequeue { index } => {
            let removed = match index {
                Some(i) => queue.remove_at(i)?,
                None => queue.dequeue()?,
            };
            print_optional(removed)
        }
        Command::Peek { index } => {
            let payload = match index {
                Some(i) => queue.peek_at(i)?.map(|item| item.payload),
                None => queue.peek()?,
            };
            print_optional(payload)
        }
        Command::Size => {
            println!("{}", queue.size());
            true
        }
        Command::List { json } => {
            let items = queue.items()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for (position, item) in items.iter().enumerate() {
                    println!("{position}\t{}\t{}", item.id, item.payload);
                }
            }
            true
        }
        Command::Verify => {
            queue.verify()?;
            println!("ok");
            true
        }
        Command::Backup { path } => {
            queue.backup_to(&path)?;
            println!("{}", path.display());
            true
        }
    };

    Ok(accepted)
}

fn print_optional(payload: Option<String>) -> bool {
    match payload {
        Some(payload) => {
            println!("{payload}");
            true
        }
        None => {
            println!("(empty)");
            false
        }
    }
}
