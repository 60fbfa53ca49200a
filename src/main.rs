//! `triagedesk` binary: an interactive triage console on stdin.

use clap::{Parser, builder::RangedU64ValueParser};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use triagedesk::{
    console::{self, HELP},
    core::desk::{DeskConfig, TriageDesk},
    runtime::handle::{RuntimeConfig, spawn_desk},
    types::{DEFAULT_INDEX_CAPACITY, DEFAULT_QUEUE_CAPACITY},
};

/// Largest accepted queue bound or registry slot count.
const MAX_CAPACITY: u64 = 1_000_000;

/// Emergency room triage console.
#[derive(Parser, Debug)]
#[command(name = "triagedesk", version)]
struct Args {
    /// Maximum number of queued patients
    #[arg(
        long,
        default_value_t = DEFAULT_QUEUE_CAPACITY,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_CAPACITY)
    )]
    queue_capacity: usize,

    /// Slot count of the patient registry
    #[arg(
        long,
        default_value_t = DEFAULT_INDEX_CAPACITY,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_CAPACITY)
    )]
    index_capacity: usize,

    /// Remove a patient's record once they are treated
    #[arg(long)]
    retire_on_treat: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(args.verbose);

    let config = DeskConfig {
        queue_capacity: args.queue_capacity,
        index_capacity: args.index_capacity,
        retire_on_treat: args.retire_on_treat,
    };
    info!(?config, "starting triage desk");
    let handle = spawn_desk(TriageDesk::new(config), RuntimeConfig::default());

    println!("Emergency Room Triage System");
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let cmd = match console::parse(&line) {
            Ok(cmd) => cmd,
            Err(console::ConsoleError::Empty) => continue,
            Err(err) => {
                println!("Error: {err}");
                continue;
            }
        };

        match console::execute(&handle, cmd).await {
            Ok(reply) => {
                println!("{reply}");
                if reply.is_quit() {
                    break;
                }
            }
            Err(err) => {
                debug!(%err, "command failed");
                println!("Error: {err}");
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}

fn setup_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("triagedesk=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
