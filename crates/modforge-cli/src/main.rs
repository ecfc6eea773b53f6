//! Command-line client for the Mod Forge run engine daemon.

mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::DaemonClient;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Exit code for errors returned by the daemon or transport.
const EXIT_RUNTIME_ERROR: i32 = 1;

#[derive(Parser, Debug)]
#[command(name = "modforge", version, about = "Mod Forge run engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of a running `modforge-daemon`.
    #[arg(long, default_value = "http://127.0.0.1:8787", global = true)]
    daemon: String,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Trigger a generate run from a natural-language prompt, then stream
    /// its events until the run reaches a non-running state.
    Generate {
        /// Workspace id to target.
        workspace: String,
        /// Natural-language mod request.
        prompt: String,
    },

    /// Trigger a build run for the workspace's current spec, then stream
    /// its events until the run completes.
    Build {
        /// Workspace id to target.
        workspace: String,
    },

    /// Approve an AWAITING_APPROVAL run's pending deltas.
    Approve {
        /// The run to approve.
        run_id: Uuid,
    },

    /// Reject an AWAITING_APPROVAL run, discarding its pending deltas.
    Reject {
        /// The run to reject.
        run_id: Uuid,
        /// Optional human-readable rejection reason.
        #[arg(long)]
        reason: Option<String>,
    },

    /// Cancel a running run.
    Cancel {
        /// The run to cancel.
        run_id: Uuid,
    },

    /// Print a run's current snapshot (state, progress, log tail).
    Status {
        /// The run to inspect.
        run_id: Uuid,
    },

    /// Replay and follow a run's event log from a given sequence number.
    Events {
        /// The run to follow.
        run_id: Uuid,
        /// Replay events strictly after this sequence number.
        #[arg(long, default_value_t = 0)]
        since: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "modforge=debug,info" } else { "modforge=info,warn" };
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(filter)).init();

    let client = DaemonClient::new(&cli.daemon)?;

    let result = match cli.command {
        Commands::Generate { workspace, prompt } => run_and_follow(&client, client.trigger_generate(&workspace, &prompt)),
        Commands::Build { workspace } => run_and_follow(&client, client.trigger_build(&workspace)),
        Commands::Approve { run_id } => client.approve(run_id, None),
        Commands::Reject { run_id, reason } => client.reject(run_id, reason),
        Commands::Cancel { run_id } => client.cancel(run_id),
        Commands::Status { run_id } => print_status(&client, run_id),
        Commands::Events { run_id, since } => follow_events(&client, run_id, since),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(EXIT_RUNTIME_ERROR);
    }

    Ok(())
}

fn run_and_follow(client: &DaemonClient, run_id: Result<Uuid>) -> Result<()> {
    let run_id = run_id?;
    println!("run {run_id} triggered");
    follow_events(client, run_id, 0)?;
    print_status(client, run_id)
}

fn print_status(client: &DaemonClient, run_id: Uuid) -> Result<()> {
    let run = client.snapshot(run_id)?;
    println!("run {} state={:?} progress={}", run.id, run.state, run.progress);
    for line in &run.log_tail {
        println!("  {line}");
    }
    Ok(())
}

fn follow_events(client: &DaemonClient, run_id: Uuid, since: u64) -> Result<()> {
    client.stream_events(run_id, since, |line| {
        if let Some(payload) = line.strip_prefix("data:") {
            println!("{}", payload.trim());
        }
        true
    })
}
