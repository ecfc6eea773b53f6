//! Entry point for the Mod Forge run-engine daemon: binds an HTTP/SSE
//! listener and serves the router from [`modforge_daemon`].

use anyhow::Context;
use clap::Parser;
use modforge_bus::EventBus;
use modforge_core::config::ForgeConfig;
use modforge_daemon::{build_app, AppState};
use modforge_runtime::{MockOrchestrator, RunController};
use modforge_store::SpecStore;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod collaborators;

/// Command-line arguments for the daemon binary.
#[derive(Debug, Parser)]
#[command(name = "modforge-daemon", about = "Mod Forge run engine daemon")]
struct Args {
    /// Address to bind the HTTP listener to.
    #[arg(long, default_value = "127.0.0.1:8787")]
    bind: String,

    /// Root directory for workspace spec storage and history.
    #[arg(long, default_value = "./modforge-data/specs")]
    specs_root: PathBuf,

    /// Root directory for per-run scratch workspaces and build output.
    #[arg(long, default_value = "./modforge-data/runs")]
    runs_root: PathBuf,

    /// Enable verbose (debug-level) logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.debug { "modforge=debug,tower_http=debug,info" } else { "modforge=info,info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ForgeConfig::default();
    let specs = Arc::new(SpecStore::new(&args.specs_root));
    let bus = Arc::new(EventBus::new(config.event_retention_grace_secs));
    let orchestrator = Arc::new(MockOrchestrator::with_deltas(Vec::new()));
    let builder = collaborators::PlaceholderBuilder::new(std::time::Duration::from_secs(config.cancellation_grace_secs));

    let controller = RunController::new(
        specs,
        bus,
        orchestrator,
        Arc::new(collaborators::PlaceholderTextureGenerator),
        Arc::new(builder),
        &args.runs_root,
        config,
    );

    let state = Arc::new(AppState { controller: Arc::new(controller) });
    let app = build_app(state).layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&args.bind).await.context("binding listener")?;
    info!(bind = %args.bind, "modforge-daemon listening");
    axum::serve(listener, app).await.context("serving requests")?;

    Ok(())
}
