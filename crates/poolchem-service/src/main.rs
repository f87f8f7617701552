//! poolchem service - HTTP API for dosing recommendations.
//!
//! Run with: `cargo run -p poolchem-service`

use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use poolchem_service::{AppState, Config, api};
use poolchem_store::Store;

/// poolchem service - HTTP REST API for pool dosing recommendations.
#[derive(Parser, Debug)]
#[command(name = "poolchem-service")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long, global = true)]
    bind: Option<String>,

    /// Database path (overrides config).
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the service in the foreground (default behavior).
    Run,

    /// Load and validate the configuration, then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::CheckConfig) => check_config(&args),
        Some(Command::Run) | None => run_server(args).await,
    }
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(db_path) = &args.database {
        config.storage.path = db_path.clone();
    }

    Ok(config)
}

fn check_config(args: &Args) -> anyhow::Result<()> {
    let config = load_config(args)?;
    config.validate()?;

    println!("Configuration OK");
    println!("  bind:            {}", config.server.bind);
    println!("  request timeout: {}s", config.server.request_timeout_secs);
    println!("  database:        {}", config.storage.path.display());
    Ok(())
}

async fn run_server(args: Args) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("poolchem_service=info".parse()?)
                .add_directive("poolchem_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let config = load_config(&args)?;
    config.validate()?;

    let store = Store::open(&config.storage.path)?;
    let timeout = Duration::from_secs(config.server.request_timeout_secs);
    let bind = config.server.bind.clone();

    let state = AppState::new(store, config);

    let app = Router::new()
        .merge(api::router())
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind.as_str()).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
