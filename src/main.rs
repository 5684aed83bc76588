//! Binary entry point: serves the award compilation API over HTTP.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use award_compiler::api::{AppState, create_router};
use award_compiler::config::ConfigLoader;
use award_compiler::engine::Engine;
use award_compiler::staging::StagingLoader;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CONFIG_PATH: &str = "./config/engine.yaml";
const DEFAULT_STAGING_DIR: &str = "./staging";

#[derive(Parser, Debug)]
#[command(
    name = "award-compiler",
    about = "Compile staged award data and calculate auditable pay rates",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Host interface for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Engine configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Root directory of staged award datasets
    #[arg(long)]
    staging_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}

async fn run_server(mut args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = args
        .config
        .take()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let staging_dir = args
        .staging_dir
        .take()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGING_DIR));
    let host = args.host.take().unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = args.port.unwrap_or(DEFAULT_PORT);

    let config = ConfigLoader::load(&config_path)?.into_config();
    let engine = Engine::new(config);
    engine.load_staging(StagingLoader::load_root(&staging_dir)?.into_dataset())?;
    engine.initialize_basic_rules()?;

    let app = create_router(AppState::new(engine));
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "award compiler API ready");
    axum::serve(listener, app).await?;
    Ok(())
}
