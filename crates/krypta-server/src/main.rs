//! Krypta — end-to-end encrypted file storage server

use clap::Parser;
use krypta_server::{run_server, Settings};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "krypta-server")]
#[command(about = "Server for end-to-end encrypted file storage")]
#[command(version)]
struct Args {
    /// Configuration file (YAML, extension optional)
    #[arg(short, long, default_value = "config", env = "KRYPTA_CONFIG")]
    config: String,

    /// Enable debug logging regardless of configured level
    #[arg(short, long, env = "KRYPTA_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let settings = Settings::load(&args.config)?;

    let level = if args.debug {
        "debug".to_owned()
    } else {
        settings.log.level.clone()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "krypta_server={level},krypta_core={level},krypta_store={level},tower_http=info"
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if settings.log.format == "console" {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    }

    run_server(settings).await
}
