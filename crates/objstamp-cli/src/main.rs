//! Objstamp - content type and cache-control for freshly uploaded objects
//!
//! Receives object-finalize notifications from a Pub/Sub push subscription and
//! patches the object's metadata based on its file extension.

mod commands;

use clap::{Parser, Subcommand};
use commands::OutputFormat;
use objstamp_core::config::ObjstampConfig;
use objstamp_core::Profile;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "objstamp")]
#[command(author = "Objstamp Team")]
#[command(version = objstamp_core::VERSION)]
#[command(about = "Stamps content type and cache-control onto finalized objects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "OBJSTAMP_CONFIG")]
    config: Option<String>,

    /// Bind address
    #[arg(long)]
    bind: Option<String>,

    /// Port number
    #[arg(short, long)]
    port: Option<u16>,

    /// Rule profile (full, cache-only)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Comma separated buckets whose objects may be updated
    #[arg(long, value_delimiter = ',')]
    source_bucket: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server
    Serve,

    /// Show the metadata object names would receive
    Resolve {
        /// Object names
        #[arg(required = true)]
        names: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Load or create config
    let mut config = match &cli.config {
        Some(config_path) => ObjstampConfig::from_file(config_path)?,
        None => ObjstampConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok())?;

    // Override with CLI args
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(profile) = &cli.profile {
        config.rules.profile = profile.parse::<Profile>()?;
    }
    if !cli.source_bucket.is_empty() {
        config.rules.source_buckets = cli.source_bucket;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config);

    match cli.command {
        Some(Commands::Version) => {
            println!("objstamp {}", objstamp_core::VERSION);
        }
        Some(Commands::Resolve { names, output }) => {
            commands::resolve::execute(config.rules.profile, &names, output)?;
        }
        Some(Commands::Serve) | None => {
            commands::serve::execute(config).await?;
        }
    }

    Ok(())
}

fn init_logging(config: &ObjstampConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}
