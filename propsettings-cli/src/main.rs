//! PropSettings - system property administration
//!
//! Runs the properties REST server with the web settings panel, and
//! provides CLI commands for managing properties on a running server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use propsettings::cli;
use propsettings::registry::{PropertyPolicy, PropertyRegistry};
use propsettings::server::{self, AppState};
use propsettings_shared::RoleInfo;

#[derive(Parser, Debug)]
#[command(name = "propsettings")]
#[command(version)]
#[command(about = "System property administration server and CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Port for the web UI and REST API
    #[arg(short, long, default_value = "8080", env = "PROPSETTINGS_PORT", global = true)]
    port: u16,

    /// Default properties file (TOML)
    #[arg(long, env = "PROPSETTINGS_DEFAULTS", global = true)]
    defaults: Option<PathBuf>,

    /// File that stores operator overrides (TOML)
    #[arg(long, env = "PROPSETTINGS_CUSTOM", global = true)]
    custom: Option<PathBuf>,

    /// Directory with the built web UI
    #[arg(long, env = "PROPSETTINGS_UI_DIR", global = true)]
    ui_dir: Option<PathBuf>,

    /// Serve properties without allowing changes
    #[arg(long, env = "PROPSETTINGS_READ_ONLY", global = true)]
    read_only: bool,

    /// Key prefix of properties that apply without a restart (repeatable)
    #[arg(long = "mutable-prefix", default_value = "detection.", global = true)]
    mutable_prefixes: Vec<String>,

    /// Property that always needs a restart, even with a mutable prefix (repeatable)
    #[arg(long = "restart-key", default_value = "detection.models.dir.path", global = true)]
    restart_keys: Vec<String>,

    /// Open the settings page in a browser after starting
    #[arg(long, global = true)]
    open: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Server URL for CLI commands
    #[arg(long, default_value = "http://localhost:8080", env = "PROPSETTINGS_URL", global = true)]
    url: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the properties server
    Serve,

    /// Manage properties on a running server
    Properties {
        #[command(subcommand)]
        command: cli::PropertyCommands,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Some(Commands::Properties { ref command }) => {
            let client = cli::CliClient::new(&cli.url);
            command.execute(&client).await?;
        }
        Some(Commands::Version) => {
            println!("PropSettings {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve) | None => {
            serve(&cli).await?;
        }
    }

    Ok(())
}

async fn serve(cli: &Cli) -> anyhow::Result<()> {
    info!("Starting PropSettings...");

    let data_dir = get_data_dir();
    let defaults_path = cli.defaults.clone().unwrap_or_else(|| data_dir.join("defaults.toml"));
    let custom_path = cli.custom.clone().unwrap_or_else(|| data_dir.join("custom.toml"));

    let policy = PropertyPolicy {
        mutable_prefixes: cli.mutable_prefixes.clone(),
        restart_required_keys: cli.restart_keys.clone(),
    };
    let registry = PropertyRegistry::load(&defaults_path, &custom_path, policy)
        .map_err(|e| anyhow::anyhow!("Failed to load properties: {}", e))?;

    let role = RoleInfo { admin: !cli.read_only };
    if cli.read_only {
        info!("Read-only mode: property changes are rejected");
    }

    let state = Arc::new(AppState::new(registry, role));
    let server_handle = server::start_server(cli.port, state, cli.ui_dir.clone()).await?;

    let ui_url = format!("http://127.0.0.1:{}", cli.port);
    if cli.open {
        if let Err(e) = open::that(&ui_url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    info!("Settings page: {}", ui_url);
    info!("Press Ctrl+C to stop");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
        result = server_handle => {
            match result {
                Ok(Err(e)) => tracing::error!("Server error: {}", e),
                Err(e) => tracing::error!("Server task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }
    }

    info!("PropSettings stopped.");
    Ok(())
}

/// Get the data directory for PropSettings
/// Uses: $PROPSETTINGS_DATA_DIR > ~/.propsettings > ./data
fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PROPSETTINGS_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        let dir = home.join(".propsettings");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir;
        }
    }

    let local_dir = PathBuf::from("./data");
    let _ = std::fs::create_dir_all(&local_dir);
    local_dir
}
