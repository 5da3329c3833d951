//! fwgate binary entry point.
//!
//! Usage:
//! ```bash
//! fwgate                                 # serve with fwgate.toml or defaults
//! fwgate --config /etc/fwgate.toml serve --bind 127.0.0.1:8000
//! fwgate check                           # validate mapping.json / ota_config.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fwgate_server::config::Config;
use fwgate_server::server::{self, AppState};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Alias download and OTA firmware gate for embedded devices.
#[derive(Parser, Debug)]
#[command(name = "fwgate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: fwgate.toml if present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Override the bind address
        #[arg(long)]
        bind: Option<String>,

        /// Override the storage root
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Validate the config documents and every file they reference
    Check,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging.filter);

    match cli.command.unwrap_or(Commands::Serve {
        bind: None,
        static_dir: None,
    }) {
        Commands::Serve { bind, static_dir } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            if let Some(dir) = static_dir {
                config.paths.static_dir = dir;
            }

            let state = Arc::new(AppState::from_config(&config));
            server::run(state, &config.server.bind_address)
                .await
                .with_context(|| format!("Server on {} failed", config.server.bind_address))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => {
            let state = AppState::from_config(&config);
            let report = fwgate_server::check::check(&state).await;

            for problem in &report.problems {
                println!("{problem}");
            }
            println!(
                "Checked {} aliases and {} device models: {} problem(s)",
                report.aliases,
                report.models,
                report.problems.len()
            );

            Ok(if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn init_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
