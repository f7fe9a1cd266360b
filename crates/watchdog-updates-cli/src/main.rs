mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use watchdog_updates::{CancellationToken, UpdateProvider};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "watchdog-updates")]
#[command(about = "Check managed server instances for updates and describe the builds to fetch")]
struct Cli {
    /// Path to the watchdog configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List configured instances and their update providers
    Instances,
    /// Check whether an instance is out of date
    Check {
        /// Instance key
        key: String,
        /// Version the instance is currently running
        #[arg(long)]
        current_version: Option<String>,
    },
    /// Describe the revision an instance should update to
    Run {
        /// Instance key
        key: String,
        /// Version the instance is currently running
        #[arg(long)]
        current_version: Option<String>,
        /// Where the instance's current binaries live
        #[arg(long, default_value = ".")]
        bin_path: PathBuf,
        /// Print the revision as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let path = match path {
        Some(path) => path,
        None => config::config_path().context("could not determine config directory")?,
    };
    config::load_config(&path)
}

/// Cancel `token` when the process receives Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling");
            token.cancel();
        }
    });
}

fn provider_for(config: &AppConfig, key: &str) -> Result<std::sync::Arc<dyn UpdateProvider>> {
    let entry = config
        .instance(key)
        .with_context(|| format!("no instance with key [{key}] in configuration"))?;
    entry.build_provider(&config.settings())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();
    let config = resolve_config(cli.config)?;

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    match cli.command {
        Command::Instances => {
            commands::instances::run(&config)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            key,
            current_version,
        } => {
            let provider = provider_for(&config, &key)?;
            let available =
                commands::check::run(provider.as_ref(), &key, current_version.as_deref(), &cancel)
                    .await?;
            // Scripts can branch on the exit status: 0 = update available.
            Ok(if available {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }
        Command::Run {
            key,
            current_version,
            bin_path,
            json,
        } => {
            let provider = provider_for(&config, &key)?;
            commands::run::run(
                provider.as_ref(),
                &key,
                current_version.as_deref(),
                &bin_path,
                json,
                &cancel,
            )
            .await
            .with_context(|| format!("update failed for [{key}]"))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
