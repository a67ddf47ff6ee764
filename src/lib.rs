pub mod cli;
pub mod core;
pub mod providers;
pub mod tracker;

use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub enum AppCommand {
    Show { json: bool },
    Watch,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("kursvakt starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Show { json } => cli::show::run(&config, json).await,
        AppCommand::Watch => cli::watch::run(&config).await,
    }
}
