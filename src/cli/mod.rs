//! CLI module for Page Translate Gateway
//!
//! Provides subcommands:
//! - `serve`: HTTP translation server (default)
//! - `translate`: one-shot translation printed as JSON

pub mod serve;
pub mod translate;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Page Translate Gateway - cached batch translation over an LLM API
#[derive(Parser)]
#[command(name = "page-translate-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default mode)
    Serve,

    /// Translate segments once and print the result as JSON
    Translate(translate::TranslateArgs),
}

/// Loads `.env`, then the layered configuration, and validates it
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    config.validate()?;

    Ok(config)
}

pub(crate) fn init_logging(config: &AppConfig) {
    logging::init_logging(&logging::LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });
}
