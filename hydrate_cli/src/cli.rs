//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "hydrate", version, about = "Smart bottle telemetry CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/hydrate.toml")]
    pub config: PathBuf,

    /// Output and log as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Override api.base_url from the config
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Override api.user_id from the config
    #[arg(long, value_name = "ID")]
    pub user_id: Option<u64>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pollers and print animation/light instructions until stopped
    Watch {
        /// Talk to a built-in simulated bottle instead of the API
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
        /// Stop after this many seconds (default: run until Ctrl-C)
        #[arg(long, value_name = "SECS")]
        duration_s: Option<u64>,
        /// Print per-source poll statistics on exit
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Refresh once and print the view model, presentation state and stats
    Status {
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
    },
    /// Print today's consumption chart
    Chart {
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
        /// Read `data,timestamp` rows from a CSV file instead of the API
        #[arg(long, value_name = "FILE", conflicts_with = "sim")]
        csv: Option<PathBuf>,
    },
    /// Recommend a daily intake from body and weather factors
    Advise {
        /// male | female | other
        #[arg(long, default_value = "other")]
        gender: String,
        #[arg(long)]
        bmi: f64,
        /// Air temperature in °C
        #[arg(long, allow_negative_numbers = true)]
        temperature: f64,
        /// Relative humidity in percent
        #[arg(long)]
        humidity: f64,
        /// clear | sunny | rain | cloudy | ...
        #[arg(long, default_value = "clear")]
        weather: String,
    },
    /// Check that the API answers (fetches the profile once)
    Health {
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
    },
}
