use crate::core::cross_check::DEFAULT_TOLERANCE_M;
use crate::domain::model::{BackendKind, Coordinate, DirectionMode};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "swiss-reframe")]
#[command(about = "Convert coordinates between Swiss LV03 and WGS84")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines instead of compact text
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert points; the direction is detected from their magnitude
    Convert {
        /// Points as x,y (e.g. 7.43861,46.951 or 600000,200000)
        #[arg(allow_hyphen_values = true)]
        points: Vec<Coordinate>,

        /// Backend to convert with, overrides conversion.backend
        #[arg(short, long, value_enum)]
        backend: Option<BackendKind>,

        /// Direction detection mode, overrides conversion.direction_mode
        #[arg(short, long, value_enum)]
        mode: Option<DirectionMode>,

        /// CSV file with an x,y header
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write results as CSV instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the local and REST backends on random points
    Check {
        /// Number of random points
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Largest acceptable discrepancy in metres
        #[arg(long, default_value_t = DEFAULT_TOLERANCE_M)]
        tolerance: f64,

        /// Write per-point reports as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
