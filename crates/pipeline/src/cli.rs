//! CLI argument parsing for drivetrain-events
//!
//! Parameter flags are taken as text and resolved together with the config
//! file and environment, so a bad value falls back to its default instead of
//! aborting the run.

use crate::params::keys;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "drivetrain-events")]
#[command(version)]
#[command(
    about = "Clean drivetrain telemetry and detect differential-load and wheel-slip events",
    long_about = None
)]
pub struct Cli {
    /// Telemetry table to analyze (delimited text with a header row)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Directory the result tables and summary.json are written to
    #[arg(short, long = "output-dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Configuration file (TOML); defaults to ./drivetrain.toml when present
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Time column name
    #[arg(long = "time-column", value_name = "NAME")]
    pub time_column: Option<String>,

    /// Right wheel speed column name
    #[arg(long = "right-column", value_name = "NAME")]
    pub right_speed_column: Option<String>,

    /// Left wheel speed column name
    #[arg(long = "left-column", value_name = "NAME")]
    pub left_speed_column: Option<String>,

    /// Steering angle column name ("none" to ignore steering)
    #[arg(long = "steering-column", value_name = "NAME")]
    pub steering_column: Option<String>,

    /// Field delimiter of input and output tables ("tab" for tabs)
    #[arg(short, long, value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// Time bucket width in seconds (default: 0.125)
    #[arg(long = "bin-width", value_name = "SECONDS", allow_hyphen_values = true)]
    pub bin_width: Option<String>,

    /// Maximum |z| kept by the outlier filter; 0 disables it (default: 0)
    #[arg(short = 'z', long = "z-threshold", value_name = "SIGMA", allow_hyphen_values = true)]
    pub z_threshold: Option<String>,

    /// Odd rolling window width for z-scores (default: 15)
    #[arg(long = "rolling-window", value_name = "ROWS", allow_hyphen_values = true)]
    pub rolling_window: Option<String>,

    /// Outlier statistics: rolling or global (default: rolling)
    #[arg(long = "outlier-mode", value_name = "MODE")]
    pub outlier_mode: Option<String>,

    /// Lowest plausible wheel speed in RPM (default: 10)
    #[arg(long = "min-rpm", value_name = "RPM", allow_hyphen_values = true)]
    pub min_rpm: Option<String>,

    /// Highest plausible wheel speed in RPM (default: 3000)
    #[arg(long = "max-rpm", value_name = "RPM", allow_hyphen_values = true)]
    pub max_rpm: Option<String>,

    /// Wheel speed difference that flags a differential-load event (default: 100)
    #[arg(long = "differential-threshold", value_name = "RPM", allow_hyphen_values = true)]
    pub differential_threshold: Option<String>,

    /// Per-sample speed jump that flags a slip event (default: 200)
    #[arg(long = "slip-threshold", value_name = "RPM", allow_hyphen_values = true)]
    pub slip_threshold: Option<String>,

    /// Longest sample gap compared for slip, in seconds (default: 0.125)
    #[arg(long = "max-time-gap", value_name = "SECONDS", allow_hyphen_values = true)]
    pub max_time_gap: Option<String>,

    /// Lower steering angle bound in degrees
    #[arg(long = "min-steering", value_name = "DEG", allow_hyphen_values = true)]
    pub min_steering_angle: Option<String>,

    /// Upper steering angle bound in degrees
    #[arg(long = "max-steering", value_name = "DEG", allow_hyphen_values = true)]
    pub max_steering_angle: Option<String>,

    /// Also write the sorted, unbinned input as raw.csv
    #[arg(long = "write-raw")]
    pub write_raw: bool,

    /// Emit logs as JSON lines
    #[arg(long = "log-json")]
    pub log_json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Parameter flags given on the command line, keyed like the config file
    pub fn overrides(&self) -> Vec<(&'static str, String)> {
        [
            (keys::TIME_COLUMN, &self.time_column),
            (keys::RIGHT_SPEED_COLUMN, &self.right_speed_column),
            (keys::LEFT_SPEED_COLUMN, &self.left_speed_column),
            (keys::STEERING_COLUMN, &self.steering_column),
            (keys::DELIMITER, &self.delimiter),
            (keys::BIN_WIDTH, &self.bin_width),
            (keys::Z_THRESHOLD, &self.z_threshold),
            (keys::ROLLING_WINDOW, &self.rolling_window),
            (keys::OUTLIER_MODE, &self.outlier_mode),
            (keys::MIN_RPM, &self.min_rpm),
            (keys::MAX_RPM, &self.max_rpm),
            (keys::DIFFERENTIAL_THRESHOLD, &self.differential_threshold),
            (keys::SLIP_THRESHOLD, &self.slip_threshold),
            (keys::MAX_TIME_GAP, &self.max_time_gap),
            (keys::MIN_STEERING_ANGLE, &self.min_steering_angle),
            (keys::MAX_STEERING_ANGLE, &self.max_steering_angle),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
        .collect()
    }

    pub fn log_level(&self) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
