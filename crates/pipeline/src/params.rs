//! Pipeline Parameters
//!
//! Resolves raw textual settings into one immutable parameter set. Values
//! that do not parse or violate their constraint fall back to the default
//! and are reported as [`ParameterWarning`]s.

use data_validator::{CleanerConfig, NormalizerConfig, OutlierMode};
use event_detector::{DetectorConfig, SteeringRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use telemetry_frame::Schema;
use tracing::warn;

/// Setting keys understood by [`PipelineParams::resolve`]
pub mod keys {
    pub const TIME_COLUMN: &str = "time_column";
    pub const RIGHT_SPEED_COLUMN: &str = "right_speed_column";
    pub const LEFT_SPEED_COLUMN: &str = "left_speed_column";
    pub const STEERING_COLUMN: &str = "steering_column";
    pub const DELIMITER: &str = "delimiter";
    pub const BIN_WIDTH: &str = "bin_width";
    pub const Z_THRESHOLD: &str = "z_threshold";
    pub const ROLLING_WINDOW: &str = "rolling_window";
    pub const OUTLIER_MODE: &str = "outlier_mode";
    pub const MIN_RPM: &str = "min_rpm";
    pub const MAX_RPM: &str = "max_rpm";
    pub const DIFFERENTIAL_THRESHOLD: &str = "differential_threshold";
    pub const SLIP_THRESHOLD: &str = "slip_threshold";
    pub const MAX_TIME_GAP: &str = "max_time_gap";
    pub const MIN_STEERING_ANGLE: &str = "min_steering_angle";
    pub const MAX_STEERING_ANGLE: &str = "max_steering_angle";

    pub const ALL: &[&str] = &[
        TIME_COLUMN,
        RIGHT_SPEED_COLUMN,
        LEFT_SPEED_COLUMN,
        STEERING_COLUMN,
        DELIMITER,
        BIN_WIDTH,
        Z_THRESHOLD,
        ROLLING_WINDOW,
        OUTLIER_MODE,
        MIN_RPM,
        MAX_RPM,
        DIFFERENTIAL_THRESHOLD,
        SLIP_THRESHOLD,
        MAX_TIME_GAP,
        MIN_STEERING_ANGLE,
        MAX_STEERING_ANGLE,
    ];
}

/// A rejected setting that was replaced by its default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterWarning {
    pub name: String,
    pub value: String,
    pub reason: String,
    pub fallback: String,
}

impl fmt::Display for ParameterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} {:?} ({}); using {}",
            self.name, self.value, self.reason, self.fallback
        )
    }
}

/// Settings as collected from configuration layers, still unparsed
#[derive(Debug, Clone, Default)]
pub struct RawParams {
    values: BTreeMap<String, String>,
    rejected: Vec<ParameterWarning>,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs; later pairs win
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut raw = Self::new();
        for (key, value) in pairs {
            raw.set(key, value);
        }
        raw
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Record a setting that could not even be read as text
    pub fn reject(&mut self, key: &str, reason: impl Into<String>) {
        self.rejected.push(ParameterWarning {
            name: key.to_string(),
            value: String::new(),
            reason: reason.into(),
            fallback: "default".to_string(),
        });
    }
}

/// Immutable parameter set for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Column bindings; steering is optional
    pub columns: Schema,
    /// Field delimiter of input and output tables
    pub delimiter: u8,
    /// Time bucket width (seconds)
    pub bin_width: f64,
    /// Maximum |z| kept; 0 disables statistical filtering
    pub z_threshold: f64,
    /// Centered rolling window width (odd)
    pub rolling_window: usize,
    pub outlier_mode: OutlierMode,
    /// Plausible wheel speed bounds (RPM, inclusive)
    pub min_rpm: f64,
    pub max_rpm: f64,
    pub differential_threshold: f64,
    pub slip_threshold: f64,
    /// Longest sample gap compared for slip (seconds)
    pub max_time_gap: f64,
    pub steering: SteeringRange,
}

impl Default for PipelineParams {
    fn default() -> Self {
        let cleaner = CleanerConfig::default();
        let detector = DetectorConfig::default();
        Self {
            columns: Schema::default(),
            delimiter: b',',
            bin_width: NormalizerConfig::default().bin_width,
            z_threshold: cleaner.z_threshold,
            rolling_window: cleaner.rolling_window,
            outlier_mode: cleaner.outlier_mode,
            min_rpm: cleaner.speed_range.0,
            max_rpm: cleaner.speed_range.1,
            differential_threshold: detector.differential_threshold,
            slip_threshold: detector.slip_threshold,
            max_time_gap: detector.max_time_gap,
            steering: SteeringRange::default(),
        }
    }
}

impl PipelineParams {
    /// Resolve raw settings. Never fails: every rejected value is replaced
    /// by its default and reported.
    pub fn resolve(raw: &RawParams) -> (Self, Vec<ParameterWarning>) {
        let defaults = Self::default();
        for rejected in &raw.rejected {
            warn!("{}", rejected);
        }
        let mut r = Resolver {
            raw,
            warnings: raw.rejected.clone(),
        };

        let columns = Schema {
            time: r.column(keys::TIME_COLUMN, &defaults.columns.time),
            right_speed: r.column(keys::RIGHT_SPEED_COLUMN, &defaults.columns.right_speed),
            left_speed: r.column(keys::LEFT_SPEED_COLUMN, &defaults.columns.left_speed),
            steering: match raw.get(keys::STEERING_COLUMN).map(str::trim) {
                None => defaults.columns.steering.clone(),
                Some(v) if v.is_empty() || v.eq_ignore_ascii_case("none") => None,
                Some(v) => Some(v.to_string()),
            },
        };

        let delimiter = r.parse(keys::DELIMITER, defaults.delimiter, parse_delimiter);
        let bin_width = r.number(keys::BIN_WIDTH, defaults.bin_width, positive);
        let z_threshold = r.number(keys::Z_THRESHOLD, defaults.z_threshold, non_negative);
        let rolling_window = r.parse(keys::ROLLING_WINDOW, defaults.rolling_window, parse_window);
        let outlier_mode = r.parse(keys::OUTLIER_MODE, defaults.outlier_mode, |v| {
            v.parse::<OutlierMode>()
        });

        let mut min_rpm = r.number(keys::MIN_RPM, defaults.min_rpm, non_negative);
        let mut max_rpm = r.number(keys::MAX_RPM, defaults.max_rpm, non_negative);
        if min_rpm > max_rpm {
            r.warn(
                "min_rpm/max_rpm",
                format!("{min_rpm}/{max_rpm}"),
                "min exceeds max",
                format!("{}/{}", defaults.min_rpm, defaults.max_rpm),
            );
            min_rpm = defaults.min_rpm;
            max_rpm = defaults.max_rpm;
        }

        let differential_threshold = r.number(
            keys::DIFFERENTIAL_THRESHOLD,
            defaults.differential_threshold,
            non_negative,
        );
        let slip_threshold = r.number(keys::SLIP_THRESHOLD, defaults.slip_threshold, non_negative);
        let max_time_gap = r.number(keys::MAX_TIME_GAP, defaults.max_time_gap, non_negative);

        let mut steering = SteeringRange {
            min_angle: r.optional_number(keys::MIN_STEERING_ANGLE),
            max_angle: r.optional_number(keys::MAX_STEERING_ANGLE),
        };
        if let (Some(min), Some(max)) = (steering.min_angle, steering.max_angle) {
            if min > max {
                r.warn(
                    "min_steering_angle/max_steering_angle",
                    format!("{min}/{max}"),
                    "min exceeds max",
                    "unbounded".to_string(),
                );
                steering = SteeringRange::default();
            }
        }

        let params = Self {
            columns,
            delimiter,
            bin_width,
            z_threshold,
            rolling_window,
            outlier_mode,
            min_rpm,
            max_rpm,
            differential_threshold,
            slip_threshold,
            max_time_gap,
            steering,
        };
        (params, r.warnings)
    }

    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            columns: self.columns.clone(),
            bin_width: self.bin_width,
        }
    }

    pub fn cleaner_config(&self) -> CleanerConfig {
        CleanerConfig {
            speed_range: (self.min_rpm, self.max_rpm),
            z_threshold: self.z_threshold,
            rolling_window: self.rolling_window,
            outlier_mode: self.outlier_mode,
        }
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            differential_threshold: self.differential_threshold,
            slip_threshold: self.slip_threshold,
            max_time_gap: self.max_time_gap,
        }
    }
}

struct Resolver<'a> {
    raw: &'a RawParams,
    warnings: Vec<ParameterWarning>,
}

impl Resolver<'_> {
    fn warn(&mut self, name: &str, value: String, reason: &str, fallback: String) {
        let warning = ParameterWarning {
            name: name.to_string(),
            value,
            reason: reason.to_string(),
            fallback,
        };
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn parse<T, E, F>(&mut self, key: &str, default: T, parse: F) -> T
    where
        T: fmt::Debug,
        E: fmt::Display,
        F: FnOnce(&str) -> Result<T, E>,
    {
        let raw = self.raw;
        let Some(value) = raw.get(key) else {
            return default;
        };
        match parse(value.trim()) {
            Ok(parsed) => parsed,
            Err(e) => {
                let reason = e.to_string();
                self.warn(key, value.to_string(), &reason, format!("{default:?}"));
                default
            }
        }
    }

    fn number(&mut self, key: &str, default: f64, check: fn(f64) -> Result<f64, String>) -> f64 {
        self.parse(key, default, |v| parse_finite(v).and_then(check))
    }

    fn optional_number(&mut self, key: &str) -> Option<f64> {
        let raw = self.raw;
        let value = raw.get(key)?.trim();
        if value.is_empty() {
            return None;
        }
        match parse_finite(value) {
            Ok(n) => Some(n),
            Err(reason) => {
                self.warn(key, value.to_string(), &reason, "unbounded".to_string());
                None
            }
        }
    }

    fn column(&mut self, key: &str, default: &str) -> String {
        self.parse(key, default.to_string(), |v| {
            if v.is_empty() {
                Err("column name is empty")
            } else {
                Ok(v.to_string())
            }
        })
    }
}

fn parse_finite(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        Ok(_) => Err("not a finite number".to_string()),
        Err(_) => Err("not a number".to_string()),
    }
}

fn non_negative(value: f64) -> Result<f64, String> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err("must be >= 0".to_string())
    }
}

fn positive(value: f64) -> Result<f64, String> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err("must be > 0".to_string())
    }
}

fn parse_window(value: &str) -> Result<usize, String> {
    let n = parse_finite(value)?;
    if n < 1.0 || n.fract() != 0.0 || (n as u64) % 2 == 0 {
        return Err("must be an odd integer >= 1".to_string());
    }
    Ok(n as usize)
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
        _ => Err("must be a single ASCII character".to_string()),
    }
}
