//! Layered Configuration
//!
//! Collects raw settings from, in increasing precedence: an optional TOML
//! file, `DRIVETRAIN_*` environment variables and command-line overrides.

use crate::params::{keys, RawParams};
use crate::PipelineError;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable prefix, e.g. `DRIVETRAIN_SLIP_THRESHOLD`
pub const ENV_PREFIX: &str = "DRIVETRAIN";

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "drivetrain.toml";

/// Load raw settings.
///
/// An explicitly named config file must exist; the default file is
/// optional. Values that cannot be read as text are recorded as rejected
/// rather than failing the load.
pub fn load_settings(
    config_file: Option<&Path>,
    overrides: &[(&'static str, String)],
) -> Result<RawParams, PipelineError> {
    let file_source = match config_file {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            File::from(path).required(true)
        }
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let mut builder = Config::builder()
        .add_source(file_source)
        .add_source(Environment::with_prefix(ENV_PREFIX));
    for (key, value) in overrides {
        builder = builder.set_override(*key, value.as_str())?;
    }
    let settings = builder.build()?;

    let mut raw = RawParams::new();
    for key in keys::ALL {
        match settings.get_string(key) {
            Ok(value) => {
                debug!("Setting {} = {:?}", key, value);
                raw.set(*key, value);
            }
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => raw.reject(key, e.to_string()),
        }
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_are_collected() {
        let overrides = vec![
            (keys::SLIP_THRESHOLD, "150".to_string()),
            (keys::OUTLIER_MODE, "global".to_string()),
        ];
        let raw = load_settings(None, &overrides).unwrap();
        assert_eq!(raw.get(keys::SLIP_THRESHOLD), Some("150"));
        assert_eq!(raw.get(keys::OUTLIER_MODE), Some("global"));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = load_settings(Some(Path::new("/definitely/not/here/drivetrain.toml")), &[]);
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_toml_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drivetrain.toml");
        std::fs::write(
            &path,
            "z_threshold = 2.5\nrolling_window = 9\nsteering_column = \"Wheel Angle\"\n",
        )
        .unwrap();

        let overrides = vec![(keys::ROLLING_WINDOW, "11".to_string())];
        let raw = load_settings(Some(&path), &overrides).unwrap();
        assert_eq!(raw.get(keys::Z_THRESHOLD), Some("2.5"));
        assert_eq!(raw.get(keys::ROLLING_WINDOW), Some("11"));
        assert_eq!(raw.get(keys::STEERING_COLUMN), Some("Wheel Angle"));
    }
}
