// crates/vigil-cli/src/config.rs
//
// Runtime configuration for the vigil CLI.
// Loaded from a TOML file or populated with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use vigil_anomaly::InferenceOptions;
use vigil_core::ValidationConfig;

/// Contents of `~/.vigil/config.toml`.
///
/// ```toml
/// log_level = "debug"
///
/// [validation]
/// distance_threshold = 0.05
///
/// [validation.features.country]
/// distance_threshold = 0.2
///
/// [inference]
/// max_domain_size = 50
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Log level used when `RUST_LOG` is unset: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub inference: InferenceOptions,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            validation: ValidationConfig::default(),
            inference: InferenceOptions::default(),
        }
    }
}

/// Where the active configuration came from. Logged once tracing is up.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults { reason: String },
}

impl CliConfig {
    /// Parse a TOML document and check the thresholds it carries.
    pub fn from_toml_str(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: CliConfig = toml::from_str(contents)?;
        config.validation.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// `~/.vigil/config.toml`, if a home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".vigil").join("config.toml"))
    }

    /// Resolve the configuration for this run.
    ///
    /// An explicitly named file must load. The default file may be absent,
    /// in which case defaults apply; if it exists it must parse.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, ConfigSource), Box<dyn std::error::Error>> {
        if let Some(path) = explicit {
            let config = Self::load(path)
                .map_err(|e| format!("could not load config from {}: {}", path.display(), e))?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        let Some(path) = Self::default_path() else {
            return Ok((
                Self::default(),
                ConfigSource::Defaults {
                    reason: "could not determine home directory".to_string(),
                },
            ));
        };

        if !path.exists() {
            return Ok((
                Self::default(),
                ConfigSource::Defaults {
                    reason: format!("{} not found", path.display()),
                },
            ));
        }

        let config = Self::load(&path)
            .map_err(|e| format!("could not load config from {}: {}", path.display(), e))?;
        Ok((config, ConfigSource::File(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = CliConfig::from_toml_str("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.validation, ValidationConfig::default());
        assert_eq!(config.inference.max_domain_size, 20);
    }

    #[test]
    fn test_nested_tables() {
        let config = CliConfig::from_toml_str(
            r#"
log_level = "debug"

[validation]
distance_threshold = 0.05

[validation.features.country]
distance_threshold = 0.2

[inference]
max_domain_size = 3
"#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert!((config.validation.distance_threshold_for("age") - 0.05).abs() < 1e-10);
        assert!((config.validation.distance_threshold_for("country") - 0.2).abs() < 1e-10);
        assert_eq!(config.inference.max_domain_size, 3);
    }

    #[test]
    fn test_out_of_range_tolerance_rejected() {
        let result = CliConfig::from_toml_str("[validation]\nmissing_fraction_tolerance = 1.5\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("vigil_missing_{}.toml", uuid::Uuid::now_v7()));
        assert!(CliConfig::resolve(Some(&path)).is_err());
    }

    #[test]
    fn test_explicit_file_loads() {
        let path = std::env::temp_dir().join(format!("vigil_config_{}.toml", uuid::Uuid::now_v7()));
        fs::write(&path, "log_level = \"warn\"\n").unwrap();
        let (config, source) = CliConfig::resolve(Some(&path)).unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(source, ConfigSource::File(path.clone()));
        fs::remove_file(&path).unwrap();
    }
}
