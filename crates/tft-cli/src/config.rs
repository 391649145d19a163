//! Configuration for the `tft` command line
//! Default location: `<config dir>/tft/tft.toml`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tft_algo::{
    SecondaryReference, COPPER_LOSS_NOTE, DEFAULT_SEQUENCE_TOLERANCE_DEG, DYN1_PHASE_SHIFT_DEG,
};
use tft_core::{TftError, TftResult};

/// Main tft configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TftConfig {
    /// CT phase verification defaults
    #[serde(default)]
    pub phase_check: PhaseCheckConfig,
    /// Report defaults
    #[serde(default)]
    pub report: ReportConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseCheckConfig {
    /// Vector-group displacement applied to the primary angles
    #[serde(default = "default_phase_shift")]
    pub phase_shift_deg: f64,
    /// "direct" (0°) or "reversed" (180°)
    #[serde(default = "default_secondary_reference")]
    pub secondary_reference: String,
    /// Allowed deviation from 120° between consecutive phases
    #[serde(default = "default_tolerance")]
    pub tolerance_deg: f64,
}

impl Default for PhaseCheckConfig {
    fn default() -> Self {
        Self {
            phase_shift_deg: default_phase_shift(),
            secondary_reference: default_secondary_reference(),
            tolerance_deg: default_tolerance(),
        }
    }
}

impl PhaseCheckConfig {
    pub fn reference(&self) -> TftResult<SecondaryReference> {
        self.secondary_reference.parse().map_err(|_| {
            TftError::Config(format!(
                "phase_check.secondary_reference must be \"direct\" or \"reversed\", got {:?}",
                self.secondary_reference
            ))
        })
    }
}

fn default_phase_shift() -> f64 {
    DYN1_PHASE_SHIFT_DEG
}

fn default_secondary_reference() -> String {
    SecondaryReference::Direct.as_str().to_string()
}

fn default_tolerance() -> f64 {
    DEFAULT_SEQUENCE_TOLERANCE_DEG
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Operator identifier used when `--operator` is not given
    #[serde(default)]
    pub operator: String,
    /// Radius of the phasor diagram coordinates
    #[serde(default = "default_phasor_magnitude")]
    pub phasor_magnitude: f64,
    #[serde(default = "default_note")]
    pub note: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            operator: String::new(),
            phasor_magnitude: default_phasor_magnitude(),
            note: default_note(),
        }
    }
}

fn default_phasor_magnitude() -> f64 {
    1.0
}

fn default_note() -> String {
    COPPER_LOSS_NOTE.to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    pub fn level(&self) -> TftResult<tracing::Level> {
        self.level
            .parse()
            .map_err(|_| TftError::Config(format!("unknown log level {:?}", self.level)))
    }
}

/// Default config location: `<config dir>/tft/tft.toml`
pub fn tft_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tft").join("tft.toml"))
}

/// Load the config from `path`, or from the default location when `None`.
///
/// A missing file yields the defaults; a file that exists but does not parse
/// is an error.
pub fn load_tft_config(path: Option<&Path>) -> Result<TftConfig> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => match tft_config_path() {
            Some(p) => p,
            None => return Ok(TftConfig::default()),
        },
    };

    if !config_path.exists() {
        return Ok(TftConfig::default());
    }

    let contents = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
    let config: TftConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
    Ok(config)
}

/// Write `config` to `path`, creating parent directories.
pub fn save_tft_config(config: &TftConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempdir().unwrap();
        let config = load_tft_config(Some(&tmp.path().join("absent.toml"))).unwrap();
        assert_eq!(config, TftConfig::default());
        assert_eq!(config.phase_check.phase_shift_deg, -30.0);
        assert_eq!(config.phase_check.tolerance_deg, 10.0);
        assert_eq!(config.report.phasor_magnitude, 1.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("tft.toml");
        fs::write(
            &path,
            "[phase_check]\nsecondary_reference = \"reversed\"\n\n[report]\noperator = \"JD\"\n",
        )
        .unwrap();

        let config = load_tft_config(Some(&path)).unwrap();
        assert_eq!(
            config.phase_check.reference().unwrap(),
            SecondaryReference::Reversed
        );
        assert_eq!(config.phase_check.phase_shift_deg, -30.0);
        assert_eq!(config.report.operator, "JD");
        assert_eq!(config.report.note, COPPER_LOSS_NOTE);
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("cfg/tft.toml");
        let mut config = TftConfig::default();
        config.phase_check.tolerance_deg = 5.0;
        config.logging.level = "debug".to_string();
        save_tft_config(&config, &path).unwrap();

        let loaded = load_tft_config(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.logging.level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let mut config = TftConfig::default();
        config.phase_check.secondary_reference = "sideways".to_string();
        assert!(matches!(
            config.phase_check.reference(),
            Err(TftError::Config(_))
        ));
        config.logging.level = "loud".to_string();
        assert!(config.logging.level().is_err());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("tft.toml");
        fs::write(&path, "[phase_check\n").unwrap();
        assert!(load_tft_config(Some(&path)).is_err());
    }
}
