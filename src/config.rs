//! Runtime settings
//!
//! Loaded from an optional YAML file. Every field has a default, so an
//! empty file (or no file at all) gives the standard training setup.

use crate::game::quiz::TierThresholds;
use crate::game::trainer::{TrainerOptions, WrongToolPolicy};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Environment variable naming a settings file
pub const CONFIG_ENV: &str = "CYBER_ACADEMY_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Drill length for scenarios without their own time limit
    pub scenario_minutes: u32,
    /// Pause between a correct action and the next step
    pub settle_delay_ms: u64,
    pub tiers: TierThresholds,
    pub wrong_tool: WrongToolPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scenario_minutes: 15,
            settle_delay_ms: 2000,
            tiers: TierThresholds::default(),
            wrong_tool: WrongToolPolicy::Ignore,
        }
    }
}

impl Settings {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_yaml_str(&text)?;
        debug!(path = %path.display(), ?settings, "Settings loaded");
        Ok(settings)
    }

    /// Load from `path` if given, else from `CYBER_ACADEMY_CONFIG`, else defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(p) => Self::load(Path::new(&p)),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.scenario_minutes == 0 {
            return Err(Error::Config("scenario_minutes must be at least 1".to_string()));
        }
        let TierThresholds { high, medium } = self.tiers;
        if !(0.0..=100.0).contains(&high) || !(0.0..=100.0).contains(&medium) {
            return Err(Error::Config("tier thresholds must be between 0 and 100".to_string()));
        }
        if medium > high {
            return Err(Error::Config(format!(
                "tiers.medium ({}) must not exceed tiers.high ({})",
                medium, high
            )));
        }
        Ok(())
    }

    pub fn trainer_options(&self) -> TrainerOptions {
        TrainerOptions {
            default_minutes: self.scenario_minutes,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            wrong_tool: self.wrong_tool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(Settings::from_yaml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let settings = Settings::from_yaml_str("settle_delay_ms: 500\nwrong_tool: penalize\n").unwrap();
        assert_eq!(settings.settle_delay_ms, 500);
        assert_eq!(settings.wrong_tool, WrongToolPolicy::Penalize);
        assert_eq!(settings.scenario_minutes, 15);
        assert_eq!(settings.trainer_options().settle_delay, Duration::from_millis(500));
    }

    #[test]
    fn inverted_tiers_are_rejected() {
        let err = Settings::from_yaml_str("tiers:\n  high: 40\n  medium: 60\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn zero_minutes_is_rejected() {
        assert!(Settings::from_yaml_str("scenario_minutes: 0\n").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scenario_minutes: 5").unwrap();
        let settings = Settings::resolve(Some(file.path())).unwrap();
        assert_eq!(settings.scenario_minutes, 5);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Settings::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
