//! Bazi configuration types and loading

use eyre::{Context, Result};
use lunarcal::ZiHourRule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::input::CalendarSystem;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Calendar assumed when `--calendar` is not given
    pub default_calendar: CalendarSystem,

    /// How 23:00-23:59 births are assigned to a day
    pub zi_hour: ZiHourRule,

    /// Chart history settings
    pub history: HistoryConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.history.limit == 0 {
            return Err(eyre::eyre!("history.limit must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    ///
    /// 1. Explicit path (errors are fatal)
    /// 2. `./.bazi.yml`
    /// 3. `<config_dir>/bazi/bazi.yml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(".bazi.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("bazi").join("bazi.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }
}

/// Chart history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HistoryConfig {
    /// History file path; `~/` is expanded
    pub path: String,

    /// Newest records kept
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .map(|d| d.join("bazi").join("history.json"))
            .unwrap_or_else(|| PathBuf::from(".bazi").join("history.json"))
            .to_string_lossy()
            .to_string();
        Self {
            path,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl HistoryConfig {
    /// History file path with `~/` resolved
    pub fn expanded_path(&self) -> PathBuf {
        match self.path.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.path)),
            None => PathBuf::from(&self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.default_calendar, CalendarSystem::Solar);
        assert_eq!(config.zi_hour, ZiHourRule::SameDay);
        assert_eq!(config.history.limit, 50);
        assert!(config.history.path.ends_with("history.json"));
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
default-calendar: Lunar
zi-hour: next-day

history:
  path: /tmp/bazi/charts.json
  limit: 10
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.default_calendar, CalendarSystem::Lunar);
        assert_eq!(config.zi_hour, ZiHourRule::NextDay);
        assert_eq!(config.history.path, "/tmp/bazi/charts.json");
        assert_eq!(config.history.limit, 10);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
zi-hour: next-day
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.zi_hour, ZiHourRule::NextDay);

        // Defaults for unspecified
        assert_eq!(config.default_calendar, CalendarSystem::Solar);
        assert_eq!(config.history.limit, 50);
    }

    #[test]
    fn test_expanded_path() {
        let config = HistoryConfig {
            path: "~/charts/history.json".to_string(),
            limit: 5,
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.expanded_path(), home.join("charts/history.json"));
        }

        let config = HistoryConfig {
            path: "/var/lib/bazi/history.json".to_string(),
            limit: 5,
        };
        assert_eq!(config.expanded_path(), PathBuf::from("/var/lib/bazi/history.json"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bazi.yml");
        fs::write(&path, "history:\n  limit: 7\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.history.limit, 7);
    }

    #[test]
    fn test_load_explicit_path_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.yml");
        assert!(Config::load(Some(&missing)).is_err());

        let broken = dir.path().join("broken.yml");
        fs::write(&broken, "zi-hour: [not, a, rule]\n").unwrap();
        assert!(Config::load(Some(&broken)).is_err());
    }

    #[test]
    fn test_zero_history_limit_rejected() {
        assert!(Config::default().validate().is_ok());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bazi.yml");
        fs::write(&path, "history:\n  limit: 0\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.chain().any(|cause| cause.to_string().contains("history.limit")));
    }
}
