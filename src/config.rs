use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_analysis_ms")]
    pub analysis_ms: u64,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub last_username: Option<String>,
}

fn default_theme() -> String {
    "neon-slate".to_string()
}
fn default_tick_ms() -> u64 {
    16
}
fn default_analysis_ms() -> u64 {
    4500
}
fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("proeval")
        .to_string_lossy()
        .to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            tick_ms: default_tick_ms(),
            analysis_ms: default_analysis_ms(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            last_username: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Updates only `last_username` in the file, leaving command-line
    /// overrides out of it.
    pub fn remember_username(name: &str) -> Result<()> {
        let mut on_disk = Self::load()?;
        on_disk.last_username = Some(name.to_string());
        on_disk.save()
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("proeval")
            .join("config.toml")
    }

    /// Clamp timing values into a range the event loop can honour.
    pub fn validate(&mut self) {
        self.tick_ms = self.tick_ms.clamp(5, 250);
        self.analysis_ms = self.analysis_ms.min(60_000);
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
        if self.log_level.trim().is_empty() {
            self.log_level = default_log_level();
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn analysis_duration(&self) -> Duration {
        Duration::from_millis(self.analysis_ms)
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.theme, "neon-slate");
        assert_eq!(config.tick_ms, 16);
        assert_eq!(config.analysis_ms, 4500);
        assert!(config.data_dir.contains("proeval"));
        assert!(config.last_username.is_none());
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
theme = "paper"
analysis_ms = 1000
last_username = "ace"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "paper");
        assert_eq!(config.analysis_ms, 1000);
        assert_eq!(config.last_username.as_deref(), Some("ace"));
        assert_eq!(config.tick_ms, 16);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.last_username = Some("ace".to_string());
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.theme, deserialized.theme);
        assert_eq!(config.data_dir, deserialized.data_dir);
        assert_eq!(config.last_username, deserialized.last_username);
    }

    #[test]
    fn test_validate_clamps_timings() {
        let mut config = Config::default();
        config.tick_ms = 0;
        config.analysis_ms = 999_999;
        config.data_dir = "  ".to_string();
        config.validate();
        assert_eq!(config.tick_ms, 5);
        assert_eq!(config.analysis_ms, 60_000);
        assert!(!config.data_dir.trim().is_empty());

        config.tick_ms = 10_000;
        config.validate();
        assert_eq!(config.tick_ms, 250);
    }

    #[test]
    fn test_zero_analysis_is_allowed() {
        let mut config = Config::default();
        config.analysis_ms = 0;
        config.validate();
        assert_eq!(config.analysis_duration(), Duration::ZERO);
    }
}
