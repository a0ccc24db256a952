use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::controller::RefreshSettings;

const DEFAULT_DEBOUNCE_SECS: i64 = 600;
const DEFAULT_REFRESH_DELAY_MS: u64 = 1000;

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key (`APPID`).
    pub api_key: Option<String>,

    /// Override for the current-weather endpoint.
    pub endpoint: Option<String>,

    /// JSON city list; the bundled list is used when unset.
    pub city_list: Option<PathBuf>,

    /// Manual refreshes closer than this to the last observation are skipped.
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: i64,

    /// Minimum time a manual refresh stays visible.
    #[serde(default = "default_refresh_delay_ms")]
    pub refresh_delay_ms: u64,
}

fn default_debounce_secs() -> i64 {
    DEFAULT_DEBOUNCE_SECS
}

fn default_refresh_delay_ms() -> u64 {
    DEFAULT_REFRESH_DELAY_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            city_list: None,
            debounce_secs: DEFAULT_DEBOUNCE_SECS,
            refresh_delay_ms: DEFAULT_REFRESH_DELAY_MS,
        }
    }
}

impl Config {
    /// Return the API key or a hint on how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty()).ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weatherpane configure` and enter your API key."
            )
        })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            debounce_secs: self.debounce_secs,
            refresh_delay: Duration::from_millis(self.refresh_delay_ms),
            ..RefreshSettings::default()
        }
    }

    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding the persisted location record.
    pub fn data_dir() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weatherpane", "weatherpane")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn empty_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key(String::new());

        assert!(cfg.api_key().is_err());
    }

    #[test]
    fn set_api_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("OPEN_KEY".into());

        assert_eq!(cfg.api_key().expect("key must exist"), "OPEN_KEY");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.debounce_secs, 600);
        assert_eq!(cfg.refresh_delay_ms, 1000);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.city_list = Some(PathBuf::from("/tmp/cities.json"));
        cfg.debounce_secs = 120;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("KEY"));
        assert_eq!(loaded.city_list, Some(PathBuf::from("/tmp/cities.json")));
        assert_eq!(loaded.debounce_secs, 120);
        assert_eq!(loaded.refresh_delay_ms, 1000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"abc\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.api_key().unwrap(), "abc");
        assert_eq!(cfg.debounce_secs, 600);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn refresh_settings_follow_config() {
        let cfg = Config {
            debounce_secs: 30,
            refresh_delay_ms: 250,
            ..Config::default()
        };

        let settings = cfg.refresh_settings();
        assert_eq!(settings.debounce_secs, 30);
        assert_eq!(settings.refresh_delay, Duration::from_millis(250));
    }
}
