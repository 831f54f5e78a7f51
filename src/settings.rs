use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TallyError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub company_name: String,
    #[serde(default = "default_currency_prefix")]
    pub currency_prefix: String,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_currency_prefix() -> String {
    "KES".to_string()
}

fn default_export_dir() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("tally")
        .join("exports")
        .to_string_lossy()
        .to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            currency_prefix: default_currency_prefix(),
            export_dir: default_export_dir(),
        }
    }
}

impl Settings {
    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(expand_home(&self.export_dir))
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tally")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings() -> Settings {
    load_from(&settings_path())
}

fn load_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring malformed settings");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_to(&config_dir(), settings)
}

fn save_to(dir: &Path, settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TallyError::Settings(e.to_string()))?;
    let path = dir.join("settings.json");
    std::fs::write(&path, format!("{json}\n"))?;
    info!(path = %path.display(), "settings saved");
    Ok(())
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            company_name: "Duka Ltd".to_string(),
            currency_prefix: "UGX".to_string(),
            export_dir: "/tmp/exports".to_string(),
        };
        save_to(dir.path(), &settings).unwrap();
        let loaded = load_from(&dir.path().join("settings.json"));
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_from(&dir.path().join("settings.json"));
        assert!(s.company_name.is_empty());
        assert_eq!(s.currency_prefix, "KES");
        assert!(s.export_dir.ends_with("exports"));
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_from(&path), Settings::default());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"company_name": "Bob's Shop"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.company_name, "Bob's Shop");
        assert_eq!(s.currency_prefix, "KES");
    }

    #[test]
    fn test_save_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep").join("nested");
        save_to(&nested, &Settings::default()).unwrap();
        assert!(nested.join("settings.json").exists());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), "/abs/path");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x"), format!("{}/x", home.to_string_lossy()));
        }
    }
}
