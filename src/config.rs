use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted application settings.
///
/// Directories and default entry values shared by the GUI and the CLI.
/// Stored as pretty JSON under the platform data directory; missing or
/// unreadable files fall back to [`AppSettings::default`].
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppSettings {
    /// Directory offered when browsing for raw CSV traces
    pub raw_traces_dir: PathBuf,
    /// Directory converted traces are written to
    pub converted_traces_dir: PathBuf,
    /// Directory ProFiDo extracts are written to
    pub profido_traces_dir: PathBuf,

    /// Default column indexes entry, semicolon separated (e.g. "0;2")
    pub default_columns: String,
    pub default_source: String,
    pub default_description: String,
    /// Default tracedata description entries, semicolon separated
    pub default_tracedata_description: String,
    pub default_username: String,

    /// Default statistics format string; empty means shortest representation
    pub default_statistics_format: String,
    /// Default ProFiDo float format string
    pub default_float_format: String,
    /// Default relative tolerance for statistics validation
    pub default_tolerance: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            raw_traces_dir: PathBuf::from("traces/raw"),
            converted_traces_dir: PathBuf::from("traces/converted"),
            profido_traces_dir: PathBuf::from("traces/profido"),
            default_columns: "0".to_owned(),
            default_source: String::new(),
            default_description: String::new(),
            default_tracedata_description: String::new(),
            default_username: String::new(),
            default_statistics_format: String::new(),
            default_float_format: "%e".to_owned(),
            default_tolerance: 0.001,
        }
    }
}

pub fn get_config_path() -> PathBuf {
    crate::utils::base_dir().join("config.json")
}

pub fn load_app_config() -> AppSettings {
    let path = get_config_path();
    if path.exists()
        && let Ok(content) = std::fs::read_to_string(path)
        && let Ok(settings) = serde_json::from_str::<AppSettings>(&content)
    {
        return settings;
    }

    AppSettings::default()
}

pub fn save_app_config(settings: &AppSettings) -> Result<()> {
    let path = get_config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

impl AppSettings {
    /// Creates the configured trace directories if they are missing.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            &self.raw_traces_dir,
            &self.converted_traces_dir,
            &self.profido_traces_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
