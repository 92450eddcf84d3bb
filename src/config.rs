//! Optional `srctrl.toml` defaults for the driver
//!
//! ```toml
//! database_file_path = "out/sample.srctrldb"
//! source_file_path = "sample.py"
//! database_version = 25
//! language = "python"
//! ```
//!
//! Command-line parameters win over values from the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "SRCTRL_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SrctrlConfig {
    pub database_file_path: Option<String>,
    pub source_file_path: Option<String>,
    pub database_version: Option<i32>,
    /// Language label stored for the recorded file
    pub language: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("srctrl.toml"))
}

/// Load the config file, `Ok(None)` if it does not exist
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<SrctrlConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: SrctrlConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Create the directory that will hold the database file
pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
