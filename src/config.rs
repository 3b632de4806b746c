// Runtime configuration for the dashboard.
//
// Everything is derived from where the binary lives: the sensor export is
// expected at `<program dir>/../dados/sensores_fase2.csv`.
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DashboardError, Result};

pub const DATA_DIR_NAME: &str = "dados";
pub const DATA_FILE_NAME: &str = "sensores_fase2.csv";
pub const PREVIEW_ROWS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // ---
    /// Directory holding the sensor export.
    pub data_dir: PathBuf,

    /// Full path of the expected export file.
    pub data_path: PathBuf,

    /// Maximum rows shown in the suggestion table.
    pub preview_rows: usize,
}

impl Config {
    /// Resolve the configuration from the running executable's location.
    pub fn resolve() -> Result<Config> {
        let exe = std::env::current_exe().map_err(|e| DashboardError::io("<current exe>", e))?;
        let exe = fs::canonicalize(&exe).unwrap_or(exe);
        let base = exe
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| DashboardError::NoBaseDir(exe.clone()))?;
        Ok(Config::with_base(base))
    }

    pub fn with_base(base: &Path) -> Config {
        let data_dir = base.join(DATA_DIR_NAME);
        let data_path = data_dir.join(DATA_FILE_NAME);
        Config {
            data_dir,
            data_path,
            preview_rows: PREVIEW_ROWS,
        }
    }

    pub fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| DashboardError::io(&self.data_dir, e))
    }

    /// File names currently in the data directory, sorted.
    pub fn data_dir_listing(&self) -> Result<Vec<String>> {
        let entries =
            fs::read_dir(&self.data_dir).map_err(|e| DashboardError::io(&self.data_dir, e))?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATA_DIR     : {}", self.data_dir.display());
        tracing::info!("  DATA_PATH    : {}", self.data_path.display());
        tracing::info!("  PREVIEW_ROWS : {}", self.preview_rows);
    }
}
