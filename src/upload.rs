// Stores a user-supplied sensor export where the loader expects it.
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{DashboardError, Result};

/// Copy a user-supplied `.csv` file byte for byte to `dest`.
///
/// Returns the number of bytes written. Only the extension is checked; the
/// content is validated later by the loader.
pub fn store_upload(source: &Path, dest: &Path) -> Result<usize> {
    let is_csv = source
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(DashboardError::NotCsv(source.to_path_buf()));
    }
    let bytes = fs::read(source).map_err(|e| DashboardError::io(source, e))?;
    if let Some(dir) = dest.parent() {
        fs::create_dir_all(dir).map_err(|e| DashboardError::io(dir, e))?;
    }
    fs::write(dest, &bytes).map_err(|e| DashboardError::io(dest, e))?;
    info!(
        from = %source.display(),
        to = %dest.display(),
        bytes = bytes.len(),
        "stored uploaded file"
    );
    Ok(bytes.len())
}
