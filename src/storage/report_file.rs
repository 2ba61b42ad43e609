// Report artifacts on disk
use crate::model::{MatchReport, StorageError};
use crate::optimize::OptimizedReport;
use crate::utils::format_size;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes through a sibling temp file so readers never see a half-written report.
async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let tmp = tmp_path(path);
    let size = bytes.len() as u64;
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    info!("Wrote {} ({})", path.display(), format_size(size));
    Ok(())
}

/// Full report, pretty-printed.
pub async fn write_report(path: impl AsRef<Path>, report: &MatchReport) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(report)?;
    write_atomic(path.as_ref(), bytes).await
}

/// Compact report, no whitespace.
pub async fn write_optimized(path: impl AsRef<Path>, report: &OptimizedReport) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(report)?;
    write_atomic(path.as_ref(), bytes).await
}

pub async fn read_report(path: impl AsRef<Path>) -> Result<MatchReport, StorageError> {
    let content = fs::read(path.as_ref()).await?;
    Ok(serde_json::from_slice(&content)?)
}
