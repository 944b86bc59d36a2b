//! Persistence of finished report records

use flow_core::ReportState;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Write the record as pretty JSON to `<dir>/<task_id>.json`
pub async fn save_report(state: &ReportState, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(format!("{}.json", state.task_id));
    tokio::fs::write(&path, serde_json::to_vec_pretty(state)?).await?;

    tracing::info!(path = %path.display(), "Report archived");
    Ok(path)
}

/// Read a record written by [`save_report`]
pub async fn load_report(path: impl AsRef<Path>) -> Result<ReportState> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
