//! Idempotent file writing.
//!
//! A target is only touched when the freshly rendered bytes differ from what
//! is already on disk, so an unchanged regeneration performs zero writes and
//! leaves file timestamps alone.

use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::error::Result;

/// Write `content` to `dir/file_name` unless it already matches. Returns
/// whether a write happened. Directories are created on demand; a missing
/// target and empty content is a no-op.
pub async fn write_if_changed(dir: &Path, file_name: &str, content: &[u8]) -> Result<bool> {
    fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);

    match fs::read(&path).await {
        Ok(existing) if existing == content => {
            debug!(path = %path.display(), "unchanged, skipping write");
            return Ok(false);
        }
        Err(_) if content.is_empty() => {
            debug!(path = %path.display(), "empty content for missing file, skipping write");
            return Ok(false);
        }
        _ => {}
    }

    fs::write(&path, content).await?;
    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(true)
}
