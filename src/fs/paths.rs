//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs::naming::{validate_file_name, with_extension};

/// Target path for a media file inside the output directory.
pub fn media_path(output_dir: &Path, file_name: &str) -> Result<PathBuf> {
    Ok(output_dir.join(validate_file_name(file_name)?))
}

/// Sibling path sharing the media file's base name.
pub fn sibling_path(media_path: &Path, extension: &str) -> Result<PathBuf> {
    let file_name = media_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            Error::Download(format!(
                "Invalid media path: {}",
                media_path.display()
            ))
        })?;

    Ok(media_path.with_file_name(with_extension(file_name, extension)))
}

/// Ensure a directory exists, creating it if necessary.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path).await?;
    }
    Ok(())
}
