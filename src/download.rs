//! Blocking HTTP downloads.
//!
//! Used for operator-supplied installer URLs and for fetching the packaging
//! tool on first run. Each download is attempted once; there is no retry.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{NexusError, Result};

/// Download `url` into `dest`, creating parent directories.
///
/// Returns the number of bytes written. A partially written file is removed
/// when the transfer fails.
pub fn download_file(url: &str, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            NexusError::io(format!("failed to create directory {}", parent.display()), e)
        })?;
    }

    info!("Downloading {} to {}", url, dest.display());
    let response = ureq::get(url)
        .call()
        .map_err(|e| NexusError::download(format!("{}: {}", url, e)))?;

    if let Some(length) = response.header("Content-Length") {
        info!("Server reported {} bytes", length);
    }

    let mut file = File::create(dest)
        .map_err(|e| NexusError::io(format!("failed to create {}", dest.display()), e))?;

    let mut reader = response.into_reader();
    match io::copy(&mut reader, &mut file) {
        Ok(bytes) => {
            info!("Downloaded {} bytes", bytes);
            Ok(bytes)
        }
        Err(e) => {
            drop(file);
            if let Err(remove_err) = fs::remove_file(dest) {
                warn!("Failed to remove partial download {}: {}", dest.display(), remove_err);
            }
            Err(NexusError::download(format!("failed to save {}: {}", url, e)))
        }
    }
}
