//! Archive installation
//!
//! Unpacks the one binary the launcher needs out of a gzip-compressed tar
//! stream. The entry is written into a staging directory next to its final
//! location and renamed into place, so the cache entry is either absent or
//! complete.

use std::io;
use std::path::{Path, PathBuf};

use async_compression::tokio::bufread::GzipDecoder;
use futures::StreamExt;
use thiserror::Error;
use tokio::io::{AsyncRead, BufReader};
use tokio_tar::Archive;
use tracing::{debug, trace};

/// Errors raised while installing the binary from an archive.
#[derive(Error, Debug)]
pub enum InstallError {
    /// Reading, decompressing, writing or setting permissions failed.
    #[error("IO error")]
    Io(#[from] io::Error),

    /// The archive has no regular file with the expected name.
    #[error("Archive does not contain '{name}'")]
    MissingEntry {
        /// Entry name that was looked for.
        name: String,
    },
}

/// Extract the entry called `entry_name` from the gzip tar `reader` and install
/// it as `dest_dir/dest_name`.
///
/// Only a regular file whose archive path is exactly `entry_name` matches;
/// other entries (licenses, checksums, nested copies) are skipped. On Unix the
/// installed file gets mode `0755`. Returns the absolute path of the file.
///
/// # Errors
///
/// Returns [`InstallError::MissingEntry`] if nothing matched, in which case
/// `dest_dir` is left without the file, and [`InstallError::Io`] for
/// decompression, archive or filesystem failures.
pub async fn install<R>(
    reader: R,
    dest_dir: &Path,
    entry_name: &str,
    dest_name: &str,
) -> Result<PathBuf, InstallError>
where
    R: AsyncRead + Unpin + Send,
{
    tokio::fs::create_dir_all(dest_dir).await?;
    let dest_dir = std::path::absolute(dest_dir)?;

    // Same directory as the target so the final rename never crosses devices.
    let staging = tempfile::Builder::new()
        .prefix(&format!(".{dest_name}-"))
        .tempdir_in(&dest_dir)?;
    let staged = staging.path().join(dest_name);

    let mut archive = Archive::new(GzipDecoder::new(BufReader::new(reader)));
    let mut entries = archive.entries()?;
    let mut found = false;

    while let Some(entry) = entries.next().await {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        if path != Path::new(entry_name) || !entry.header().entry_type().is_file() {
            trace!(entry = %path.display(), "skipping archive entry");
            continue;
        }

        debug!(entry = %path.display(), staged = %staged.display(), "unpacking");
        entry.unpack(&staged).await?;
        found = true;
        break;
    }

    if !found {
        return Err(InstallError::MissingEntry {
            name: entry_name.to_string(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&staged, std::fs::Permissions::from_mode(0o755)).await?;
    }

    let target = dest_dir.join(dest_name);
    tokio::fs::rename(&staged, &target).await?;
    debug!(path = %target.display(), "installed");

    Ok(target)
}
