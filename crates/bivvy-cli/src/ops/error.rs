//! Launch failures, one variant per stage

use std::io;
use std::path::PathBuf;

use bivvy_core::{FetchError, InstallError};
use bivvy_schema::PlatformError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Platform detection failed")]
    Platform(#[from] PlatformError),

    #[error("Download failed")]
    Fetch(#[from] FetchError),

    #[error("Install failed")]
    Install(#[from] InstallError),

    #[error("Failed to run {}", path.display())]
    ChildProcess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    /// Whether re-running the launcher could succeed without a new release.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(FetchError::Network(_) | FetchError::Interrupted(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(err: LaunchError) -> String {
        format!("{:#}", anyhow::Error::from(err))
    }

    #[test]
    fn test_report_names_stage_then_cause() {
        let err = LaunchError::from(InstallError::MissingEntry {
            name: "bivvy".to_string(),
        });
        assert_eq!(report(err), "Install failed: Archive does not contain 'bivvy'");

        let err = LaunchError::from(InstallError::Io(io::Error::other("disk full")));
        assert_eq!(report(err), "Install failed: IO error: disk full");

        let err = LaunchError::ChildProcess {
            path: PathBuf::from("/opt/bivvy"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(report(err), "Failed to run /opt/bivvy: permission denied");
    }

    #[test]
    fn test_only_transfer_failures_are_retryable() {
        let interrupted = LaunchError::from(FetchError::Interrupted(io::Error::other("reset")));
        assert!(interrupted.is_retryable());

        let missing = LaunchError::from(InstallError::MissingEntry {
            name: "bivvy".to_string(),
        });
        assert!(!missing.is_retryable());
    }
}
