//! Launcher configuration and cache paths.
//!
//! Everything that would otherwise be process-wide state (where the binary
//! lives, which release to fetch, how long to wait) is gathered into one
//! immutable [`LauncherConfig`] built at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bivvy_schema::{ReleaseSource, ReleaseVersion};
use thiserror::Error;

/// Overrides the cache directory that holds the installed binary.
pub const CACHE_DIR_ENV: &str = "BIVVY_CACHE_DIR";

/// Overrides the scheme and host releases are downloaded from.
pub const BASE_URL_ENV: &str = "BIVVY_RELEASE_BASE_URL";

/// Total download timeout in whole seconds; `0` disables it.
pub const TIMEOUT_ENV: &str = "BIVVY_DOWNLOAD_TIMEOUT";

/// Download timeout applied when [`TIMEOUT_ENV`] is unset.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Errors raised while assembling a [`LauncherConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither an override nor a platform cache directory is available.
    #[error("Could not determine a cache directory. Set {CACHE_DIR_ENV} to override.")]
    NoCacheDir,

    /// The timeout override is not a whole number of seconds.
    #[error("Invalid {TIMEOUT_ENV} value {value:?}: expected whole seconds")]
    InvalidTimeout {
        /// The rejected value.
        value: String,
    },
}

/// Immutable launcher settings, constructed once per process.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Where release artifacts are published.
    pub source: ReleaseSource,
    /// Release the launcher was built for.
    pub version: ReleaseVersion,
    /// Exact name of the binary entry inside the release archive.
    pub archive_entry: String,
    /// Directory holding the installed binary.
    pub install_dir: PathBuf,
    /// Upper bound on the whole download, `None` for no limit.
    pub download_timeout: Option<Duration>,
}

impl LauncherConfig {
    /// Create a configuration with an explicit install directory and the
    /// default download timeout.
    pub fn new(
        source: ReleaseSource,
        version: ReleaseVersion,
        archive_entry: impl Into<String>,
        install_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            version,
            archive_entry: archive_entry.into(),
            install_dir: install_dir.into(),
            download_timeout: Some(DEFAULT_DOWNLOAD_TIMEOUT),
        }
    }

    /// Build the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`LauncherConfig::from_lookup`].
    pub fn from_env(
        source: ReleaseSource,
        version: ReleaseVersion,
        archive_entry: &str,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(source, version, archive_entry, |key| {
            std::env::var(key).ok()
        })
    }

    /// Build the configuration, reading overrides through `lookup`.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoCacheDir`] when no cache directory can be
    /// derived and [`ConfigError::InvalidTimeout`] when the timeout override
    /// is not a number.
    pub fn from_lookup<F>(
        mut source: ReleaseSource,
        version: ReleaseVersion,
        archive_entry: &str,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = lookup(BASE_URL_ENV) {
            source.base_url = base_url;
        }

        let install_dir = match lookup(CACHE_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_install_dir(&source, &version).ok_or(ConfigError::NoCacheDir)?,
        };

        let download_timeout = match lookup(TIMEOUT_ENV) {
            Some(raw) => parse_timeout(&raw)?,
            None => Some(DEFAULT_DOWNLOAD_TIMEOUT),
        };

        Ok(Self {
            source,
            version,
            archive_entry: archive_entry.to_string(),
            install_dir,
            download_timeout,
        })
    }

    /// File name of the installed binary: the archive entry name plus the
    /// target's executable suffix (`.exe` on Windows).
    pub fn binary_name(&self) -> String {
        format!("{}{}", self.archive_entry, std::env::consts::EXE_SUFFIX)
    }

    /// Full path of the cache entry.
    pub fn cache_entry(&self) -> PathBuf {
        self.install_dir.join(self.binary_name())
    }
}

/// Default cache directory: `<user cache>/<prefix>/<version>`, or `bin/`
/// beside the running executable when the platform has no user cache.
pub fn default_install_dir(source: &ReleaseSource, version: &ReleaseVersion) -> Option<PathBuf> {
    if let Some(cache) = dirs::cache_dir() {
        return Some(cache.join(&source.artifact_prefix).join(version.as_str()));
    }
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join("bin"))
}

fn parse_timeout(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout {
            value: raw.to_string(),
        })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
