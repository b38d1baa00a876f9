//! Install-on-first-use and argument passthrough.
//!
//! A launch is `NotInstalled -> Installing -> Installed -> Terminated(code)`,
//! where the `Installing` step is skipped whenever the cache entry already
//! exists. Nothing is spawned unless installation fully succeeded.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use bivvy_core::{FetchError, Fetcher, InstallError, LauncherConfig, Reporter, install};
use bivvy_schema::PlatformTag;
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// Tries allowed for a binary that is still open for writing somewhere.
const SPAWN_ATTEMPTS: u32 = 10;
const SPAWN_RETRY_DELAY: Duration = Duration::from_millis(50);

use crate::ops::error::LaunchError;

/// Ensures the wrapped binary is installed, then runs it.
#[derive(Clone)]
pub struct Launcher {
    config: LauncherConfig,
    fetcher: Fetcher,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for Launcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Launcher {
    /// Build a launcher with an HTTP client configured from `config`.
    pub fn new(config: LauncherConfig, reporter: Arc<dyn Reporter>) -> Result<Self, LaunchError> {
        let fetcher = Fetcher::new(config.download_timeout)?;
        Ok(Self {
            config,
            fetcher,
            reporter,
        })
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Return the cached binary, downloading and installing it first if absent.
    pub async fn ensure_installed(&self) -> Result<PathBuf, LaunchError> {
        let entry = self.config.cache_entry();
        match tokio::fs::try_exists(&entry).await {
            Ok(true) => {
                debug!(path = %entry.display(), "using cached binary");
                return Ok(entry);
            }
            Ok(false) => {}
            Err(err) => {
                debug!(
                    path = %entry.display(),
                    error = %err,
                    "cannot probe cache entry, reinstalling"
                );
            }
        }
        self.download_and_install().await
    }

    async fn download_and_install(&self) -> Result<PathBuf, LaunchError> {
        let platform = PlatformTag::resolve()?;
        let artifact = self.config.source.locate(&self.config.version, platform);
        info!(%platform, url = artifact.url(), "binary not cached, installing");

        self.reporter.downloading(&self.config.archive_entry, &artifact);

        let stream = self.fetcher.fetch(artifact.url()).await?;
        let installed = install(
            stream,
            &self.config.install_dir,
            &self.config.archive_entry,
            &self.config.binary_name(),
        )
        .await;

        let path = match installed {
            Ok(path) => path,
            // A broken connection surfaces from inside the decoder as an I/O error.
            Err(InstallError::Io(err)) => {
                return Err(match FetchError::from_body_error(err) {
                    Ok(fetch) => fetch.into(),
                    Err(err) => InstallError::Io(err).into(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        self.reporter.installed(&self.config.archive_entry, &path);
        Ok(path)
    }

    /// Run the wrapped binary with `args` and return its exit code.
    ///
    /// Arguments are passed through untouched and the child inherits the
    /// launcher's stdin, stdout and stderr.
    pub async fn run<I, S>(&self, args: I) -> Result<i32, LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let binary = self.ensure_installed().await?;
        exec(&binary, args).await
    }
}

async fn exec<I, S>(binary: &Path, args: I) -> Result<i32, LaunchError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let spawn_error = |source| LaunchError::ChildProcess {
        path: binary.to_path_buf(),
        source,
    };

    let mut command = Command::new(binary);
    command.args(args);
    let mut child = spawn(&mut command).await.map_err(spawn_error)?;

    // Ctrl-C reaches the child through the terminal's process group; the
    // launcher keeps waiting so the child's own exit code is reported.
    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            interrupt = tokio::signal::ctrl_c() => {
                if interrupt.is_err() {
                    break child.wait().await;
                }
                debug!("interrupt received, waiting for child");
            }
        }
    }
    .map_err(spawn_error)?;

    let code = exit_code(status);
    debug!(code, "child exited");
    Ok(code)
}

/// Spawn `command`, retrying while exec fails with `ETXTBSY`.
///
/// A forked process elsewhere can briefly inherit the write handle of a
/// binary that was just installed.
async fn spawn(command: &mut Command) -> std::io::Result<Child> {
    let mut attempt = 1;
    loop {
        match command.spawn() {
            Err(err)
                if err.kind() == std::io::ErrorKind::ExecutableFileBusy
                    && attempt < SPAWN_ATTEMPTS =>
            {
                debug!(attempt, "binary busy, retrying spawn");
                attempt += 1;
                tokio::time::sleep(SPAWN_RETRY_DELAY).await;
            }
            result => return result,
        }
    }
}

/// Map a child's exit status to the launcher's own exit code.
///
/// Normal exits pass through verbatim. A Unix child killed by a signal has no
/// code and maps to `128 + signal`, as shells report it.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
