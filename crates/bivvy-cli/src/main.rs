//! bivvy - installs the bivvy binary on first use and runs it

use std::ffi::OsString;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use bivvy_cli::{BINARY_NAME, LaunchError, Launcher, release_source, release_version};
use bivvy_core::{LauncherConfig, StderrReporter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging; stdout belongs to the wrapped binary
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Everything after argv[0] is forwarded as-is, including non-UTF-8 values.
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();

    let code = match launch(args).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{BINARY_NAME}: {err:#}");
            if err
                .downcast_ref::<LaunchError>()
                .is_some_and(LaunchError::is_retryable)
            {
                eprintln!("{BINARY_NAME}: this may be temporary; run the command again to retry");
            }
            1
        }
    };

    std::process::exit(code);
}

async fn launch(args: Vec<OsString>) -> Result<i32> {
    let config = LauncherConfig::from_env(release_source(), release_version(), BINARY_NAME)?;
    tracing::debug!(
        version = %config.version,
        cache = %config.install_dir.display(),
        "launcher configured"
    );

    let launcher = Launcher::new(config, Arc::new(StderrReporter))?;
    Ok(launcher.run(args).await?)
}
