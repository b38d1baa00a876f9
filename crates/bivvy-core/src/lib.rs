//! Core library for the bivvy launcher: configuration, download and
//! installation of the release binary into the local cache.

pub mod config;
pub mod io;
pub mod reporter;

pub use config::{ConfigError, LauncherConfig};
pub use io::fetch::{FetchError, Fetcher};
pub use io::install::{InstallError, install};
pub use reporter::{NullReporter, Reporter, StderrReporter};

/// User Agent string sent with artifact downloads
pub const USER_AGENT: &str = concat!("bivvy-launcher/", env!("CARGO_PKG_VERSION"));
