//! bivvy - self-installing launcher
//!
//! On first use the launcher downloads the prebuilt `bivvy` binary for the
//! host platform from the GitHub release matching its own version, installs
//! it into the user cache, and from then on just runs it with the caller's
//! arguments and exit code.
//!
//! # Directory Layout
//!
//! ```text
//! <user cache>/bivvy/
//! └── <version>/
//!     └── bivvy      # bivvy.exe on Windows
//! ```
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]

pub mod ops;

pub use ops::error::LaunchError;
pub use ops::launch::{Launcher, exit_code};

use bivvy_schema::{ReleaseSource, ReleaseVersion};

/// Scheme and host of the release downloads.
pub const RELEASE_BASE_URL: &str = "https://github.com";

/// Repository the releases are published from.
pub const GITHUB_REPO: &str = "bivvy-dev/bivvy";

/// Name of the wrapped binary, both inside the archive and as artifact prefix.
pub const BINARY_NAME: &str = "bivvy";

/// Release this launcher installs, fixed at build time.
pub const RELEASE_VERSION: &str = env!("BIVVY_RELEASE_VERSION");

/// Where bivvy releases are published.
pub fn release_source() -> ReleaseSource {
    ReleaseSource::new(RELEASE_BASE_URL, GITHUB_REPO, BINARY_NAME)
}

/// The release version baked into this build.
pub fn release_version() -> ReleaseVersion {
    ReleaseVersion::new(RELEASE_VERSION)
}
