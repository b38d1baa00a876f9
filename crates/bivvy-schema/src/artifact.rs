//! Release coordinates and the artifact URL derived from them.

use std::fmt;

use crate::platform::PlatformTag;

/// Version of the wrapped binary this launcher was published alongside.
///
/// Opaque: it is never parsed or compared, only placed verbatim in the
/// download URL and the cache path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseVersion(String);

impl ReleaseVersion {
    /// Wrap a version string.
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// The version exactly as published.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed coordinates of the release host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSource {
    /// Scheme and host, e.g. `https://github.com`.
    pub base_url: String,
    /// `owner/name` repository identifier.
    pub repo: String,
    /// Artifact file name prefix, e.g. `bivvy` in `bivvy-linux-x64.tar.gz`.
    pub artifact_prefix: String,
}

impl ReleaseSource {
    /// Create a source description.
    pub fn new(
        base_url: impl Into<String>,
        repo: impl Into<String>,
        artifact_prefix: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            repo: repo.into(),
            artifact_prefix: artifact_prefix.into(),
        }
    }

    /// Derive the download location of the artifact for `version` on `platform`.
    ///
    /// Pure string composition: the same inputs always give the same URL.
    ///
    /// # Example
    ///
    /// ```
    /// use bivvy_schema::{PlatformTag, ReleaseSource, ReleaseVersion};
    ///
    /// let source = ReleaseSource::new("https://github.com", "bivvy-dev/bivvy", "bivvy");
    /// let tag: PlatformTag = "linux-x64".parse().unwrap();
    /// let location = source.locate(&ReleaseVersion::new("1.0.1"), tag);
    /// assert_eq!(
    ///     location.url(),
    ///     "https://github.com/bivvy-dev/bivvy/releases/download/1.0.1/bivvy-linux-x64.tar.gz"
    /// );
    /// ```
    pub fn locate(&self, version: &ReleaseVersion, platform: PlatformTag) -> ArtifactLocation {
        let url = format!(
            "{}/{}/releases/download/{}/{}-{}.tar.gz",
            self.base_url.trim_end_matches('/'),
            self.repo,
            version,
            self.artifact_prefix,
            platform
        );
        ArtifactLocation { url }
    }
}

/// Fully-qualified download location of one release artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    url: String,
}

impl ArtifactLocation {
    /// The download URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for ArtifactLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
