//! Host platform identification.
//!
//! Release artifacts are published once per `{os}-{arch}` pair. The launcher
//! maps whatever the host reports onto that small closed set and refuses to
//! guess for anything else.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while identifying the host platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The host's operating system or machine architecture has no published
    /// artifact. Carries the raw strings exactly as the host reported them.
    #[error("Unsupported platform: {system}-{machine}")]
    Unsupported {
        /// Raw operating system name.
        system: String,
        /// Raw machine architecture name.
        machine: String,
    },

    /// A string that is not of the form `{os}-{arch}`.
    #[error("Invalid platform tag: {0}")]
    InvalidTag(String),
}

/// Operating systems with published artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    /// macOS.
    Darwin,
    /// Linux (any libc the release is built for).
    Linux,
    /// Windows.
    Windows,
}

impl Os {
    /// Canonical name used in artifact file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `macos` is what Rust reports, `darwin` is what uname reports.
        match s.to_lowercase().as_str() {
            "darwin" | "macos" => Ok(Self::Darwin),
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            _ => Err(format!("Unknown operating system: {s}")),
        }
    }
}

/// CPU architectures with published artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit x86 (`x86_64`, `amd64`).
    X64,
    /// 64-bit ARM (`arm64`, `aarch64`).
    Arm64,
}

impl Arch {
    /// Canonical name used in artifact file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Ok(Self::X64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}

/// Canonical `{os}-{arch}` identifier selecting which artifact to fetch.
///
/// # Example
///
/// ```
/// use bivvy_schema::PlatformTag;
///
/// let tag = PlatformTag::from_host("Linux", "x86_64").unwrap();
/// assert_eq!(tag.to_string(), "linux-x64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformTag {
    os: Os,
    arch: Arch,
}

impl PlatformTag {
    /// Build a tag from already-canonical parts.
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Identify the platform this process is running on.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] when the host is outside the
    /// published set.
    pub fn resolve() -> Result<Self, PlatformError> {
        Self::from_host(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map raw host strings (as reported by uname or the Rust target) onto a
    /// tag. Matching is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] carrying both raw strings when
    /// either one is not recognised.
    pub fn from_host(system: &str, machine: &str) -> Result<Self, PlatformError> {
        match (system.parse::<Os>(), machine.parse::<Arch>()) {
            (Ok(os), Ok(arch)) => Ok(Self::new(os, arch)),
            _ => Err(PlatformError::Unsupported {
                system: system.to_string(),
                machine: machine.to_string(),
            }),
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

impl FromStr for PlatformTag {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (os, arch) = s
            .split_once('-')
            .ok_or_else(|| PlatformError::InvalidTag(s.to_string()))?;
        let os = os
            .parse::<Os>()
            .map_err(|_| PlatformError::InvalidTag(s.to_string()))?;
        let arch = arch
            .parse::<Arch>()
            .map_err(|_| PlatformError::InvalidTag(s.to_string()))?;
        Ok(Self::new(os, arch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_pairs() {
        let cases = [
            ("Darwin", "arm64", "darwin-arm64"),
            ("Darwin", "x86_64", "darwin-x64"),
            ("Linux", "x86_64", "linux-x64"),
            ("Linux", "aarch64", "linux-arm64"),
            ("Windows", "AMD64", "windows-x64"),
            ("Windows", "ARM64", "windows-arm64"),
        ];
        for (system, machine, expected) in cases {
            let tag = PlatformTag::from_host(system, machine).unwrap();
            assert_eq!(tag.to_string(), expected, "{system}/{machine}");
        }
    }

    #[test]
    fn test_aliases_fold() {
        assert_eq!(
            PlatformTag::from_host("linux", "x86_64").unwrap(),
            PlatformTag::from_host("linux", "amd64").unwrap()
        );
        assert_eq!(
            PlatformTag::from_host("darwin", "arm64").unwrap(),
            PlatformTag::from_host("macos", "aarch64").unwrap()
        );
    }

    #[test]
    fn test_unsupported_keeps_raw_pair() {
        let err = PlatformTag::from_host("FreeBSD", "x86_64").unwrap_err();
        assert_eq!(
            err,
            PlatformError::Unsupported {
                system: "FreeBSD".to_string(),
                machine: "x86_64".to_string(),
            }
        );

        let err = PlatformTag::from_host("Linux", "riscv64").unwrap_err();
        assert!(err.to_string().contains("Linux-riscv64"));

        // 32-bit variants are never coerced to their 64-bit siblings
        assert!(PlatformTag::from_host("Linux", "i686").is_err());
        assert!(PlatformTag::from_host("Linux", "armv7l").is_err());
        assert!(PlatformTag::from_host("", "").is_err());
    }

    #[test]
    fn test_tag_parse() {
        let tag: PlatformTag = "windows-arm64".parse().unwrap();
        assert_eq!(tag, PlatformTag::new(Os::Windows, Arch::Arm64));
        assert!("linux".parse::<PlatformTag>().is_err());
        assert!("solaris-x64".parse::<PlatformTag>().is_err());
    }

    #[test]
    fn test_resolve_current_host() {
        // CI only runs on published platforms.
        let tag = PlatformTag::resolve().unwrap();
        #[cfg(target_os = "linux")]
        assert_eq!(tag.os, Os::Linux);
        #[cfg(target_os = "macos")]
        assert_eq!(tag.os, Os::Darwin);
        #[cfg(target_os = "windows")]
        assert_eq!(tag.os, Os::Windows);
        assert_eq!(tag.to_string().parse::<PlatformTag>().unwrap(), tag);
    }
}
