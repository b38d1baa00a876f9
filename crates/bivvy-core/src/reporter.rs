//! Reporter trait for dependency injection
//!
//! Install progress is announced through this trait so the core never writes
//! to a terminal directly. The launcher binary prints to stderr; tests stay
//! silent with [`NullReporter`].

use std::io::Write;
use std::path::Path;

use bivvy_schema::ArtifactLocation;

/// Receives user-facing notices about a first-run installation.
pub trait Reporter: Send + Sync {
    /// A download of `name` from `artifact` is starting.
    fn downloading(&self, name: &str, artifact: &ArtifactLocation);

    /// The binary was installed at `path`.
    fn installed(&self, name: &str, path: &Path);
}

/// Writes notices to stderr, keeping stdout for the wrapped binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn downloading(&self, name: &str, artifact: &ArtifactLocation) {
        let _ = writeln!(std::io::stderr(), "Downloading {name} from {artifact}");
    }

    fn installed(&self, name: &str, path: &Path) {
        let _ = writeln!(
            std::io::stderr(),
            "{name} installed successfully ({})",
            path.display()
        );
    }
}

/// A no-op reporter for silent operations (e.g. testing).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn downloading(&self, _: &str, _: &ArtifactLocation) {}
    fn installed(&self, _: &str, _: &Path) {}
}
