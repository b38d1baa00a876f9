//! Shared value types for the bivvy launcher: host platform tags and release
//! artifact locations. Nothing in this crate touches the network or disk.

pub mod artifact;
pub mod platform;

// Re-exports
pub use artifact::*;
pub use platform::*;
