//! Build script to fix the release version the launcher downloads.
//!
//! Release pipelines export `BIVVY_RELEASE_VERSION` (the tag the artifacts
//! are published under); local builds fall back to the crate version.

fn main() {
    println!("cargo:rerun-if-env-changed=BIVVY_RELEASE_VERSION");

    let version = std::env::var("BIVVY_RELEASE_VERSION")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=BIVVY_RELEASE_VERSION={version}");
}
