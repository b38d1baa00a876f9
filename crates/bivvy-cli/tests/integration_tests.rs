//! End-to-end runs of the `bivvy` launcher binary against a mock release host.
#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

/// Test context with an isolated cache directory and a mock release server
struct TestContext {
    _temp_dir: TempDir,
    cache_dir: PathBuf,
    server: mockito::ServerGuard,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let cache_dir = temp_dir.path().join("cache");
        Self {
            _temp_dir: temp_dir,
            cache_dir,
            server: mockito::Server::new(),
        }
    }

    fn artifact_path() -> String {
        let platform = bivvy_schema::PlatformTag::resolve().expect("host platform supported");
        format!(
            "/{}/releases/download/{}/{}-{platform}.tar.gz",
            bivvy_cli::GITHUB_REPO,
            bivvy_cli::RELEASE_VERSION,
            bivvy_cli::BINARY_NAME,
        )
    }

    fn bivvy_cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_bivvy"));
        cmd.env("BIVVY_CACHE_DIR", &self.cache_dir);
        cmd.env("BIVVY_RELEASE_BASE_URL", self.server.url());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn installed_binary(&self) -> PathBuf {
        self.cache_dir
            .join(format!("bivvy{}", std::env::consts::EXE_SUFFIX))
    }
}

fn tar_gz(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data, mode) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_empty_dir(path: &Path) {
    if path.exists() {
        let leftovers: Vec<_> = std::fs::read_dir(path).unwrap().collect();
        assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");
    }
}

#[test]
fn test_missing_release_fails_without_installing() {
    let mut ctx = TestContext::new();
    let mock = ctx
        .server
        .mock("GET", TestContext::artifact_path().as_str())
        .with_status(404)
        .expect(1)
        .create();

    let output = ctx.bivvy_cmd().arg("--help").output().expect("failed to run bivvy");

    mock.assert();
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Downloading bivvy from"), "stderr: {err}");
    assert!(err.contains("bivvy: Download failed: HTTP 404"), "stderr: {err}");
    assert!(!ctx.installed_binary().exists());
    assert_empty_dir(&ctx.cache_dir);
}

#[test]
fn test_archive_without_binary_fails() {
    let mut ctx = TestContext::new();
    let body = tar_gz(&[("README.md", b"docs", 0o644)]);
    let _mock = ctx
        .server
        .mock("GET", TestContext::artifact_path().as_str())
        .with_body(body)
        .create();

    let output = ctx.bivvy_cmd().output().expect("failed to run bivvy");

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(
        err.contains("bivvy: Install failed: Archive does not contain 'bivvy'"),
        "stderr: {err}"
    );
    assert!(!ctx.installed_binary().exists());
}

#[test]
fn test_invalid_timeout_is_rejected_before_download() {
    let mut ctx = TestContext::new();
    let mock = ctx
        .server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create();

    let output = ctx
        .bivvy_cmd()
        .env("BIVVY_DOWNLOAD_TIMEOUT", "soon")
        .output()
        .expect("failed to run bivvy");

    mock.assert();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("bivvy: "));
}

#[cfg(unix)]
mod unix {
    use std::io::Write;

    use super::*;

    const SCRIPT: &[u8] = b"#!/bin/sh\n\
        for arg in \"$@\"; do printf '%s\\n' \"$arg\"; done\n\
        exit 3\n";

    #[test]
    fn test_first_run_installs_then_reuses_cache() {
        let mut ctx = TestContext::new();
        let body = tar_gz(&[("LICENSE", b"MIT", 0o644), ("bivvy", SCRIPT, 0o644)]);
        let mock = ctx
            .server
            .mock("GET", TestContext::artifact_path().as_str())
            .with_body(body)
            .expect(1)
            .create();

        let output = ctx
            .bivvy_cmd()
            .args(["run", "two words", ""])
            .output()
            .expect("failed to run bivvy");

        assert_eq!(output.status.code(), Some(3));
        assert_eq!(String::from_utf8_lossy(&output.stdout), "run\ntwo words\n\n");
        let err = stderr(&output);
        assert!(err.contains("Downloading bivvy from"), "stderr: {err}");
        assert!(err.contains("bivvy installed successfully"), "stderr: {err}");

        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(ctx.installed_binary())
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        // Second run must not touch the network
        let output = ctx
            .bivvy_cmd()
            .arg("status")
            .output()
            .expect("failed to run bivvy");

        mock.assert();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(String::from_utf8_lossy(&output.stdout), "status\n");
        assert!(stderr(&output).is_empty());
    }

    #[test]
    fn test_preinstalled_binary_runs_offline() {
        let mut ctx = TestContext::new();
        let mock = ctx
            .server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create();

        std::fs::create_dir_all(&ctx.cache_dir).unwrap();
        let mut file = std::fs::File::create(ctx.installed_binary()).unwrap();
        file.write_all(b"#!/bin/sh\nexit 0\n").unwrap();
        drop(file);
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(
                ctx.installed_binary(),
                std::fs::Permissions::from_mode(0o755),
            )
            .unwrap();
        }

        let output = ctx.bivvy_cmd().output().expect("failed to run bivvy");

        mock.assert();
        assert!(output.status.success());
    }
}
