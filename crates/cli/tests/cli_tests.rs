//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("pagedown")
}

/// Nothing listens on port 1, so the connection is refused immediately.
const REFUSED_URL: &str = "http://127.0.0.1:1/article";

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--mirror-host"))
        .stdout(predicate::str::contains("--caption-lang"))
        .stdout(predicate::str::contains("--title-heading"));
}

#[test]
fn test_cli_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_requires_url() {
    cmd().assert().failure().stderr(predicate::str::contains("URL"));
}

#[test]
fn test_cli_rejects_relative_url() {
    cmd()
        .arg("example.com/article")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL"));
}

#[test]
fn test_cli_rejects_non_http_scheme() {
    cmd()
        .arg("ftp://example.com/file.pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL"));
}

#[test]
fn test_cli_rejects_bad_mirror_host() {
    cmd()
        .args(["--mirror-host", "bad host", "https://x.com/a/status/1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to set up converter"));
}

#[test]
fn test_cli_rejects_non_numeric_timeout() {
    cmd()
        .args(["--timeout", "soon", "https://example.com/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout"));
}

#[test]
fn test_cli_transport_failure() {
    cmd()
        .args(["--timeout", "5", REFUSED_URL])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to convert"));
}

#[test]
fn test_cli_no_output_file_on_failure() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("output.md");

    cmd()
        .args(["-o", output.to_str().unwrap(), "--timeout", "5", REFUSED_URL])
        .assert()
        .failure();

    assert!(!output.exists());
}

#[test]
fn test_cli_verbose_banner() {
    cmd()
        .args(["-v", "--timeout", "5", REFUSED_URL])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pagedown"))
        .stderr(predicate::str::contains("Preparing converter"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pagedown"));
}

#[test]
fn test_cli_completions_for_every_shell() {
    for shell in ["bash", "zsh", "fish", "powershell", "elvish"] {
        cmd()
            .args(["--completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::contains("pagedown"));
    }
}

#[test]
fn test_cli_completions_conflict_with_url() {
    cmd().args(["--completions", "zsh", "https://example.com/"]).assert().failure();
}
