//! Tests of the binary that never reach an external tool

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fetchclip(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fetchclip").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("FETCHCLIP_CONFIG")
        .env_remove("RUST_LOG")
        .env("FETCHCLIP_WORK_ROOT", dir.path().join("work"));
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    fetchclip(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("clip"))
        .stdout(predicate::str::contains("session"))
        .stdout(predicate::str::contains("time"));
}

#[test]
fn test_time_command() {
    let dir = TempDir::new().unwrap();
    fetchclip(&dir)
        .args(["time", "2:22", "", "90"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2:22 = 142s (2 minutes 22 seconds)"))
        .stdout(predicate::str::contains(" = 0s (0 minutes 0 seconds)"))
        .stdout(predicate::str::contains("90 = 90s"));
}

#[test]
fn test_time_command_rejects_malformed() {
    let dir = TempDir::new().unwrap();
    fetchclip(&dir)
        .args(["time", "-1:00"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("malformed time"));
}

#[test]
fn test_clip_rejects_inverted_range() {
    let dir = TempDir::new().unwrap();
    fetchclip(&dir)
        .args(["clip", "--url", "https://example.com/v1", "--start", "0:10", "--end", "0:05"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("end time must be greater than start time"));
    assert!(!dir.path().join("work").exists());
}

#[test]
fn test_clip_rejects_non_http_url() {
    let dir = TempDir::new().unwrap();
    fetchclip(&dir)
        .args(["clip", "--url", "ftp://example.com/v1", "--end", "0:05"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported URL scheme"));
}

#[test]
fn test_clip_rejects_unknown_quality() {
    let dir = TempDir::new().unwrap();
    fetchclip(&dir)
        .args(["clip", "--url", "https://example.com/v1", "--quality", "1080", "--end", "0:05"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown quality"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    fetchclip(&dir)
        .args(["--config", "nope.toml", "time", "1:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn test_config_file_is_discovered() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("fetchclip.toml"), "[trim]\ncrf = 99\n").unwrap();
    fetchclip(&dir)
        .args(["time", "1:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("crf"));
}

#[test]
fn test_loaded_config_file_is_logged() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("fetchclip.toml"), "[logging]\nlevel = \"info\"\n").unwrap();
    fetchclip(&dir)
        .env_remove("FETCHCLIP_LOG_LEVEL")
        .args(["time", "1:00"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded configuration from fetchclip.toml"));
}
