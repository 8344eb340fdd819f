#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// A stand-in engine: one image, no containers, every mutation fails.
fn fake_docker(dir: &Path) -> PathBuf {
    let path = dir.join("docker");
    fs::write(
        &path,
        r#"#!/bin/sh
case "$1" in
  images) echo '{"ID":"sha256:1","Repository":"base","Tag":"1.0"}' ;;
  ps) ;;
  *) echo "fake engine: $1 refused" >&2; exit 1 ;;
esac
"#,
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn run(docker: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docker-image-builder"))
        .args(args)
        .env("DIB_DOCKER", docker)
        .env("NO_COLOR", "1")
        .env_remove("DIB_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run docker-image-builder")
}

#[test]
fn test_missing_engine_exits_127() {
    let out = run(Path::new("/nonexistent/dib-docker"), &["run", "-i", "base:1.0", "-c", "stg"]);
    assert_eq!(out.status.code(), Some(127), "{}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn test_missing_source_image_exits_1() {
    let td = tempfile::tempdir().unwrap();
    let docker = fake_docker(td.path());
    let out = run(
        &docker,
        &["build", "-s", "missing:1.0", "-c", "stg", "-t", "derived:1.0", "-b", "shell"],
    );
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("source image does not exist"), "{stderr}");
}

#[test]
fn test_container_creation_failure_exits_1() {
    let td = tempfile::tempdir().unwrap();
    let docker = fake_docker(td.path());
    let out = run(&docker, &["run", "-i", "base:1.0", "-c", "stg"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn test_bad_inline_variables_exit_1() {
    let td = tempfile::tempdir().unwrap();
    let docker = fake_docker(td.path());
    let out = run(
        &docker,
        &[
            "build", "-s", "base:1.0", "-c", "stg", "-t", "derived:1.0", "-b", "shell", "-e",
            "a: [unterminated",
        ],
    );
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("cannot load variables"), "{stderr}");
}

#[test]
fn test_halt_without_targets_exits_1() {
    let td = tempfile::tempdir().unwrap();
    let docker = fake_docker(td.path());
    let out = run(&docker, &["halt"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn test_json_log_format() {
    let td = tempfile::tempdir().unwrap();
    let docker = fake_docker(td.path());
    let out = run(
        &docker,
        &["--log-format", "json", "run", "-i", "nope:1", "-c", "stg"],
    );
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    let line = stderr
        .lines()
        .find(|l| l.contains("source image does not exist"))
        .expect("missing log line");
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["level"], "ERROR");
}
