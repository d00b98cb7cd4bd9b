//! Integration tests for the mkbootblob binary

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn mkbootblob(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mkbootblob").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("MKBOOTBLOB_OUTPUT")
        .env_remove("MKBOOTBLOB_MANIFEST");
    cmd
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    std::fs::write(dir.path().join("kernel.bin"), vec![0x11; 5000]).expect("write kernel");
    std::fs::write(dir.path().join("logo.bmp"), vec![0x22; 100]).expect("write logo");
    std::fs::write(dir.path().join("fonts.arc"), vec![0x33; 4096]).expect("write archive");
    dir
}

#[test]
fn test_help_command() {
    let dir = tempfile::tempdir().unwrap();
    mkbootblob(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bootable firmware blob"))
        .stdout(predicate::str::contains("--file"))
        .stdout(predicate::str::contains("--dest"))
        .stdout(predicate::str::contains("--type"))
        .stdout(predicate::str::contains("--index"));
}

#[test]
fn test_version_command() {
    let dir = tempfile::tempdir().unwrap();
    mkbootblob(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mkbootblob"));
}

#[test]
fn test_build_default_output() {
    let dir = workspace();
    mkbootblob(dir.path())
        .args(["-f", "kernel.bin", "-d", "00100000", "-t", "kernel"])
        .args(["-f", "logo.bmp", "-d", "0x00800000", "-t", "bootlogo"])
        .args(["-f", "fonts.arc", "-t", "arc", "-i", "2", "-d", "04000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("destination |"))
        .stdout(predicate::str::contains(
            " 0x00100000 |       8192 |        1 |      16 | kernel  | kernel.bin",
        ))
        .stdout(predicate::str::contains(
            " 0x00800000 |       4096 |       17 |       8 |  logo   | logo.bmp",
        ))
        .stdout(predicate::str::contains(
            " 0x04000000 |       4096 |       25 |       8 |   arc   | fonts.arc",
        ));

    let image = std::fs::read(dir.path().join("out.bin")).unwrap();
    assert_eq!(image.len(), 512 + 8192 + 4096 + 4096);
    // archive record type field: 8 + 2
    assert_eq!(&image[44..48], &10u32.to_le_bytes());
}

#[test]
fn test_inspect_existing_image() {
    let dir = workspace();
    mkbootblob(dir.path())
        .args(["-f", "kernel.bin", "-d", "100000", "-t", "kernel", "-o", "flash.bin"])
        .assert()
        .success();

    mkbootblob(dir.path())
        .args(["--inspect", "flash.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8704 bytes"))
        .stdout(predicate::str::contains("0x00100000"))
        .stdout(predicate::str::contains("kernel"));
}

#[test]
fn test_inspect_ignores_manifest_from_env() {
    let dir = workspace();
    mkbootblob(dir.path())
        .args(["-f", "kernel.bin", "-t", "kernel", "-o", "flash.bin"])
        .assert()
        .success();

    mkbootblob(dir.path())
        .env("MKBOOTBLOB_MANIFEST", "blob.json")
        .args(["--inspect", "flash.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kernel"));
}

#[test]
fn test_archive_index_out_of_range_fails() {
    let dir = workspace();
    mkbootblob(dir.path())
        .args(["-f", "fonts.arc", "-t", "arc", "-i", "FFFFFFF8"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("out of range"));
    assert!(!dir.path().join("out.bin").exists());
}

#[test]
fn test_dry_run() {
    let dir = workspace();
    mkbootblob(dir.path())
        .args(["--dry-run", "-f", "kernel.bin", "-t", "kernel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kernel.bin"));
    assert!(!dir.path().join("out.bin").exists());
}

#[test]
fn test_missing_source_fails() {
    let dir = workspace();
    std::fs::write(dir.path().join("out.bin"), b"keep me").unwrap();

    mkbootblob(dir.path())
        .args(["-f", "kernel.bin", "-t", "kernel", "-f", "absent.bin", "-t", "binload"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("absent.bin"))
        .stderr(predicate::function(|err: &str| {
            err.lines().filter(|l| l.starts_with("Error:")).count() == 1
                && err.matches("os error").count() == 1
        }));

    assert_eq!(std::fs::read(dir.path().join("out.bin")).unwrap(), b"keep me");
}

#[test]
fn test_unknown_type_fails() {
    let dir = workspace();
    mkbootblob(dir.path())
        .args(["-f", "kernel.bin", "-t", "firmware"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown component type 'firmware'"))
        .stderr(predicate::str::contains("has no type"));
}

#[test]
fn test_no_components_fails() {
    let dir = tempfile::tempdir().unwrap();
    mkbootblob(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no components given"));
}

#[test]
fn test_directive_before_file_fails() {
    let dir = workspace();
    mkbootblob(dir.path())
        .args(["-t", "kernel", "-f", "kernel.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("before any file"));
}

#[test]
fn test_manifest_build() {
    let dir = workspace();
    std::fs::write(
        dir.path().join("blob.json"),
        r#"{
            "output": "manifest.bin",
            "components": [
                { "file": "kernel.bin", "dest": "0x00100000", "type": "kernel" },
                { "file": "fonts.arc", "dest": 67108864, "type": "arc", "index": 1 }
            ]
        }"#,
    )
    .unwrap();

    mkbootblob(dir.path())
        .args(["--manifest", "blob.json"])
        .assert()
        .success();

    let image = std::fs::read(dir.path().join("manifest.bin")).unwrap();
    assert_eq!(image.len(), 512 + 8192 + 4096);
    assert_eq!(&image[28..32], &9u32.to_le_bytes());
}
