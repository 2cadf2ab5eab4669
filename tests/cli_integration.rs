//! Integration tests for the command-line interface
//!
//! Runs the check, status, patch and unpatch verbs against a temporary
//! install and checks output and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const METADATA: &str = "GenshinImpact_Data/Managed/Metadata/global-metadata.dat";
const USER_ASSEMBLY: &str = "GenshinImpact_Data/Native/UserAssembly.dll";

/// Helper to create an Ocean install and a matching patch tree
fn setup_install() -> TempDir {
    let dir = TempDir::new().unwrap();
    let game = dir.path().join("game");
    let patches = dir.path().join("patches").join("Genshin Impact Game");

    for (root, prefix) in [(&game, "original"), (&patches, "patched")] {
        for rel in [METADATA, USER_ASSEMBLY] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("{prefix} {rel}")).unwrap();
        }
    }
    fs::write(game.join("GenshinImpact.exe"), b"MZ").unwrap();

    dir
}

fn patcher(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("game-patcher").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("GAME_PATCHER_GAME_DIR")
        .env_remove("GAME_PATCHER_PATCH_DIR")
        .env_remove("RUST_LOG")
        .args(["--game-dir", "game", "--patch-dir", "patches"]);
    cmd
}

#[test]
fn test_help() {
    Command::cargo_bin("game-patcher")
        .unwrap()
        .args(["patch", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Back up the game files and replace them with the patch files",
        ));
}

#[test]
fn test_check() {
    let dir = setup_install();

    patcher(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Client: ocean"))
        .stdout(predicate::str::contains("Check: operation completed"));
}

#[test]
fn test_check_missing_patch_files() {
    let dir = setup_install();
    fs::remove_dir_all(dir.path().join("patches")).unwrap();

    patcher(dir.path())
        .arg("check")
        .assert()
        .code(18)
        .stderr(predicate::str::contains("patch files not found"));
}

#[test]
fn test_patch_and_unpatch() {
    let dir = setup_install();
    let live = dir.path().join("game").join(METADATA);

    patcher(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("game files are not patched"));

    patcher(dir.path())
        .arg("patch")
        .assert()
        .success()
        .stdout(predicate::str::contains("Patch: operation completed"));
    assert!(fs::read_to_string(&live).unwrap().starts_with("patched"));

    patcher(dir.path())
        .arg("patch")
        .assert()
        .success()
        .stdout(predicate::str::contains("game files are already patched"));

    patcher(dir.path())
        .arg("unpatch")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unpatch: operation completed"));
    assert!(fs::read_to_string(&live).unwrap().starts_with("original"));
}

#[test]
fn test_unpatch_without_backup_fails() {
    let dir = setup_install();

    patcher(dir.path())
        .arg("unpatch")
        .assert()
        .code(17)
        .stderr(predicate::str::contains("backup files not found"));
}

#[test]
fn test_status_json() {
    let dir = setup_install();

    let output = patcher(dir.path())
        .args(["status", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["client"], "ocean");
    assert_eq!(report["state"], "not_patched");
    assert_eq!(report["files"].as_array().unwrap().len(), 2);
    assert_eq!(report["files"][0]["role"], "metadata");
    assert_eq!(report["files"][0]["matched"], false);
}

#[test]
fn test_verify_patch_tree() {
    let dir = setup_install();
    let extra = dir.path().join("patches/Genshin Impact Game/GenshinImpact_Data/extra.txt");
    fs::write(&extra, "extra").unwrap();

    patcher(dir.path())
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("GenshinImpact_Data/extra.txt (missing)"))
        .stdout(predicate::str::contains("Verify: game files are not patched"));

    fs::remove_file(&extra).unwrap();
    patcher(dir.path()).arg("patch").assert().success();

    let output = patcher(dir.path())
        .args(["verify", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let comparison: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(comparison["matched"].as_array().unwrap().len(), 2);
    assert!(comparison["differing"].as_array().unwrap().is_empty());
}

#[test]
fn test_verify_without_patch_tree() {
    let dir = setup_install();
    fs::remove_dir_all(dir.path().join("patches")).unwrap();

    patcher(dir.path())
        .arg("verify")
        .assert()
        .code(18)
        .stderr(predicate::str::contains("Verify: patch files not found"));
}

#[test]
fn test_game_dir_from_executable() {
    let dir = setup_install();

    let mut cmd = Command::cargo_bin("game-patcher").unwrap();
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("GAME_PATCHER_GAME_DIR")
        .args([
            "--game-dir",
            "game/GenshinImpact.exe",
            "--patch-dir",
            "patches",
            "check",
        ])
        .assert()
        .success();
}

#[test]
fn test_settings_file() {
    let dir = setup_install();
    fs::write(
        dir.path().join("game-patcher.toml"),
        "game_dir = \"game\"\npatch_dir = \"patches\"\n",
    )
    .unwrap();

    Command::cargo_bin("game-patcher")
        .unwrap()
        .current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("GAME_PATCHER_GAME_DIR")
        .env_remove("GAME_PATCHER_PATCH_DIR")
        .arg("patch")
        .assert()
        .success()
        .stdout(predicate::str::contains("Patch: operation completed"));
}

#[test]
fn test_missing_game_dir() {
    let dir = TempDir::new().unwrap();

    Command::cargo_bin("game-patcher")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("GAME_PATCHER_GAME_DIR")
        .args(["--game-dir", "/nonexistent/game", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Game directory does not exist"));
}
