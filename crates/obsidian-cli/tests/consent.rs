use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_consent_choice_persists_between_runs() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("obsidian")
        .env("OBSIDIAN_HOME", dir.path())
        .args(["consent", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cookie choice recorded."))
        .stdout(predicate::str::contains("essential: blocked"));

    cargo_bin_cmd!("obsidian")
        .env("OBSIDIAN_HOME", dir.path())
        .args(["consent", "select", "--analytics"])
        .assert()
        .success();

    cargo_bin_cmd!("obsidian")
        .env("OBSIDIAN_HOME", dir.path())
        .args(["consent", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("analytics: allowed"))
        .stdout(predicate::str::contains("marketing: blocked"));

    cargo_bin_cmd!("obsidian")
        .env("OBSIDIAN_HOME", dir.path())
        .args(["consent", "reset"])
        .assert()
        .success();

    cargo_bin_cmd!("obsidian")
        .env("OBSIDIAN_HOME", dir.path())
        .args(["consent", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cookie choice recorded."));
}
