use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const POOL: &str = r#"
[[active]]
id = "ui"
name = "Interface"
relations = [{ target = "core", kind = "requirement" }]

[[active]]
id = "tweak"
name = "Another Tweak"
overrides = ["hud"]

[[active]]
id = "hud"
name = "Hud Base"
adds = ["hud"]

[[inactive]]
id = "core"
name = "Core Library"
"#;

#[allow(deprecated)]
fn modorder_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("modorder").unwrap();
    cmd.env("MODORDER_HOME", home.path())
        .env_remove("MODORDER_POOL")
        .env_remove("RUST_LOG");
    cmd
}

fn project(content: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("modorder.toml"), content).unwrap();
    tmp
}

#[test]
fn test_resolve_without_pool_file_fails() {
    let tmp = TempDir::new().unwrap();

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["resolve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not find modorder.toml"));
}

#[test]
fn test_resolve_prints_and_writes_order() {
    let tmp = project(POOL);

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["resolve"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Core Library (core)"))
        .stdout(predicate::str::contains("2. Hud Base (hud)"))
        .stdout(predicate::str::contains("3. Another Tweak (tweak)"))
        .stdout(predicate::str::contains("4. Interface (ui)"))
        .stderr(predicate::str::contains("Activated"))
        .stderr(predicate::str::contains("overrides identifier 'hud'"));

    let written = fs::read_to_string(tmp.path().join("modorder.toml")).unwrap();
    assert!(written.contains("load-order = 4"));
    assert!(!written.contains("[[inactive]]"));
}

#[test]
fn test_resolve_dry_run_keeps_file() {
    let tmp = project(POOL);

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["resolve", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Core Library (core)"));

    assert_eq!(
        fs::read_to_string(tmp.path().join("modorder.toml")).unwrap(),
        POOL
    );
}

#[test]
fn test_resolve_cycle_fails_and_keeps_file() {
    let content = r#"
[[active]]
id = "a"
name = "Alpha"
relations = [
    { target = "b", kind = "patch" },
    { target = "b", kind = "requirement" },
]

[[active]]
id = "b"
name = "Bravo"
"#;
    let tmp = project(content);

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["resolve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Alpha -> Bravo -> Alpha"));

    assert_eq!(
        fs::read_to_string(tmp.path().join("modorder.toml")).unwrap(),
        content
    );
}

#[test]
fn test_resolve_with_explicit_pool_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("profiles").join("survival.toml");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, POOL).unwrap();

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["--pool", "profiles/survival.toml", "resolve"])
        .assert()
        .success();

    assert!(fs::read_to_string(&path).unwrap().contains("load-order = 1"));
}

#[test]
fn test_check_fails_on_missing_requirement() {
    let tmp = project(
        r#"
[[active]]
id = "ui"
name = "Interface"
relations = [{ target = "core", kind = "requirement" }]
"#,
    );

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires 'core'"));
}

#[test]
fn test_check_passes_with_warnings() {
    let tmp = project(POOL);

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["check"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Checked"));

    assert_eq!(
        fs::read_to_string(tmp.path().join("modorder.toml")).unwrap(),
        POOL
    );
}

#[test]
fn test_config_can_hide_warnings() {
    let tmp = project(POOL);
    fs::write(
        tmp.path().join("config.toml"),
        "[output]\nshow-warnings = false\n",
    )
    .unwrap();

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["check"])
        .assert()
        .success()
        .stderr(predicate::str::contains("overrides identifier").not());
}
