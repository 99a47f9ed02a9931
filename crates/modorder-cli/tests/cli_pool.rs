use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const POOL: &str = r#"
[[active]]
id = "a"
name = "Alpha"
load-order = 1

[[active]]
id = "b"
name = "Bravo"
load-order = 2

[[inactive]]
id = "c"
name = "Charlie"
"#;

#[allow(deprecated)]
fn modorder_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("modorder").unwrap();
    cmd.env("MODORDER_HOME", home.path())
        .env_remove("MODORDER_POOL")
        .env_remove("RUST_LOG");
    cmd
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("modorder.toml"), POOL).unwrap();
    tmp
}

#[test]
fn test_list_shows_both_pools() {
    let tmp = project();

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Active (2):"))
        .stdout(predicate::str::contains("1. Alpha (a)"))
        .stdout(predicate::str::contains("Inactive (1):"))
        .stdout(predicate::str::contains("Charlie (c)"));
}

#[test]
fn test_activate_then_list() {
    let tmp = project();

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["activate", "c"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Activated"));

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Active (3):"))
        .stdout(predicate::str::contains("-. Charlie (c)"))
        .stdout(predicate::str::contains("Inactive (0):"));
}

#[test]
fn test_deactivate_unknown_module_fails() {
    let tmp = project();

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["deactivate", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no module with id 'nope'"));

    assert_eq!(
        fs::read_to_string(tmp.path().join("modorder.toml")).unwrap(),
        POOL
    );
}

#[test]
fn test_swap_within_active_pool() {
    let tmp = project();

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["swap", "a", "b"])
        .assert()
        .success();

    let written = fs::read_to_string(tmp.path().join("modorder.toml")).unwrap();
    let b = written.find("id = \"b\"").unwrap();
    let a = written.find("id = \"a\"").unwrap();
    assert!(b < a, "b should now come first:\n{written}");
}

#[test]
fn test_swap_across_pools_fails() {
    let tmp = project();

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["swap", "a", "c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("different pools"));
}

#[test]
fn test_move_to_end() {
    let tmp = project();

    modorder_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["move-to-end", "a"])
        .assert()
        .success();

    let written = fs::read_to_string(tmp.path().join("modorder.toml")).unwrap();
    let b = written.find("id = \"b\"").unwrap();
    let a = written.find("id = \"a\"").unwrap();
    assert!(b < a, "a should now come last:\n{written}");
}

#[test]
fn test_condition_evaluates_expression() {
    let tmp = TempDir::new().unwrap();

    modorder_cmd(&tmp)
        .args(["condition", "ifhas('123') & !ifhas('456')", "--active", "123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));

    modorder_cmd(&tmp)
        .args(["condition", "ifhas('456')", "-a", "123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));
}

#[test]
fn test_condition_syntax_error_fails() {
    let tmp = TempDir::new().unwrap();

    modorder_cmd(&tmp)
        .args(["condition", "ifhas('123') &"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid condition"));
}
