mod support;

use predicates::str::contains;
use support::{texts, TestHome};

#[test]
fn list_on_fresh_storage_is_empty() {
    let home = TestHome::new();

    let out = home.json(&["list"]);
    assert_eq!(out["schema_version"], "checklist.v1");
    assert_eq!(out["command"], "list");
    assert_eq!(out["status"], "success");
    assert!(texts(&out["data"]["pending"]).is_empty());
    assert!(texts(&out["data"]["completed"]).is_empty());
    assert!(home.read_blob().is_none());
}

#[test]
fn add_prepends_and_persists() {
    let home = TestHome::new();

    let first = home.json(&["add", "Buy milk"]);
    assert_eq!(first["data"]["added"], true);
    assert_eq!(first["data"]["task"]["text"], "Buy milk");
    assert_eq!(first["data"]["task"]["completed"], false);
    assert!(first["data"]["task"]["createdAt"].is_string());

    home.json(&["add", "Walk dog"]);

    let stored = home.read_blob().expect("blob written");
    assert_eq!(texts(&stored), vec!["Walk dog", "Buy milk"]);

    let out = home.json(&["list"]);
    assert_eq!(texts(&out["data"]["pending"]), vec!["Walk dog", "Buy milk"]);
}

#[test]
fn whitespace_add_is_a_no_op() {
    let home = TestHome::new();
    home.json(&["add", "Buy milk"]);

    let out = home.json(&["add", "   "]);
    assert_eq!(out["status"], "success");
    assert_eq!(out["data"]["added"], false);
    assert!(out["data"].get("task").is_none());

    let stored = home.read_blob().expect("blob written");
    assert_eq!(texts(&stored), vec!["Buy milk"]);
}

#[test]
fn toggle_then_clear_completed() {
    let home = TestHome::new();
    let milk = home.json(&["add", "Buy milk"]);
    let milk_id = milk["data"]["task"]["id"].as_str().expect("id").to_string();
    home.json(&["add", "Walk dog"]);

    let out = home.json(&["toggle", &milk_id]);
    assert_eq!(out["data"]["changed"], true);
    assert_eq!(out["data"]["completed"], true);

    let out = home.json(&["list"]);
    assert_eq!(texts(&out["data"]["pending"]), vec!["Walk dog"]);
    assert_eq!(texts(&out["data"]["completed"]), vec!["Buy milk"]);

    let out = home.json(&["clear-completed"]);
    assert_eq!(out["data"]["removed"], 1);
    assert_eq!(out["data"]["remaining"], 1);

    let stored = home.read_blob().expect("blob written");
    assert_eq!(texts(&stored), vec!["Walk dog"]);
}

#[test]
fn toggle_twice_restores_state() {
    let home = TestHome::new();
    let added = home.json(&["add", "Buy milk"]);
    let id = added["data"]["task"]["id"].as_str().expect("id").to_string();

    home.json(&["toggle", &id]);
    let out = home.json(&["toggle", &id]);
    assert_eq!(out["data"]["completed"], false);

    let stored = home.read_blob().expect("blob written");
    assert_eq!(stored[0]["completed"], false);
    assert_eq!(stored[0]["id"], id.as_str());
}

#[test]
fn toggle_unknown_id_changes_nothing() {
    let home = TestHome::new();
    home.json(&["add", "Buy milk"]);
    let before = home.read_blob();

    let out = home.json(&["toggle", "missing"]);
    assert_eq!(out["status"], "success");
    assert_eq!(out["data"]["changed"], false);
    assert!(out["data"].get("completed").is_none());
    assert_eq!(home.read_blob(), before);
}

#[test]
fn stored_completed_task_lists_as_completed() {
    let home = TestHome::new();
    home.write_blob(r#"[{"id":"1","text":"X","completed":true,"createdAt":"t"}]"#);

    let out = home.json(&["list"]);
    assert!(texts(&out["data"]["pending"]).is_empty());
    assert_eq!(texts(&out["data"]["completed"]), vec!["X"]);
    assert_eq!(out["data"]["completed"][0]["createdAt"], "t");
}

#[test]
fn corrupt_blob_falls_back_to_empty() {
    let home = TestHome::new();
    home.write_blob("{not json");

    let out = home.json(&["list"]);
    assert_eq!(out["status"], "success");
    assert!(texts(&out["data"]["pending"]).is_empty());

    home.json(&["add", "fresh start"]);
    let stored = home.read_blob().expect("blob rewritten");
    assert_eq!(texts(&stored), vec!["fresh start"]);
}

#[test]
fn human_list_shows_sections() {
    let home = TestHome::new();
    home.write_blob(
        r#"[{"id":"2","text":"Walk dog","completed":false,"createdAt":"t2"},
            {"id":"1","text":"Buy milk","completed":true,"createdAt":"t1"}]"#,
    );

    home.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("CheckList: 2 tasks"))
        .stdout(contains("Pending:"))
        .stdout(contains("- [ ] Walk dog  (t2)  2"))
        .stdout(contains("Completed:"))
        .stdout(contains("- [x] Buy milk  (t1)  1"));
}

#[test]
fn human_list_omits_empty_completed_section() {
    let home = TestHome::new();
    home.write_blob(r#"[{"id":"1","text":"Walk dog","completed":false,"createdAt":"t"}]"#);

    let output = home.cmd().arg("list").output().expect("run checklist");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Walk dog"));
    assert!(!stdout.contains("Completed:"));
}

#[test]
fn quiet_suppresses_human_output() {
    let home = TestHome::new();
    let output = home
        .cmd()
        .args(["--quiet", "add", "Buy milk"])
        .output()
        .expect("run checklist");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(home.read_blob().is_some());
}

#[test]
fn config_key_and_labels_are_used() {
    let home = TestHome::new();
    home.write_config("[storage]\nkey = \"todo\"\n\n[display]\ntitle = \"Tarefas\"\n");

    home.cmd().args(["add", "Comprar leite"]).assert().success();
    assert!(home.data_dir().join("todo.json").exists());
    assert!(!home.blob_path().exists());

    home.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Tarefas: 1 tasks"));
}

#[test]
fn invalid_config_falls_back_to_defaults() {
    let home = TestHome::new();
    home.write_config("[storage]\nkey = \"../escape\"\n");

    home.cmd().args(["add", "Buy milk"]).assert().success();
    assert!(home.blob_path().exists());
}

#[test]
fn unreadable_blob_fails_without_writing() {
    let home = TestHome::new();
    // a directory where the blob should be makes every read fail
    std::fs::create_dir_all(home.blob_path()).expect("create dir");

    home.cmd()
        .args(["add", "Buy milk"])
        .assert()
        .code(4)
        .stderr(contains("nothing was changed"));

    let out = home.json(&["list"]);
    assert_eq!(out["status"], "error");
    assert_eq!(out["error"]["kind"], "operation_failed");
    assert_eq!(out["error"]["details"]["key"], "tasks");
    assert!(home.blob_path().is_dir());
}
