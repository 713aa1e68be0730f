use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A scratch data directory plus a config path that does not exist
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn blob_path(&self) -> PathBuf {
        self.data_dir().join("tasks.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("checklist.toml")
    }

    pub fn write_blob(&self, contents: &str) {
        write_file(&self.blob_path(), contents);
    }

    pub fn write_config(&self, contents: &str) {
        write_file(&self.config_path(), contents);
    }

    pub fn read_blob(&self) -> Option<Value> {
        let raw = fs::read_to_string(self.blob_path()).ok()?;
        Some(serde_json::from_str(&raw).expect("stored blob is json"))
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("checklist").expect("binary");
        cmd.env("CHECKLIST_DATA_DIR", self.data_dir())
            .env("CHECKLIST_CONFIG", self.config_path())
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run a command with `--json` and return the parsed envelope
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run checklist");
        serde_json::from_slice(&output.stdout).expect("json envelope")
    }
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dir");
    }
    fs::write(path, contents).expect("write file");
}

/// Texts of a task array in order
pub fn texts(tasks: &Value) -> Vec<String> {
    tasks
        .as_array()
        .expect("task array")
        .iter()
        .map(|task| task["text"].as_str().expect("text").to_string())
        .collect()
}
