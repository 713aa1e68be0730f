//! Task model and the ordered task list
//!
//! The list is newest-first and is always persisted as a single JSON array:
//!
//! ```text
//! [{ "id": "...", "text": "...", "completed": false, "createdAt": "..." }, ...]
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ulid::{Generator, Ulid};

use crate::error::{Error, Result};

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// Display-only creation time, already formatted
    pub created_at: String,
}

impl Task {
    pub fn new(id: impl Into<String>, text: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            completed: false,
            created_at: created_at.into(),
        }
    }
}

/// Insertion-ordered tasks, newest first, ids unique
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

/// Pending and completed views over a [`TaskList`], computed at render time
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    pub pending: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from stored tasks, dropping repeated ids
    ///
    /// The first occurrence of an id wins. Returns the dropped ids.
    pub fn from_tasks(tasks: Vec<Task>) -> (Self, Vec<String>) {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();
        let mut kept = Vec::with_capacity(tasks.len());
        for task in tasks {
            if seen.insert(task.id.clone()) {
                kept.push(task);
            } else {
                dropped.push(task.id);
            }
        }
        (Self { tasks: kept }, dropped)
    }

    /// Parse a stored blob
    ///
    /// Anything that is not a JSON array of tasks is [`Error::CorruptState`].
    pub fn from_json(bytes: &[u8]) -> Result<(Self, Vec<String>)> {
        let tasks: Vec<Task> =
            serde_json::from_slice(bytes).map_err(|err| Error::CorruptState(err.to_string()))?;
        Ok(Self::from_tasks(tasks))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.tasks)?)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Insert `task` as the newest entry
    ///
    /// Returns false (and leaves the list untouched) when the id is taken.
    pub fn prepend(&mut self, task: Task) -> bool {
        if self.contains(&task.id) {
            return false;
        }
        self.tasks.insert(0, task);
        true
    }

    /// Flip `completed` on the task with `id`; false when no such task
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Remove every completed task, keeping the order of the rest
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        before - self.tasks.len()
    }

    /// Place `newer` ahead of the current tasks, skipping ids already present
    pub fn merge_newer(&mut self, newer: TaskList) {
        let mut merged: Vec<Task> = newer
            .tasks
            .into_iter()
            .filter(|task| !self.contains(&task.id))
            .collect();
        merged.append(&mut self.tasks);
        self.tasks = merged;
    }

    pub fn partition(&self) -> Partition<'_> {
        let (completed, pending): (Vec<&Task>, Vec<&Task>) =
            self.tasks.iter().partition(|task| task.completed);
        Partition { pending, completed }
    }
}

/// Monotonic task id source
///
/// Ids are ULIDs; within one generator each id sorts strictly after the last,
/// including ids produced in the same millisecond.
pub struct IdGenerator {
    inner: Generator,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            inner: Generator::new(),
        }
    }

    pub fn next_id(&mut self) -> String {
        match self.inner.generate() {
            Ok(id) => id.to_string(),
            // the random part overflowed within one millisecond
            Err(_) => Ulid::new().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, text: &str, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            text: text.to_string(),
            completed,
            created_at: "2024-01-01 10:00:00".to_string(),
        }
    }

    fn texts(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|task| task.text.clone()).collect()
    }

    #[test]
    fn serializes_with_camel_case_created_at() {
        let (list, _) = TaskList::from_tasks(vec![task("1", "X", true)]);
        let json = String::from_utf8(list.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"[{"id":"1","text":"X","completed":true,"createdAt":"2024-01-01 10:00:00"}]"#
        );
    }

    #[test]
    fn from_json_rejects_malformed_blobs() {
        for blob in [
            &b"not json"[..],
            &br#"{"id":"1"}"#[..],
            &br#"[{"id":"1","text":"X"}]"#[..],
            &br#"[{"id":"1","text":"X","completed":"yes","createdAt":"t"}]"#[..],
        ] {
            let err = TaskList::from_json(blob).expect_err("corrupt");
            assert!(matches!(err, Error::CorruptState(_)));
        }
    }

    #[test]
    fn from_tasks_keeps_first_duplicate() {
        let (list, dropped) = TaskList::from_tasks(vec![
            task("1", "first", false),
            task("2", "other", false),
            task("1", "second", true),
        ]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get("1").unwrap().text, "first");
        assert_eq!(dropped, vec!["1".to_string()]);
    }

    #[test]
    fn prepend_puts_newest_first_and_refuses_duplicates() {
        let mut list = TaskList::new();
        assert!(list.prepend(task("1", "Buy milk", false)));
        assert!(list.prepend(task("2", "Walk dog", false)));
        assert!(!list.prepend(task("1", "again", false)));
        let order: Vec<&str> = list.iter().map(|task| task.text.as_str()).collect();
        assert_eq!(order, vec!["Walk dog", "Buy milk"]);
    }

    #[test]
    fn toggle_keeps_position_and_reports_missing() {
        let mut list = TaskList::new();
        list.prepend(task("1", "a", false));
        list.prepend(task("2", "b", false));
        let before = list.clone();

        assert!(list.toggle("1"));
        assert!(list.get("1").unwrap().completed);
        assert_eq!(list.iter().nth(1).map(|t| t.id.as_str()), Some("1"));

        assert!(list.toggle("1"));
        assert_eq!(list, before);

        assert!(!list.toggle("missing"));
        assert_eq!(list, before);
    }

    #[test]
    fn partition_preserves_relative_order() {
        let (list, _) = TaskList::from_tasks(vec![
            task("1", "a", true),
            task("2", "b", false),
            task("3", "c", true),
            task("4", "d", false),
        ]);
        let partition = list.partition();
        assert_eq!(texts(&partition.pending), vec!["b", "d"]);
        assert_eq!(texts(&partition.completed), vec!["a", "c"]);
        assert_eq!(
            partition.pending.len() + partition.completed.len(),
            list.len()
        );
    }

    #[test]
    fn partition_hides_completed_section_when_none_done() {
        let (list, _) = TaskList::from_tasks(vec![task("1", "a", false)]);
        assert!(list.partition().completed.is_empty());
    }

    #[test]
    fn clear_completed_removes_only_done_tasks() {
        let (mut list, _) = TaskList::from_tasks(vec![
            task("1", "a", true),
            task("2", "b", false),
            task("3", "c", true),
            task("4", "d", false),
        ]);
        assert_eq!(list.clear_completed(), 2);
        let remaining: Vec<&str> = list.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(remaining, vec!["2", "4"]);
        assert_eq!(list.clear_completed(), 0);
    }

    #[test]
    fn merge_newer_prepends_without_duplicates() {
        let (mut loaded, _) = TaskList::from_tasks(vec![task("1", "stored", false)]);
        let (gap, _) = TaskList::from_tasks(vec![task("3", "new", false), task("1", "dup", true)]);
        loaded.merge_newer(gap);
        let ids: Vec<&str> = loaded.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
        assert_eq!(loaded.get("1").unwrap().text, "stored");
    }

    #[test]
    fn id_generator_is_strictly_increasing() {
        let mut ids = IdGenerator::new();
        let generated: Vec<String> = (0..1000).map(|_| ids.next_id()).collect();
        for pair in generated.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
        let unique: HashSet<&String> = generated.iter().collect();
        assert_eq!(unique.len(), generated.len());
    }
}
