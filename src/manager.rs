//! Task list manager
//!
//! Owns the in-memory task list and the draft buffer. Every mutation commits
//! synchronously and then hands a full snapshot to the background writer;
//! callers never wait on storage.

use std::fmt::Write as _;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Local;

use crate::config::Config;
use crate::error::Result;
use crate::persist::WriteThrough;
use crate::store::{self, Store};
use crate::task::{IdGenerator, Task, TaskList};

const FALLBACK_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const READ_RETRIES: usize = 1;
const READ_RETRY_DELAY_MS: u64 = 50;

/// Read the blob under `key`, retrying a failed read once
pub fn read_stored(store: &dyn Store, key: &str) -> Result<Option<Vec<u8>>> {
    let mut attempt = 0;
    loop {
        match store.get(key) {
            Ok(stored) => return Ok(stored),
            Err(err) if attempt < READ_RETRIES => {
                attempt += 1;
                tracing::debug!(key = %key, error = %err, "read failed; retrying");
                thread::sleep(Duration::from_millis(READ_RETRY_DELAY_MS));
            }
            Err(err) => return Err(err),
        }
    }
}

/// Settings the manager takes from [`Config`]
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Storage key of the task list blob
    pub key: String,
    /// `chrono` strftime format for `createdAt`
    pub timestamp_format: String,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ManagerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            key: config.storage.key.clone(),
            timestamp_format: config.display.timestamp_format.clone(),
        }
    }
}

/// What the checklist screen shows
#[derive(Debug, Clone)]
pub struct ChecklistView<'a> {
    pub draft: &'a str,
    pub pending: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

impl ChecklistView<'_> {
    /// The completed list and its clear control only exist when non-empty
    pub fn shows_completed(&self) -> bool {
        !self.completed.is_empty()
    }

    pub fn can_add(&self) -> bool {
        !self.draft.trim().is_empty()
    }
}

pub struct TaskListManager {
    store: Arc<dyn Store>,
    writer: WriteThrough,
    options: ManagerOptions,
    tasks: TaskList,
    draft: String,
    ids: IdGenerator,
    loaded: bool,
    read_error: Option<String>,
}

impl TaskListManager {
    pub fn new(store: Arc<dyn Store>, options: ManagerOptions) -> Result<Self> {
        store::validate_key(&options.key)?;
        let writer = WriteThrough::spawn(store.clone(), options.key.clone())?;
        Ok(Self {
            store,
            writer,
            options,
            tasks: TaskList::new(),
            draft: String::new(),
            ids: IdGenerator::new(),
            loaded: false,
            read_error: None,
        })
    }

    /// Shared handle to the injected store, for off-thread loading
    pub fn store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    pub fn key(&self) -> &str {
        &self.options.key
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Message of the last failed read, cleared by a successful one
    pub fn read_error(&self) -> Option<&str> {
        self.read_error.as_deref()
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Read the stored list and replace in-memory state with it
    pub fn load(&mut self) {
        let stored = read_stored(self.store.as_ref(), &self.options.key);
        self.hydrate(stored);
    }

    /// Apply the result of reading the store
    ///
    /// Absent or empty blobs leave the list empty. Corrupt blobs are logged
    /// and discarded. A failed read changes nothing and, before the first
    /// successful load, keeps writes disabled so the stored list survives.
    /// Tasks added before the first load resolved are kept ahead of the
    /// stored ones.
    pub fn hydrate(&mut self, stored: Result<Option<Vec<u8>>>) {
        let key = self.options.key.as_str();
        let stored = match stored {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "failed to read stored tasks; writes stay off");
                self.read_error = Some(err.to_string());
                return;
            }
        };
        self.read_error = None;
        let loaded = match stored {
            Some(bytes) if !bytes.is_empty() => match TaskList::from_json(&bytes) {
                Ok((tasks, dropped)) => {
                    if !dropped.is_empty() {
                        tracing::warn!(key = %key, ?dropped, "dropped tasks with duplicate ids");
                    }
                    tasks
                }
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "discarding stored tasks");
                    TaskList::new()
                }
            },
            _ => TaskList::new(),
        };

        let first_load = !self.loaded;
        let gap = std::mem::replace(&mut self.tasks, loaded);
        self.loaded = true;
        tracing::info!(key = %self.options.key, tasks = self.tasks.len(), "task list loaded");

        if first_load && !gap.is_empty() {
            tracing::debug!(added = gap.len(), "keeping tasks added before load");
            self.tasks.merge_newer(gap);
            self.write_through();
        }
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn push_draft(&mut self, ch: char) {
        self.draft.push(ch);
    }

    pub fn pop_draft(&mut self) {
        self.draft.pop();
    }

    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    /// Commit the draft as the newest task
    ///
    /// A draft that is blank after trimming is a no-op and stays as typed.
    /// The stored text is the untrimmed draft.
    pub fn add_task(&mut self) -> Option<&Task> {
        if self.draft.trim().is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.draft);
        let task = Task::new(self.ids.next_id(), text, self.timestamp());
        let id = task.id.clone();
        if !self.tasks.prepend(task) {
            // generator ids never repeat; a stored id could
            tracing::warn!(id = %id, "generated id already present");
            return None;
        }
        tracing::debug!(id = %id, "task added");
        self.write_through();
        self.tasks.get(&id)
    }

    /// Flip completion of task `id`; unknown ids are a no-op
    pub fn toggle_complete(&mut self, id: &str) -> bool {
        if !self.tasks.toggle(id) {
            tracing::debug!(id = %id, "toggle ignored; no such task");
            return false;
        }
        self.write_through();
        true
    }

    /// Remove completed tasks; the list is written even when nothing changed
    pub fn clear_completed(&mut self) -> usize {
        let removed = self.tasks.clear_completed();
        tracing::debug!(removed, "cleared completed tasks");
        self.write_through();
        removed
    }

    pub fn render(&self) -> ChecklistView<'_> {
        let partition = self.tasks.partition();
        ChecklistView {
            draft: &self.draft,
            pending: partition.pending,
            completed: partition.completed,
        }
    }

    /// Wait until every write issued so far has been attempted
    pub fn flush(&self) -> Result<()> {
        self.writer.flush()
    }

    fn write_through(&self) {
        if !self.loaded {
            tracing::debug!("write skipped until the stored list is loaded");
            return;
        }
        match self.tasks.to_json() {
            Ok(snapshot) => self.writer.submit(snapshot),
            Err(err) => tracing::error!(error = %err, "failed to serialize tasks"),
        }
    }

    fn timestamp(&self) -> String {
        let now = Local::now();
        let mut out = String::new();
        if write!(out, "{}", now.format(&self.options.timestamp_format)).is_err() {
            out.clear();
            let _ = write!(out, "{}", now.format(FALLBACK_TIMESTAMP_FORMAT));
        }
        out
    }
}
