//! checklist - a terminal to-do list
//!
//! This library provides the core of the checklist CLI: a task list whose
//! every change is written through to local storage.
//!
//! # Core Concepts
//!
//! - **Gate**: the entry screen with a single `ENTER` control
//! - **Task list**: newest-first tasks, each pending or completed
//! - **Write-through**: every change is persisted off the UI thread
//! - **Store**: a key/value capability the list is read from and written to
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `checklist.toml`
//! - `error`: Error types and result aliases
//! - `gate`: Entry screen routing
//! - `lock`: File locking and atomic writes
//! - `logging`: Tracing subscriber setup
//! - `manager`: Task list manager owning the list and the draft
//! - `output`: Human and JSON output for the headless commands
//! - `persist`: Background write-through worker
//! - `store`: Store capability with file and in-memory backends
//! - `task`: Task model, ordering and id generation
//! - `ui`: Terminal UI using ratatui

pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod lock;
pub mod logging;
pub mod manager;
pub mod output;
pub mod persist;
pub mod store;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
