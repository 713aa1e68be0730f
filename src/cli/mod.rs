//! Command-line interface for checklist
//!
//! With no subcommand the terminal UI starts. The other subcommands apply one
//! change to the stored list and exit once it is written.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{self, LogSink, LOG_FILE};
use crate::manager::{ManagerOptions, TaskListManager};
use crate::output::OutputOptions;
use crate::store::FileStore;

mod tasks;

/// checklist - a terminal to-do list
///
/// Add tasks, tick them off and clear the finished ones. Every change is
/// written to local storage as it happens.
#[derive(Parser, Debug)]
#[command(name = "checklist")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the stored task list
    #[arg(long, global = true, env = "CHECKLIST_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true, env = "CHECKLIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the terminal UI (default)
    Ui,

    /// Print pending and completed tasks
    List,

    /// Add a task; whitespace-only text is ignored
    Add {
        /// Task text, stored exactly as given
        text: String,
    },

    /// Toggle completion of a task; unknown ids are ignored
    Toggle {
        /// Task id as shown by `checklist list`
        id: String,
    },

    /// Remove all completed tasks
    ClearCompleted,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config_path = self.config.clone().or_else(Config::default_path);
        let (config, config_error) = match config_path.as_deref() {
            Some(path) => Config::load_reporting(path),
            None => (Config::default(), None),
        };
        let data_dir = config.data_dir(self.data_dir.as_deref());
        let command = self.command.clone().unwrap_or(Commands::Ui);

        let log_path = data_dir.join(LOG_FILE);
        match command {
            Commands::Ui => logging::init(LogSink::File(&log_path)),
            _ => logging::init(LogSink::Stderr),
        }
        if let (Some(err), Some(path)) = (config_error, config_path.as_deref()) {
            tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
        }
        tracing::debug!(data_dir = %data_dir.display(), "resolved data directory");

        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        if let Commands::Ui = command {
            return crate::ui::run(open_manager(&config, &data_dir)?, config.display.clone());
        }

        let mut manager = open_manager(&config, &data_dir)?;
        manager.load();
        if let Some(message) = manager.read_error() {
            return Err(Error::Storage {
                key: manager.key().to_string(),
                message: format!("{message}; nothing was changed"),
            });
        }
        let result = match command {
            Commands::List => tasks::list(&manager, &config, options),
            Commands::Add { text } => tasks::add(&mut manager, &text, options),
            Commands::Toggle { id } => tasks::toggle(&mut manager, &id, options),
            Commands::ClearCompleted => tasks::clear_completed(&mut manager, options),
            Commands::Ui => Ok(()),
        };
        manager.flush()?;
        result
    }
}

/// Build a manager over the file store in `data_dir`
pub fn open_manager(config: &Config, data_dir: &Path) -> Result<TaskListManager> {
    let store = FileStore::new(data_dir).with_lock_timeout(config.storage.lock_timeout_ms);
    TaskListManager::new(Arc::new(store), ManagerOptions::from_config(config))
}
