//! Tracing setup
//!
//! Tracing is opt-in via `RUST_LOG`. Headless commands log to stderr; the TUI
//! owns the terminal, so while it runs log lines go to a file instead.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log file written inside the data directory while the TUI runs
pub const LOG_FILE: &str = "checklist.log";

/// Where formatted log lines go
pub enum LogSink<'a> {
    Stderr,
    File(&'a Path),
}

/// Parse `RUST_LOG`, ignoring empty, oversized or invalid filters
pub fn env_filter() -> Option<EnvFilter> {
    std::env::var("RUST_LOG").ok().and_then(|raw| filter_from(&raw))
}

fn filter_from(raw: &str) -> Option<EnvFilter> {
    let raw = raw.trim();
    if raw.is_empty() || raw.len() > 4096 {
        return None;
    }
    EnvFilter::try_new(raw).ok()
}

/// Install the global subscriber; a no-op when `RUST_LOG` is unset
pub fn init(sink: LogSink<'_>) {
    let Some(filter) = env_filter() else {
        return;
    };

    match sink {
        LogSink::Stderr => {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .try_init();
        }
        LogSink::File(path) => {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let file = match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => file,
                Err(_) => return,
            };
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(filter)
                .try_init();
        }
    }
}
