//! Background write-through of task list snapshots
//!
//! Callers hand over a fully serialized snapshot and return immediately. A
//! single worker thread owns all writes to the store. When snapshots queue up
//! faster than the store accepts them, only the newest one is written: each
//! snapshot is the whole list, so the last one supersedes the rest.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::store::Store;

/// Extra attempts after a failed write
const WRITE_RETRIES: usize = 1;

enum WriteRequest {
    Snapshot(Vec<u8>),
    Flush(Sender<()>),
}

/// Fire-and-forget writer for one storage key
pub struct WriteThrough {
    tx: Option<Sender<WriteRequest>>,
    handle: Option<JoinHandle<()>>,
    key: String,
}

impl WriteThrough {
    pub fn spawn(store: Arc<dyn Store>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let (tx, rx) = mpsc::channel();
        let worker_key = key.clone();
        let handle = thread::Builder::new()
            .name("checklist-writer".to_string())
            .spawn(move || run_worker(store, worker_key, rx))?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
            key,
        })
    }

    /// Queue `snapshot` for writing; never blocks
    pub fn submit(&self, snapshot: Vec<u8>) {
        let sent = self
            .tx
            .as_ref()
            .map(|tx| tx.send(WriteRequest::Snapshot(snapshot)).is_ok())
            .unwrap_or(false);
        if !sent {
            tracing::warn!(key = %self.key, "writer stopped; snapshot dropped");
        }
    }

    /// Block until every snapshot submitted so far has been attempted
    pub fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = mpsc::channel();
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| Error::OperationFailed("writer already stopped".to_string()))?;
        tx.send(WriteRequest::Flush(done_tx))
            .map_err(|_| Error::OperationFailed("writer thread exited".to_string()))?;
        done_rx
            .recv()
            .map_err(|_| Error::OperationFailed("writer thread exited".to_string()))
    }
}

impl Drop for WriteThrough {
    fn drop(&mut self) {
        // closing the channel lets the worker drain what is queued and exit
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(key = %self.key, "writer thread panicked");
            }
        }
    }
}

fn run_worker(store: Arc<dyn Store>, key: String, rx: Receiver<WriteRequest>) {
    while let Ok(first) = rx.recv() {
        let mut latest = None;
        let mut waiters = Vec::new();
        let mut superseded = 0usize;

        let mut take = |req: WriteRequest| match req {
            WriteRequest::Snapshot(bytes) => {
                if latest.replace(bytes).is_some() {
                    superseded += 1;
                }
            }
            WriteRequest::Flush(done) => waiters.push(done),
        };

        take(first);
        while let Ok(req) = rx.try_recv() {
            take(req);
        }

        if superseded > 0 {
            tracing::debug!(key = %key, superseded, "coalesced queued snapshots");
        }
        if let Some(bytes) = latest {
            write_with_retry(store.as_ref(), &key, &bytes);
        }
        for done in waiters {
            let _ = done.send(());
        }
    }
    tracing::debug!(key = %key, "writer stopped");
}

fn write_with_retry(store: &dyn Store, key: &str, bytes: &[u8]) {
    let mut attempt = 0usize;
    loop {
        match store.set(key, bytes) {
            Ok(()) => {
                tracing::debug!(key = %key, bytes = bytes.len(), attempt, "snapshot persisted");
                return;
            }
            Err(err) if attempt < WRITE_RETRIES => {
                tracing::warn!(key = %key, error = %err, "snapshot write failed; retrying");
                attempt += 1;
            }
            Err(err) => {
                tracing::error!(key = %key, error = %err, "snapshot write failed; dropped");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Store that fails the first `failures` writes and records every attempt
    struct FlakyStore {
        inner: MemoryStore,
        failures: AtomicUsize,
        attempts: AtomicUsize,
    }

    impl FlakyStore {
        fn new(failures: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                failures: AtomicUsize::new(failures),
                attempts: AtomicUsize::new(0),
            }
        }
    }

    impl Store for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &[u8]) -> Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(Error::Storage {
                    key: key.to_string(),
                    message: "disk full".to_string(),
                });
            }
            self.inner.set(key, value)
        }
    }

    /// Store whose writes are slow, recording the order blobs land in
    struct SlowStore {
        written: Mutex<Vec<Vec<u8>>>,
    }

    impl Store for SlowStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.written.lock().unwrap().last().cloned())
        }

        fn set(&self, _key: &str, value: &[u8]) -> Result<()> {
            thread::sleep(Duration::from_millis(20));
            self.written.lock().unwrap().push(value.to_vec());
            Ok(())
        }
    }

    #[test]
    fn flush_waits_for_submitted_snapshot() {
        let store = MemoryStore::new();
        let writer = WriteThrough::spawn(Arc::new(store.clone()), "tasks").unwrap();
        writer.submit(b"[1]".to_vec());
        writer.flush().unwrap();
        assert_eq!(store.get_string("tasks").as_deref(), Some("[1]"));
    }

    #[test]
    fn last_snapshot_wins_with_slow_store() {
        let store = Arc::new(SlowStore {
            written: Mutex::new(Vec::new()),
        });
        let writer = WriteThrough::spawn(store.clone(), "tasks").unwrap();
        for idx in 0..10 {
            writer.submit(format!("[{idx}]").into_bytes());
        }
        writer.flush().unwrap();

        let written = store.written.lock().unwrap();
        assert_eq!(written.last().map(|b| b.as_slice()), Some(&b"[9]"[..]));
        assert!(written.len() <= 10);
    }

    #[test]
    fn failed_write_is_retried_once() {
        let store = Arc::new(FlakyStore::new(1));
        let writer = WriteThrough::spawn(store.clone(), "tasks").unwrap();
        writer.submit(b"[]".to_vec());
        writer.flush().unwrap();
        assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(store.inner.get_string("tasks").as_deref(), Some("[]"));
    }

    #[test]
    fn persistent_failure_is_dropped_after_retry() {
        let store = Arc::new(FlakyStore::new(5));
        let writer = WriteThrough::spawn(store.clone(), "tasks").unwrap();
        writer.submit(b"[]".to_vec());
        writer.flush().unwrap();
        assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
        assert!(store.inner.get_string("tasks").is_none());
    }

    #[test]
    fn drop_drains_queued_snapshots() {
        let store = MemoryStore::new();
        {
            let writer = WriteThrough::spawn(Arc::new(store.clone()), "tasks").unwrap();
            writer.submit(b"[\"a\"]".to_vec());
            writer.submit(b"[\"b\"]".to_vec());
        }
        assert_eq!(store.get_string("tasks").as_deref(), Some("[\"b\"]"));
    }
}
