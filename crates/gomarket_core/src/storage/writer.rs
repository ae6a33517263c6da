//! Background persist worker.
//!
//! # Responsibility
//! - Accept serialized snapshots from the cart without blocking the caller.
//! - Apply them to the store on a dedicated thread.
//!
//! # Invariants
//! - Callers get no completion signal; failures are logged, never returned.
//! - Jobs are applied in submission order, so the last submitted snapshot
//!   for a key is the one left in storage.
//! - Dropping the writer flushes every queued job before returning.

use super::{KeyValueStore, StorageError, StorageResult};
use log::{debug, error, warn};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

const WORKER_THREAD_NAME: &str = "gomarket-cart-persist";

struct WriteJob {
    key: String,
    value: String,
    revision: u64,
}

/// Handle to the persist worker thread.
pub struct PersistWriter {
    sender: Option<Sender<WriteJob>>,
    worker: Option<JoinHandle<()>>,
}

impl PersistWriter {
    /// Starts a worker that writes into `storage`.
    ///
    /// # Errors
    /// Returns `StorageError::Unavailable` when the OS refuses the thread.
    pub fn spawn<S: KeyValueStore>(storage: Arc<S>) -> StorageResult<Self> {
        let (sender, receiver) = mpsc::channel::<WriteJob>();
        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                for job in receiver {
                    match storage.set_item(&job.key, &job.value) {
                        Ok(()) => debug!(
                            "event=cart_persist module=storage status=ok key={} revision={} bytes={}",
                            job.key,
                            job.revision,
                            job.value.len()
                        ),
                        Err(err) => error!(
                            "event=cart_persist module=storage status=error key={} revision={} error={}",
                            job.key, job.revision, err
                        ),
                    }
                }
            })
            .map_err(|err| {
                StorageError::Unavailable(format!("failed to start persist worker: {err}"))
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Queues `value` for `key` and returns immediately.
    pub fn submit(&self, key: &str, value: String, revision: u64) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        let job = WriteJob {
            key: key.to_string(),
            value,
            revision,
        };
        if sender.send(job).is_err() {
            warn!(
                "event=cart_persist module=storage status=dropped key={} revision={} reason=worker_gone",
                key, revision
            );
        }
    }
}

impl Drop for PersistWriter {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once the queue drains.
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("event=cart_persist module=storage status=error reason=worker_panicked");
            }
        }
    }
}
