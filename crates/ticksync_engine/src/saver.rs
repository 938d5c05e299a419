//! Debounced persistence of local edits.

use crate::store::LocalStore;
use parking_lot::Mutex;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error};

enum SaverMessage {
    Touch,
    Shutdown,
}

/// Coalesces rapid local edits into a single disk write.
///
/// Each [`DebouncedSaver::schedule`] restarts a single-shot timer; the store
/// is flushed once the timer expires with no further edits (a trailing
/// debounce). Dropping the saver flushes any pending save before the worker
/// exits.
pub struct DebouncedSaver {
    tx: Sender<SaverMessage>,
    worker: Option<JoinHandle<()>>,
}

impl DebouncedSaver {
    /// Spawns the saver worker for the given store.
    #[must_use]
    pub fn new(store: Arc<Mutex<LocalStore>>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            let mut deadline: Option<Instant> = None;
            loop {
                let message = match deadline {
                    Some(at) => {
                        let now = Instant::now();
                        if at <= now {
                            flush(&store);
                            deadline = None;
                            continue;
                        }
                        match rx.recv_timeout(at - now) {
                            Ok(message) => message,
                            Err(RecvTimeoutError::Timeout) => {
                                flush(&store);
                                deadline = None;
                                continue;
                            }
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    }
                    None => match rx.recv() {
                        Ok(message) => message,
                        Err(_) => break,
                    },
                };

                match message {
                    SaverMessage::Touch => deadline = Some(Instant::now() + delay),
                    SaverMessage::Shutdown => {
                        flush(&store);
                        break;
                    }
                }
            }
        });

        Self {
            tx,
            worker: Some(worker),
        }
    }

    /// Restarts the debounce timer; the store is saved `delay` after the
    /// last call.
    pub fn schedule(&self) {
        // A closed channel means the worker already shut down; nothing to do.
        let _ = self.tx.send(SaverMessage::Touch);
    }
}

impl Drop for DebouncedSaver {
    fn drop(&mut self) {
        let _ = self.tx.send(SaverMessage::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn flush(store: &Mutex<LocalStore>) {
    let mut store = store.lock();
    if !store.pending_save() {
        return;
    }
    match store.save() {
        Ok(()) => debug!("debounced save flushed"),
        Err(err) => error!(error = %crate::error::error_chain(&err), "debounced save failed"),
    }
}
