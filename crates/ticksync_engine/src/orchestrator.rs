//! The sync orchestrator: drives complete pull/merge/push/save cycles.

use crate::config::SyncConfig;
use crate::error::{error_chain, StoreError, SyncError, SyncResult};
use crate::remote::RemoteProvider;
use crate::saver::DebouncedSaver;
use crate::store::LocalStore;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use ticksync_core::{merge, Snapshot, Task};
use tracing::{error, info, warn};

/// Summary of a completed sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Global revision after the cycle.
    pub revision: i64,
    /// Task count after the cycle.
    pub tasks: usize,
    /// Tag count after the cycle.
    pub tags: usize,
    /// True if the merged snapshot was pushed to the remote.
    pub pushed: bool,
    /// True if the merged snapshot was persisted locally.
    pub saved: bool,
}

/// What a completed cycle told its listeners.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// The cycle finished; here is its report.
    Completed(SyncReport),
    /// The cycle failed; the rendered causal error chain.
    Failed(String),
}

/// Callback invoked exactly once when an admitted sync cycle completes.
pub type SyncListener = Box<dyn Fn(&SyncOutcome) + Send + Sync>;

/// Coordinates the local store, the remote provider, and the merge.
///
/// At most one sync cycle and one login attempt are in flight at a time,
/// each guarded by its own atomic flag; a concurrent caller is rejected
/// with an error rather than queued. An admitted cycle runs to completion.
/// Local edits go through the orchestrator so they can be coalesced into a
/// single debounced disk write.
pub struct SyncOrchestrator {
    remote: Arc<dyn RemoteProvider>,
    store: Arc<Mutex<LocalStore>>,
    saver: DebouncedSaver,
    sync_in_flight: AtomicBool,
    login_in_flight: AtomicBool,
    listeners: Mutex<Vec<SyncListener>>,
}

impl SyncOrchestrator {
    /// Creates an orchestrator for the given configuration and remote.
    #[must_use]
    pub fn new(config: SyncConfig, remote: Arc<dyn RemoteProvider>) -> Self {
        let store = Arc::new(Mutex::new(LocalStore::new(&config.data_path)));
        let saver = DebouncedSaver::new(Arc::clone(&store), config.save_debounce);
        Self {
            remote,
            store,
            saver,
            sync_in_flight: AtomicBool::new(false),
            login_in_flight: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Registers a completion listener, notified once per admitted cycle.
    pub fn add_listener(&self, listener: SyncListener) {
        self.listeners.lock().push(listener);
    }

    /// Runs one complete sync cycle on the calling thread.
    ///
    /// Returns [`SyncError::AlreadyInProgress`] without side effects if a
    /// cycle is already running; rejected callers retry later. On completion
    /// of an admitted cycle the listeners are notified exactly once, whether
    /// it succeeded or failed.
    pub fn sync_once(&self) -> SyncResult<SyncReport> {
        if self
            .sync_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("sync already in progress, rejecting duplicate request");
            return Err(SyncError::AlreadyInProgress);
        }

        let result = self.run_cycle();
        self.sync_in_flight.store(false, Ordering::SeqCst);

        let outcome = match &result {
            Ok(report) => SyncOutcome::Completed(report.clone()),
            Err(err) => SyncOutcome::Failed(error_chain(err)),
        };
        for listener in self.listeners.lock().iter() {
            listener(&outcome);
        }

        result
    }

    /// Runs a sync cycle on a background thread.
    ///
    /// The single-flight guard applies exactly as for [`Self::sync_once`];
    /// completion is observable through the registered listeners or the
    /// returned handle.
    pub fn spawn_sync(self: &Arc<Self>) -> JoinHandle<SyncResult<SyncReport>> {
        let this = Arc::clone(self);
        thread::spawn(move || this.sync_once())
    }

    fn run_cycle(&self) -> SyncResult<SyncReport> {
        // Load-once: the working snapshot is read from disk the first time
        // a cycle runs and cached thereafter.
        drop(self.store_loaded().map_err(SyncError::LocalLoad)?);

        let remote_snapshot = self.pull_remote()?;

        // The merge is pure; it runs on owned clones, outside the store lock.
        let local = self.store.lock().snapshot().clone();
        let outcome = merge(&local, remote_snapshot);

        let needs_save = outcome.needs_local_save;
        let mut merged = outcome.snapshot;
        let mut pushed = false;
        if outcome.needs_upload {
            merged = self.push_remote(merged)?;
            pushed = true;
        }

        // An edit landing between the clone above and this store swap is
        // overwritten by the merged snapshot. Read models and editors are
        // expected to touch the store only between cycles.
        let mut store = self.store.lock();
        if needs_save {
            store.set_and_save(merged).map_err(SyncError::LocalSave)?;
        } else if pushed {
            store.set_snapshot(merged);
        }

        let snapshot = store.snapshot();
        Ok(SyncReport {
            revision: snapshot.revision,
            tasks: snapshot.task_count(),
            tags: snapshot.tag_count(),
            pushed,
            saved: needs_save,
        })
    }

    /// Pulls and decodes the remote snapshot.
    ///
    /// A missing authentication state is a hard failure. An unreachable
    /// remote or an unparseable payload degrades to `None`, which the merge
    /// treats as "no remote"; the offending payload is retained on disk in
    /// debug builds for diagnosis.
    fn pull_remote(&self) -> SyncResult<Option<Snapshot>> {
        if !self.remote.is_authenticated() {
            return Err(SyncError::NotAuthenticated);
        }

        let blob = match self.remote.pull() {
            Ok(blob) => blob,
            Err(err) => {
                warn!(error = %error_chain(&err), "remote pull failed, merging without remote");
                return Ok(None);
            }
        };

        match Snapshot::from_json(&blob) {
            Ok(mut snapshot) => {
                // Client-side sync state has no business on the server;
                // scrub it in case it leaked into a stored blob.
                snapshot.clear_sync_bits();
                Ok(Some(snapshot))
            }
            Err(err) => {
                error!(error = %error_chain(&err), "pulled payload failed to parse, merging without remote");
                retain_payload_for_diagnosis(&blob);
                Ok(None)
            }
        }
    }

    /// Finalizes and uploads a merged snapshot: clears client sync state,
    /// advances the global revision, and pushes. Returns the finalized
    /// snapshot, which becomes the next working copy.
    fn push_remote(&self, mut snapshot: Snapshot) -> SyncResult<Snapshot> {
        snapshot.clear_sync_bits();
        snapshot.revision += 1;

        let blob = snapshot.to_json().map_err(SyncError::Encode)?;
        self.remote.push(&blob).map_err(SyncError::RemotePush)?;
        info!(
            revision = snapshot.revision,
            bytes = blob.len(),
            "pushed merged snapshot to remote"
        );
        Ok(snapshot)
    }

    // --- authentication ---------------------------------------------------

    /// Attempts a login through the remote provider. At most one attempt
    /// runs at a time; a concurrent caller is rejected.
    pub fn login(&self, username: &str, password: &str) -> SyncResult<bool> {
        if self
            .login_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("login already in progress, rejecting duplicate request");
            return Err(SyncError::LoginInProgress);
        }

        let ok = self.remote.login(username, password);
        self.login_in_flight.store(false, Ordering::SeqCst);
        Ok(ok)
    }

    /// Discards the remote provider's credentials.
    pub fn logout(&self) {
        self.remote.logout();
    }

    /// Returns the remote provider's authentication state.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.remote.is_authenticated()
    }

    // --- local edits ------------------------------------------------------

    /// Adds a task and schedules a debounced save.
    pub fn add_task(&self, task: Task) -> Result<(), StoreError> {
        self.store_loaded()?.add_task(task)?;
        self.saver.schedule();
        Ok(())
    }

    /// Updates a task and schedules a debounced save. Returns false if no
    /// task with that uuid exists.
    pub fn update_task(&self, task: Task) -> Result<bool, StoreError> {
        let updated = self.store_loaded()?.update_task(task);
        if updated {
            self.saver.schedule();
        }
        Ok(updated)
    }

    /// Removes a task, recording its tombstone. Returns false if absent.
    pub fn remove_task(&self, uuid: &str) -> Result<bool, StoreError> {
        let removed = self.store_loaded()?.remove_task(uuid);
        if removed {
            self.saver.schedule();
        }
        Ok(removed)
    }

    /// Adds a tag and schedules a debounced save.
    pub fn add_tag(&self, name: impl Into<String>) -> Result<(), StoreError> {
        self.store_loaded()?.add_tag(name);
        self.saver.schedule();
        Ok(())
    }

    /// Removes a tag, recording its tombstone. Returns false if absent.
    pub fn remove_tag(&self, name: &str) -> Result<bool, StoreError> {
        let removed = self.store_loaded()?.remove_tag(name);
        if removed {
            self.saver.schedule();
        }
        Ok(removed)
    }

    /// A copy of the current working snapshot, loading it from disk first
    /// if needed. Read models observe the snapshot between cycles, never
    /// concurrently with a merge.
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.store_loaded()?.snapshot().clone())
    }

    /// Locks the store, loading the working snapshot from disk if this is
    /// the first access. Edits must never run against an unloaded store or
    /// the next save would clobber existing data.
    fn store_loaded(&self) -> Result<parking_lot::MutexGuard<'_, LocalStore>, StoreError> {
        let mut store = self.store.lock();
        if !store.is_loaded() {
            store.load()?;
        }
        Ok(store)
    }
}

#[cfg(debug_assertions)]
fn retain_payload_for_diagnosis(blob: &str) {
    let path = std::env::temp_dir().join("ticksync_bad_payload.json");
    match std::fs::write(&path, blob) {
        Ok(()) => info!(path = %path.display(), "retained unparseable payload"),
        Err(err) => warn!(error = %err, "could not retain unparseable payload"),
    }
}

#[cfg(not(debug_assertions))]
fn retain_payload_for_diagnosis(_blob: &str) {}
