//! Remote provider abstraction and its closed set of implementations.

use crate::error::RemoteError;
use parking_lot::Mutex;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// A remote canonical store for snapshot blobs.
///
/// The transport behind `pull`/`push` (HTTP, CalDAV, a file for tests) is an
/// external concern; the engine only needs these capabilities plus an
/// authenticated/unauthenticated state. Implementations must be shareable
/// across threads, as the orchestrator may drive them from a background
/// thread.
pub trait RemoteProvider: Send + Sync {
    /// Returns true if the provider holds valid credentials.
    fn is_authenticated(&self) -> bool;

    /// Attempts to authenticate. Returns true on success.
    fn login(&self, username: &str, password: &str) -> bool;

    /// Discards any held credentials.
    fn logout(&self);

    /// Pulls the current remote snapshot as an opaque serialized blob.
    fn pull(&self) -> RemoteResult<String>;

    /// Pushes a serialized snapshot blob, replacing the remote state.
    fn push(&self, blob: &str) -> RemoteResult<()>;
}

/// A remote backed by a single local file holding the snapshot blob.
///
/// Stands in for the production transport during tests and for
/// file-to-file sync from the CLI.
pub struct FileRemote {
    path: PathBuf,
    authenticated: AtomicBool,
}

impl FileRemote {
    /// Creates a file remote over the given blob path. Starts authenticated;
    /// a file needs no credentials.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            authenticated: AtomicBool::new(true),
        }
    }

    /// Returns the blob path.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl RemoteProvider for FileRemote {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn login(&self, _username: &str, _password: &str) -> bool {
        self.authenticated.store(true, Ordering::SeqCst);
        true
    }

    fn logout(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }

    fn pull(&self) -> RemoteResult<String> {
        fs::read_to_string(&self.path).map_err(|source| RemoteError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn push(&self, blob: &str) -> RemoteResult<()> {
        debug!(path = %self.path.display(), bytes = blob.len(), "pushing blob to file remote");
        fs::write(&self.path, blob).map_err(|source| RemoteError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// An in-memory remote with scripted behavior, for tests.
///
/// By default it acts as an authenticated remote holding no blob (pull
/// fails as unreachable until a blob is set or pushed).
#[derive(Default)]
pub struct MockRemote {
    authenticated: AtomicBool,
    reachable: AtomicBool,
    blob: Mutex<Option<String>>,
    push_count: Mutex<u64>,
    reject_push: AtomicBool,
}

impl MockRemote {
    /// Creates an authenticated, reachable mock with no stored blob.
    #[must_use]
    pub fn new() -> Self {
        Self {
            authenticated: AtomicBool::new(true),
            reachable: AtomicBool::new(true),
            blob: Mutex::new(None),
            push_count: Mutex::new(0),
            reject_push: AtomicBool::new(false),
        }
    }

    /// Sets the blob the next pull returns.
    pub fn set_blob(&self, blob: impl Into<String>) {
        *self.blob.lock() = Some(blob.into());
    }

    /// Returns the blob last pushed, if any.
    #[must_use]
    pub fn blob(&self) -> Option<String> {
        self.blob.lock().clone()
    }

    /// Makes subsequent pulls and pushes fail as unreachable.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Controls the authenticated state.
    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }

    /// Makes subsequent pushes fail with a rejection.
    pub fn set_reject_push(&self, reject: bool) {
        self.reject_push.store(reject, Ordering::SeqCst);
    }

    /// Number of pushes accepted so far.
    #[must_use]
    pub fn push_count(&self) -> u64 {
        *self.push_count.lock()
    }
}

impl RemoteProvider for MockRemote {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn login(&self, _username: &str, password: &str) -> bool {
        let ok = password != "wrong";
        self.authenticated.store(ok, Ordering::SeqCst);
        ok
    }

    fn logout(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }

    fn pull(&self) -> RemoteResult<String> {
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(RemoteError::Unreachable("mock remote offline".into()));
        }
        self.blob
            .lock()
            .clone()
            .ok_or_else(|| RemoteError::Unreachable("mock remote holds no snapshot".into()))
    }

    fn push(&self, blob: &str) -> RemoteResult<()> {
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(RemoteError::Unreachable("mock remote offline".into()));
        }
        if self.reject_push.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected("push disabled by test".into()));
        }
        *self.blob.lock() = Some(blob.to_string());
        *self.push_count.lock() += 1;
        Ok(())
    }
}
