//! Error types for the sync engine.
//!
//! Errors wrap their causes via `#[source]`, so a failure deep in a store or
//! provider surfaces as an ordered causal chain. [`error_chain`] renders that
//! chain newest-first, one cause per line.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use ticksync_core::SnapshotError;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors from the local snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The data file could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        /// Path of the data file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The data file could not be written.
    #[error("failed to write {}", path.display())]
    Write {
        /// Path of the data file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The data file held an unparseable snapshot.
    #[error("invalid snapshot in {}", path.display())]
    Decode {
        /// Path of the data file.
        path: PathBuf,
        /// Underlying codec failure.
        #[source]
        source: SnapshotError,
    },

    /// The snapshot could not be encoded for writing.
    #[error("failed to encode snapshot")]
    Encode(#[source] SnapshotError),

    /// A task was rejected by an edit operation.
    #[error("invalid task: {reason}")]
    InvalidTask {
        /// Why the task was rejected.
        reason: String,
    },
}

/// Errors from a remote provider.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote could not be reached; pull degrades to a local-only merge.
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    /// The remote refused the request.
    #[error("remote rejected request: {0}")]
    Rejected(String),

    /// I/O failure on a file-backed remote.
    #[error("remote file error on {}", path.display())]
    Io {
        /// Path of the remote blob file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Errors that can occur while driving a sync cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A sync cycle is already running; callers retry later, nothing queues.
    #[error("sync already in progress")]
    AlreadyInProgress,

    /// A login attempt is already running.
    #[error("login already in progress")]
    LoginInProgress,

    /// The remote provider requires authentication and has none.
    #[error("remote provider is not authenticated")]
    NotAuthenticated,

    /// The local snapshot could not be loaded.
    #[error("failed to load local snapshot")]
    LocalLoad(#[source] StoreError),

    /// The merged snapshot could not be persisted.
    #[error("failed to save local snapshot")]
    LocalSave(#[source] StoreError),

    /// The merged snapshot could not be serialized for upload.
    #[error("failed to encode snapshot for upload")]
    Encode(#[source] SnapshotError),

    /// The merged snapshot could not be pushed to the remote.
    #[error("failed to push snapshot to remote")]
    RemotePush(#[source] RemoteError),
}

/// Renders an error and its causes newest-first, one per line.
///
/// The first line is the surfaced error; each following line is indented and
/// prefixed with `caused by:`, walking [`Error::source`] to the root cause.
#[must_use]
pub fn error_chain(err: &dyn Error) -> String {
    let mut out = err.to_string();
    let mut cause = err.source();
    while let Some(err) = cause {
        out.push_str("\n  caused by: ");
        out.push_str(&err.to_string());
        cause = err.source();
    }
    out
}
