//! Synchronization engine for ticksync.
//!
//! This crate layers orchestration on top of [`ticksync_core`]'s pure data
//! model and merge:
//!
//! - [`LocalStore`] owns the working snapshot and its JSON data file, and
//!   applies local edits (timestamps, dirty flags, tombstones).
//! - [`RemoteProvider`] abstracts the remote end as an opaque blob store;
//!   [`FileRemote`] backs it with a file, [`MockRemote`] scripts it for
//!   tests.
//! - [`SyncOrchestrator`] drives complete pull, merge, push, save cycles
//!   under a single-flight guard and notifies listeners on completion.
//! - [`DebouncedSaver`] coalesces bursts of local edits into one disk write.
//!
//! Errors carry their causal chain via `std::error::Error::source`;
//! [`error_chain`] renders the chain newest-first for logs and user-facing
//! messages.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod orchestrator;
mod remote;
mod saver;
mod store;

pub use config::SyncConfig;
pub use error::{error_chain, RemoteError, StoreError, SyncError, SyncResult};
pub use orchestrator::{SyncListener, SyncOrchestrator, SyncOutcome, SyncReport};
pub use remote::{FileRemote, MockRemote, RemoteProvider, RemoteResult};
pub use saver::DebouncedSaver;
pub use store::LocalStore;
