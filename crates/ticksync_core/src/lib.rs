//! # ticksync core
//!
//! Revision-tracked data model and merge algorithm for a personal task/tag
//! list kept consistent between a local copy and a single remote store.
//!
//! This crate provides:
//! - [`Task`] and [`Tag`] value types with per-item sync metadata
//! - [`Snapshot`], the full dataset plus global revision and tombstone lists
//! - [`Task::merge_conflict`], the field-level conflict rule
//! - [`merge`], the pure snapshot reconciliation algorithm
//!
//! ## Key invariants
//!
//! - The remote authority owns all revision numbers; clients never invent them
//! - A revision of `-1` means "exists only on this client"
//! - The merge is a pure function of its inputs and performs no I/O
//! - Conflict resolution is deterministic

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod merge;
mod snapshot;
mod tag;
mod task;
mod types;

pub use error::SnapshotError;
pub use merge::{merge, MergeOutcome};
pub use snapshot::Snapshot;
pub use tag::{apply_builtin_precedence, Tag, BUILTIN_TAGS, TAG_CURRENT, TAG_EVENING, TAG_SOON};
pub use task::Task;
pub use types::{SyncMeta, Timestamp, UNSYNCED_REVISION};
