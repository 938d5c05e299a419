//! The snapshot merge algorithm.
//!
//! [`merge`] reconciles a locally-dirty snapshot against the snapshot pulled
//! from the remote store. It is a pure computation over two owned values: no
//! I/O, no clocks, safe to run on any thread. The caller acts on the returned
//! flags (upload the result, persist the result) afterwards.
//!
//! ## Revision protocol
//!
//! The remote authority owns every revision number. Clients mark their edits
//! with dirty flags and `-1` revisions and let the merge fold them into the
//! pulled snapshot; per-item revisions advance by exactly one when a local
//! change is accepted. A local revision counter ahead of the remote's can
//! only come from corruption or a bug; the merge then prefers the remote
//! wholesale rather than risking an overwrite of remote history.

use crate::snapshot::Snapshot;
use crate::tag::Tag;
use crate::types::UNSYNCED_REVISION;
use tracing::{debug, error, info};

/// Result of one merge pass.
///
/// The flags are transient: they drive the current sync cycle and are never
/// persisted with the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The reconciled snapshot; becomes the next local working copy.
    pub snapshot: Snapshot,
    /// True if the result differs from what the remote holds.
    pub needs_upload: bool,
    /// True if the result differs from what is cached on disk.
    pub needs_local_save: bool,
}

impl MergeOutcome {
    fn settled(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            needs_upload: false,
            needs_local_save: false,
        }
    }
}

/// Merges the local snapshot with the remote one, if any.
///
/// `remote` is `None` when the remote store is unreachable or has never been
/// provisioned; the local snapshot then becomes authoritative. Otherwise the
/// remote snapshot is the working base and local changes are folded into it:
/// new items are inserted at revision `0`, dirty items fast-forward or go
/// through [`Task::merge_conflict`](crate::Task::merge_conflict) depending on
/// whether the remote moved, and tombstones remove their targets. The global
/// revision counter is never advanced here; the upload path does that.
#[must_use]
pub fn merge(local: &Snapshot, remote: Option<Snapshot>) -> MergeOutcome {
    info!(
        local_revision = local.revision,
        local_tasks = local.task_count(),
        local_dirty = local.dirty_tasks().len(),
        local_deleted = local.deleted_task_uuids.len(),
        has_remote = remote.is_some(),
        "merging snapshots"
    );

    let Some(remote) = remote else {
        // 1. No remote side: the local snapshot becomes authoritative and
        // seeds the remote on the next upload.
        let mut seeded = local.clone();
        seeded.revision = 0;
        seeded.clear_sync_bits();
        info!("no remote snapshot, local data becomes authoritative");
        return MergeOutcome {
            snapshot: seeded,
            needs_upload: true,
            needs_local_save: true,
        };
    };

    if local.revision == UNSYNCED_REVISION && local.is_empty() {
        // 2. Pristine client: adopt the remote verbatim and cache it.
        info!(remote_revision = remote.revision, "local snapshot pristine, adopting remote");
        return MergeOutcome {
            snapshot: remote,
            needs_upload: false,
            needs_local_save: true,
        };
    }

    if local.revision > remote.revision {
        // 3. Clients never advance the global counter, so a local counter
        // ahead of the remote means corruption. Prefer the remote rather
        // than letting the bad counter overwrite remote history.
        error!(
            local_revision = local.revision,
            remote_revision = remote.revision,
            "local revision ahead of remote; preferring remote snapshot"
        );
        return MergeOutcome {
            snapshot: remote,
            needs_upload: false,
            needs_local_save: true,
        };
    }

    let mut outcome = MergeOutcome::settled(remote);

    if local.revision < outcome.snapshot.revision {
        // 4. Remote moved on; cache the newer state once reconciled.
        info!(
            local_revision = local.revision,
            remote_revision = outcome.snapshot.revision,
            "local snapshot behind remote"
        );
        outcome.needs_local_save = true;
    }

    merge_new_tags(local, &mut outcome);
    merge_new_tasks(local, &mut outcome);
    merge_dirty_tasks(local, &mut outcome);
    apply_tombstones(local, &mut outcome);

    debug!(
        revision = outcome.snapshot.revision,
        tasks = outcome.snapshot.task_count(),
        needs_upload = outcome.needs_upload,
        needs_local_save = outcome.needs_local_save,
        "merge complete"
    );
    outcome
}

/// 5. Inserts local tags the server has never seen, at revision 0.
fn merge_new_tags(local: &Snapshot, outcome: &mut MergeOutcome) {
    for new_tag in local.new_tags() {
        if outcome.snapshot.contains_tag(&new_tag.name) {
            continue;
        }
        let mut tag = Tag::new(new_tag.name.clone());
        tag.meta.revision = 0;
        tag.meta.dirty = false;
        debug!(name = %tag.name, "adding new local tag");
        outcome.snapshot.add_tag(tag);
        outcome.needs_upload = true;
        outcome.needs_local_save = true;
    }
}

/// 6. Inserts local tasks the server has never seen, at revision 0.
fn merge_new_tasks(local: &Snapshot, outcome: &mut MergeOutcome) {
    for new_task in local.new_tasks() {
        if outcome.snapshot.task(&new_task.uuid).is_some() {
            continue;
        }
        let mut task = new_task.clone();
        task.meta.revision = 0;
        task.meta.dirty = false;
        debug!(uuid = %task.uuid, title = %task.title, "adding new local task");
        outcome.snapshot.add_task(task);
        outcome.needs_upload = true;
        outcome.needs_local_save = true;
    }
}

/// 7. Folds locally modified tasks into the working snapshot.
fn merge_dirty_tasks(local: &Snapshot, outcome: &mut MergeOutcome) {
    for local_task in local.dirty_tasks() {
        if local_task.meta.is_unsynced() {
            // Brand-new tasks were handled above.
            continue;
        }

        let mut local_task = local_task.clone();
        local_task.meta.dirty = false;

        let Some(current) = outcome.snapshot.task(&local_task.uuid) else {
            // Deleted by another replica; the local edit is dropped.
            info!(uuid = %local_task.uuid, "dirty task no longer exists remotely, dropping local change");
            continue;
        };

        if current.meta.revision == local_task.meta.revision {
            // Fast-forward: only this client touched the task.
            debug!(uuid = %local_task.uuid, "fast-forwarding locally modified task");
            outcome.snapshot.update_task(local_task, true);
            outcome.needs_upload = true;
            outcome.needs_local_save = true;
        } else if current.meta.revision > local_task.meta.revision {
            // True conflict: both sides changed since the common revision.
            debug!(
                uuid = %local_task.uuid,
                remote_revision = current.meta.revision,
                local_revision = local_task.meta.revision,
                "resolving conflicting task edit"
            );
            let merged = current.merge_conflict(&local_task);
            outcome.snapshot.update_task(merged, true);
            outcome.needs_upload = true;
            outcome.needs_local_save = true;
        } else {
            // Item-level revision inversion; same policy as the snapshot
            // level: keep the remote value, never regress its revision.
            error!(
                uuid = %local_task.uuid,
                local_revision = local_task.meta.revision,
                remote_revision = current.meta.revision,
                "task revision ahead of remote; ignoring local change"
            );
        }
    }
}

/// 8. Applies the local tombstone lists to the working snapshot.
fn apply_tombstones(local: &Snapshot, outcome: &mut MergeOutcome) {
    for uuid in &local.deleted_task_uuids {
        if outcome.snapshot.remove_task(uuid) {
            debug!(%uuid, "removing deleted task");
            outcome.needs_upload = true;
            outcome.needs_local_save = true;
        }
    }
    for name in &local.deleted_tag_names {
        if outcome.snapshot.remove_tag(name) {
            debug!(%name, "removing deleted tag");
            outcome.needs_upload = true;
            outcome.needs_local_save = true;
        }
    }
}
