//! Inspect command implementation.

use serde::Serialize;
use std::path::Path;
use ticksync_engine::LocalStore;

/// Data file inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data file path.
    pub path: String,
    /// Global revision; -1 means never synced.
    pub revision: i64,
    /// Total number of tasks.
    pub tasks: usize,
    /// Tasks not yet done.
    pub pending: usize,
    /// Tasks done.
    pub completed: usize,
    /// Total number of tags.
    pub tags: usize,
    /// Tasks created locally and never uploaded.
    pub new_tasks: usize,
    /// Tasks modified locally since the last sync.
    pub dirty_tasks: usize,
    /// Task deletions awaiting the next sync.
    pub deleted_task_tombstones: usize,
    /// Tag deletions awaiting the next sync.
    pub deleted_tag_tombstones: usize,
}

/// Runs the inspect command.
pub fn run(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = LocalStore::new(path);
    store.load()?;
    let snapshot = store.snapshot();

    let result = InspectResult {
        path: path.display().to_string(),
        revision: snapshot.revision,
        tasks: snapshot.task_count(),
        pending: snapshot.pending_tasks().len(),
        completed: snapshot.completed_tasks().len(),
        tags: snapshot.tag_count(),
        new_tasks: snapshot.new_tasks().len(),
        dirty_tasks: snapshot.dirty_tasks().len(),
        deleted_task_tombstones: snapshot.deleted_task_uuids.len(),
        deleted_tag_tombstones: snapshot.deleted_tag_names.len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Data file: {}", result.path);
        println!("Revision:  {}", result.revision);
        println!(
            "Tasks:     {} ({} pending, {} completed)",
            result.tasks, result.pending, result.completed
        );
        println!("Tags:      {}", result.tags);
        println!(
            "Unsynced:  {} new, {} dirty, {} task / {} tag tombstone(s)",
            result.new_tasks,
            result.dirty_tasks,
            result.deleted_task_tombstones,
            result.deleted_tag_tombstones
        );
    }
    Ok(())
}
