//! Done command implementation.

use super::resolve_uuid_prefix;
use std::path::Path;
use ticksync_core::Timestamp;
use ticksync_engine::LocalStore;

/// Runs the done command. With `undo` the task is marked pending again.
pub fn run(path: &Path, prefix: &str, undo: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = LocalStore::new(path);
    store.load()?;

    let uuid = resolve_uuid_prefix(store.snapshot(), prefix)?;
    let mut task = store
        .snapshot()
        .task(&uuid)
        .cloned()
        .ok_or("task disappeared while resolving")?;

    task.done = !undo;
    task.completed = if undo { None } else { Some(Timestamp::now()) };
    store.update_task(task);
    store.save()?;

    if undo {
        println!("reopened {uuid}");
    } else {
        println!("completed {uuid}");
    }
    Ok(())
}
