//! Remove command implementation.

use super::resolve_uuid_prefix;
use std::path::Path;
use ticksync_engine::LocalStore;

/// Runs the remove command.
pub fn run(path: &Path, prefix: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = LocalStore::new(path);
    store.load()?;

    let uuid = resolve_uuid_prefix(store.snapshot(), prefix)?;
    store.remove_task(&uuid);
    store.save()?;

    println!("removed {uuid}");
    Ok(())
}
