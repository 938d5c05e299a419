//! Tags command implementation.

use std::path::Path;
use ticksync_engine::LocalStore;

/// Runs the tags command.
pub fn run(path: &Path, unused_only: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = LocalStore::new(path);
    store.load()?;
    let snapshot = store.snapshot();

    let tags = if unused_only {
        snapshot.unused_tags()
    } else {
        snapshot.tags.iter().collect()
    };

    if tags.is_empty() {
        println!("no tags");
        return Ok(());
    }

    for tag in tags {
        let count = snapshot.tasks_with_tag(&tag.name).len();
        let builtin = if tag.is_builtin() { " (builtin)" } else { "" };
        println!("{:<20} {count} task(s){builtin}", tag.name);
    }
    Ok(())
}
