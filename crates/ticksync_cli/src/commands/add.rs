//! Add command implementation.

use std::path::Path;
use ticksync_core::{apply_builtin_precedence, Task, Timestamp};
use ticksync_engine::LocalStore;

/// Runs the add command.
pub fn run(
    path: &Path,
    title: &str,
    tags: Vec<String>,
    important: bool,
    due: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    if title.trim().is_empty() {
        return Err("task title must not be empty".into());
    }

    let mut task = Task::new(title);
    task.important = important;
    task.due = due.map(Timestamp::from_millis);
    for tag in tags {
        task.add_tag(tag);
    }
    apply_builtin_precedence(&mut task.tags);

    let mut store = LocalStore::new(path);
    store.load()?;
    for tag in task.tags.clone() {
        store.add_tag(tag);
    }
    let uuid = task.uuid.clone();
    store.add_task(task)?;
    store.save()?;

    println!("added {uuid}");
    Ok(())
}
