//! List command implementation.

use std::path::Path;
use ticksync_core::Task;
use ticksync_engine::LocalStore;

/// Runs the list command.
pub fn run(
    path: &Path,
    all: bool,
    done_only: bool,
    tag: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = LocalStore::new(path);
    store.load()?;
    let snapshot = store.snapshot();

    let mut tasks: Vec<&Task> = snapshot
        .tasks
        .iter()
        .filter(|t| all || t.done == done_only)
        .filter(|t| tag.is_none_or(|name| t.contains_tag(name)))
        .collect();

    if tasks.is_empty() {
        println!("no tasks");
        return Ok(());
    }

    // Important tasks first, then newest first.
    tasks.sort_by(|a, b| {
        b.important
            .cmp(&a.important)
            .then(b.creation.cmp(&a.creation))
    });

    for task in tasks {
        println!("{}", format_line(task));
    }
    Ok(())
}

fn format_line(task: &Task) -> String {
    let mark = if task.done { "x" } else { " " };
    let bang = if task.important { "!" } else { " " };
    let short_uuid: String = task.uuid.chars().take(8).collect();

    let mut line = format!("[{mark}]{bang} {short_uuid}  {}", task.title);
    if !task.tags.is_empty() {
        line.push_str(&format!("  #{}", task.tags.join(" #")));
    }
    if let Some(due) = task.due {
        line.push_str(&format!("  due {due}"));
    }
    line
}
