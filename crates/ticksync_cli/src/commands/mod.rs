//! CLI command implementations.

pub mod add;
pub mod done;
pub mod inspect;
pub mod list;
pub mod remove;
pub mod sync;
pub mod tags;

use ticksync_core::Snapshot;

/// Resolves a uuid prefix to the single matching task uuid.
///
/// Errors if no task matches or if the prefix is ambiguous.
pub fn resolve_uuid_prefix(
    snapshot: &Snapshot,
    prefix: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    if prefix.is_empty() {
        return Err("empty uuid prefix".into());
    }

    let matches: Vec<&str> = snapshot
        .tasks
        .iter()
        .filter(|t| t.uuid.starts_with(prefix))
        .map(|t| t.uuid.as_str())
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no task matches uuid prefix {prefix:?}").into()),
        [uuid] => Ok((*uuid).to_string()),
        _ => Err(format!(
            "uuid prefix {prefix:?} is ambiguous ({} matches)",
            matches.len()
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticksync_core::Task;

    fn snapshot_with(uuids: &[&str]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for uuid in uuids {
            let mut task = Task::new("t");
            task.uuid = (*uuid).to_string();
            snapshot.add_task(task);
        }
        snapshot
    }

    #[test]
    fn unique_prefix_resolves() {
        let snapshot = snapshot_with(&["abc-1", "def-2"]);
        assert_eq!(resolve_uuid_prefix(&snapshot, "ab").unwrap(), "abc-1");
    }

    #[test]
    fn ambiguous_prefix_is_an_error() {
        let snapshot = snapshot_with(&["abc-1", "abd-2"]);
        assert!(resolve_uuid_prefix(&snapshot, "ab").is_err());
        assert!(resolve_uuid_prefix(&snapshot, "abc").is_ok());
    }

    #[test]
    fn unknown_prefix_is_an_error() {
        let snapshot = snapshot_with(&["abc-1"]);
        assert!(resolve_uuid_prefix(&snapshot, "zz").is_err());
        assert!(resolve_uuid_prefix(&snapshot, "").is_err());
    }
}
