//! End-to-end sync cycles: multiple devices converging through one remote.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use ticksync_core::{Snapshot, Task};
use ticksync_engine::{FileRemote, SyncConfig, SyncOrchestrator};

/// A simulated device: its own data file, sharing the remote blob path.
fn device(dir: &tempfile::TempDir, name: &str, remote_path: &Path) -> SyncOrchestrator {
    let config = SyncConfig::new(dir.path().join(format!("{name}.json")))
        .with_save_debounce(Duration::from_millis(10));
    SyncOrchestrator::new(config, Arc::new(FileRemote::new(remote_path)))
}

fn task_by_title(orchestrator: &SyncOrchestrator, title: &str) -> Task {
    orchestrator
        .snapshot()
        .unwrap()
        .tasks
        .iter()
        .find(|t| t.title == title)
        .cloned()
        .unwrap_or_else(|| panic!("no task titled {title:?}"))
}

fn sorted_tasks(orchestrator: &SyncOrchestrator) -> Vec<Task> {
    let mut tasks = orchestrator.snapshot().unwrap().tasks;
    tasks.sort_by(|a, b| a.uuid.cmp(&b.uuid));
    tasks
}

#[test]
fn first_device_seeds_the_remote() {
    let dir = tempfile::tempdir().unwrap();
    let remote_path = dir.path().join("remote.json");
    let a = device(&dir, "a", &remote_path);

    a.add_task(Task::new("buy milk")).unwrap();
    a.add_task(Task::new("file taxes")).unwrap();
    a.add_tag("errands").unwrap();

    let report = a.sync_once().unwrap();
    assert!(report.pushed);
    assert!(report.saved);
    assert_eq!(report.revision, 1);
    assert_eq!(report.tasks, 2);
    assert_eq!(report.tags, 1);

    // The pushed blob is a finalized snapshot: revision assigned, every
    // item clean at revision 0, no tombstones.
    let blob = fs::read_to_string(&remote_path).unwrap();
    let remote = Snapshot::from_json(&blob).unwrap();
    assert_eq!(remote.revision, 1);
    assert!(remote.tasks.iter().all(|t| t.meta.revision == 0 && !t.meta.dirty));
    assert!(remote.deleted_task_uuids.is_empty());
}

#[test]
fn second_device_adopts_the_remote() {
    let dir = tempfile::tempdir().unwrap();
    let remote_path = dir.path().join("remote.json");

    let a = device(&dir, "a", &remote_path);
    a.add_task(Task::new("buy milk")).unwrap();
    a.sync_once().unwrap();

    let b = device(&dir, "b", &remote_path);
    let report = b.sync_once().unwrap();
    assert!(!report.pushed);
    assert!(report.saved);
    assert_eq!(report.revision, 1);
    assert_eq!(task_by_title(&b, "buy milk").meta.revision, 0);

    // The adopted snapshot survives a restart of device b.
    let b2 = device(&dir, "b", &remote_path);
    assert_eq!(b2.snapshot().unwrap().revision, 1);
}

#[test]
fn two_devices_converge_after_cross_edits() {
    let dir = tempfile::tempdir().unwrap();
    let remote_path = dir.path().join("remote.json");
    let a = device(&dir, "a", &remote_path);
    let b = device(&dir, "b", &remote_path);

    a.add_task(Task::new("alpha")).unwrap();
    a.sync_once().unwrap();
    b.sync_once().unwrap();

    // Device b completes the task; its copy fast-forwards on sync.
    let mut alpha = task_by_title(&b, "alpha");
    alpha.done = true;
    assert!(b.update_task(alpha).unwrap());
    let report = b.sync_once().unwrap();
    assert!(report.pushed);
    assert_eq!(report.revision, 2);
    assert_eq!(task_by_title(&b, "alpha").meta.revision, 1);

    // Device a adds a second task, then picks up b's completion.
    a.add_task(Task::new("beta")).unwrap();
    let report = a.sync_once().unwrap();
    assert!(report.pushed);
    assert_eq!(report.revision, 3);
    assert!(task_by_title(&a, "alpha").done);

    // One more pull on b and both replicas hold identical data.
    b.sync_once().unwrap();
    assert_eq!(sorted_tasks(&a), sorted_tasks(&b));
    assert_eq!(a.snapshot().unwrap().revision, b.snapshot().unwrap().revision);
}

#[test]
fn concurrent_edits_merge_field_by_field() {
    let dir = tempfile::tempdir().unwrap();
    let remote_path = dir.path().join("remote.json");
    let a = device(&dir, "a", &remote_path);
    let b = device(&dir, "b", &remote_path);

    a.add_task(Task::new("report")).unwrap();
    a.sync_once().unwrap();
    b.sync_once().unwrap();

    // Device a completes the task and syncs first.
    let mut on_a = task_by_title(&a, "report");
    on_a.done = true;
    a.update_task(on_a).unwrap();
    a.sync_once().unwrap();

    // Device b flagged it important in the meantime; its sync now hits a
    // genuine conflict against a's already-uploaded edit.
    let mut on_b = task_by_title(&b, "report");
    on_b.important = true;
    b.update_task(on_b).unwrap();
    let report = b.sync_once().unwrap();
    assert!(report.pushed);
    assert_eq!(report.revision, 3);

    // Importance is sticky under conflict; completion needs both sides.
    let merged = task_by_title(&b, "report");
    assert!(merged.important);
    assert!(!merged.done);
    assert_eq!(merged.meta.revision, 2);

    a.sync_once().unwrap();
    assert_eq!(sorted_tasks(&a), sorted_tasks(&b));
}

#[test]
fn deletions_propagate_to_other_devices() {
    let dir = tempfile::tempdir().unwrap();
    let remote_path = dir.path().join("remote.json");
    let a = device(&dir, "a", &remote_path);
    let b = device(&dir, "b", &remote_path);

    a.add_task(Task::new("obsolete")).unwrap();
    a.add_tag("old-project").unwrap();
    a.sync_once().unwrap();
    b.sync_once().unwrap();
    let uuid = task_by_title(&b, "obsolete").uuid;

    assert!(a.remove_task(&uuid).unwrap());
    assert!(a.remove_tag("old-project").unwrap());
    let report = a.sync_once().unwrap();
    assert!(report.pushed);
    assert_eq!(report.tasks, 0);

    // Tombstones are consumed by the merge and never reach the remote.
    let blob = fs::read_to_string(&remote_path).unwrap();
    let remote = Snapshot::from_json(&blob).unwrap();
    assert!(remote.deleted_task_uuids.is_empty());
    assert!(remote.deleted_tag_names.is_empty());

    let report = b.sync_once().unwrap();
    assert!(!report.pushed);
    assert_eq!(report.tasks, 0);
    assert_eq!(report.tags, 0);
}

#[test]
fn offline_edits_survive_until_the_remote_returns() {
    let dir = tempfile::tempdir().unwrap();
    let remote_path = dir.path().join("remote.json");
    let a = device(&dir, "a", &remote_path);

    // No remote blob exists yet and edits pile up locally.
    a.add_task(Task::new("written offline")).unwrap();
    let report = a.sync_once().unwrap();
    assert!(report.pushed);

    // A fresh device starting later sees everything.
    let b = device(&dir, "b", &remote_path);
    b.sync_once().unwrap();
    assert_eq!(task_by_title(&b, "written offline").title, "written offline");
}
