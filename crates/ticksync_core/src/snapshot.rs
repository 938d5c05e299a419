//! The snapshot aggregate: the full task/tag dataset owned by one replica.

use crate::error::SnapshotError;
use crate::tag::Tag;
use crate::task::Task;
use crate::types::UNSYNCED_REVISION;
use serde::{Deserialize, Serialize};

/// The complete dataset of one replica at a point in time.
///
/// A snapshot carries the tasks and tags, the single global revision counter
/// assigned by the remote authority (`-1` while uninitialized), and the
/// local-origin tombstone logs. Tombstones are consumed once per merge and
/// cleared afterwards; they never travel to the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Global revision counter; `-1` means uninitialized/empty.
    #[serde(default = "default_revision")]
    pub revision: i64,
    /// All tasks, unique by uuid.
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// All tags, unique by name.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Uuids of tasks deleted locally since the last merge.
    #[serde(rename = "deletedTaskUuids", default)]
    pub deleted_task_uuids: Vec<String>,
    /// Names of tags deleted locally since the last merge.
    #[serde(rename = "deletedTagNames", default)]
    pub deleted_tag_names: Vec<String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            revision: UNSYNCED_REVISION,
            tasks: Vec::new(),
            tags: Vec::new(),
            deleted_task_uuids: Vec::new(),
            deleted_tag_names: Vec::new(),
        }
    }
}

fn default_revision() -> i64 {
    UNSYNCED_REVISION
}

impl Snapshot {
    /// Creates an empty, uninitialized snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- tasks -----------------------------------------------------------

    /// Adds a task. Adding a uuid that already exists is a no-op.
    pub fn add_task(&mut self, task: Task) {
        if self.task(&task.uuid).is_none() {
            self.tasks.push(task);
        }
    }

    /// Removes the task with the given uuid. Returns false if absent.
    pub fn remove_task(&mut self, uuid: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.uuid != uuid);
        self.tasks.len() != before
    }

    /// Looks up a task by uuid.
    #[must_use]
    pub fn task(&self, uuid: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.uuid == uuid)
    }

    /// Looks up a task by uuid, mutably.
    pub fn task_mut(&mut self, uuid: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.uuid == uuid)
    }

    /// Replaces an existing task with the same uuid, optionally bumping its
    /// per-item revision. Returns false if no such task exists.
    pub fn update_task(&mut self, task: Task, bump_revision: bool) -> bool {
        match self.task_mut(&task.uuid) {
            Some(slot) => {
                *slot = task;
                if bump_revision {
                    slot.meta.revision += 1;
                }
                true
            }
            None => false,
        }
    }

    /// Replaces an existing task without touching its revision.
    pub fn set_task(&mut self, task: Task) -> bool {
        self.update_task(task, false)
    }

    /// Number of tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Tasks the server has never seen (`revision == -1`).
    #[must_use]
    pub fn new_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.meta.is_unsynced()).collect()
    }

    /// Tasks changed locally since the last merge.
    #[must_use]
    pub fn dirty_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.meta.dirty).collect()
    }

    /// Tasks carrying the given tag name.
    #[must_use]
    pub fn tasks_with_tag(&self, name: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.contains_tag(name)).collect()
    }

    /// Tasks not yet done.
    #[must_use]
    pub fn pending_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !t.done).collect()
    }

    /// Tasks already done.
    #[must_use]
    pub fn completed_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.done).collect()
    }

    // --- tags ------------------------------------------------------------

    /// Adds a tag. Adding a name that already exists is a no-op.
    pub fn add_tag(&mut self, tag: Tag) {
        if !self.contains_tag(&tag.name) {
            self.tags.push(tag);
        }
    }

    /// Removes the tag with the given name. Returns false if absent.
    pub fn remove_tag(&mut self, name: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t.name != name);
        self.tags.len() != before
    }

    /// Looks up a tag by name.
    #[must_use]
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// Returns true if a tag with the given name exists.
    #[must_use]
    pub fn contains_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    /// Number of tags.
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Tags the server has never seen (`revision == -1`).
    #[must_use]
    pub fn new_tags(&self) -> Vec<&Tag> {
        self.tags.iter().filter(|t| t.meta.is_unsynced()).collect()
    }

    /// Tags referenced by at least one task.
    #[must_use]
    pub fn used_tags(&self) -> Vec<&Tag> {
        self.tags
            .iter()
            .filter(|tag| self.tasks.iter().any(|t| t.contains_tag(&tag.name)))
            .collect()
    }

    /// Tags referenced by no task.
    #[must_use]
    pub fn unused_tags(&self) -> Vec<&Tag> {
        self.tags
            .iter()
            .filter(|tag| !self.tasks.iter().any(|t| t.contains_tag(&tag.name)))
            .collect()
    }

    /// Drops every tag no task references.
    pub fn remove_unused_tags(&mut self) {
        let unused: Vec<String> = self.unused_tags().iter().map(|t| t.name.clone()).collect();
        for name in unused {
            self.remove_tag(&name);
        }
    }

    // --- tombstones ------------------------------------------------------

    /// Records a locally deleted task uuid for the next merge.
    pub fn record_deleted_task(&mut self, uuid: impl Into<String>) {
        self.deleted_task_uuids.push(uuid.into());
    }

    /// Records a locally deleted tag name for the next merge.
    pub fn record_deleted_tag(&mut self, name: impl Into<String>) {
        self.deleted_tag_names.push(name.into());
    }

    // --- lifecycle -------------------------------------------------------

    /// Clears all client-side sync state: promotes never-synced item
    /// revisions to `0`, drops every dirty flag, and empties both tombstone
    /// lists. Run before a snapshot is handed to the remote.
    pub fn clear_sync_bits(&mut self) {
        for task in &mut self.tasks {
            if task.meta.is_unsynced() {
                task.meta.revision = 0;
            }
            task.meta.dirty = false;
        }
        for tag in &mut self.tags {
            if tag.meta.is_unsynced() {
                tag.meta.revision = 0;
            }
            tag.meta.dirty = false;
        }
        self.deleted_task_uuids.clear();
        self.deleted_tag_names.clear();
    }

    /// Returns true if the snapshot holds no tasks and no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.tags.is_empty()
    }

    /// Returns true if the snapshot has been initialized: either it was
    /// assigned a revision or it holds data.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.revision != UNSYNCED_REVISION || !self.is_empty()
    }

    // --- codec -----------------------------------------------------------

    /// Serializes the snapshot to its JSON wire form.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Serialize)
    }

    /// Deserializes a snapshot from its JSON wire form. Missing fields
    /// default; unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(json).map_err(SnapshotError::Deserialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(uuid: &str) -> Task {
        Task {
            uuid: uuid.into(),
            title: format!("task {uuid}"),
            ..Task::default()
        }
    }

    #[test]
    fn empty_snapshot_is_uninitialized() {
        let snap = Snapshot::new();
        assert_eq!(snap.revision, UNSYNCED_REVISION);
        assert!(snap.is_empty());
        assert!(!snap.is_valid());
    }

    #[test]
    fn add_task_deduplicates_by_uuid() {
        let mut snap = Snapshot::new();
        snap.add_task(task("a"));
        snap.add_task(task("a"));
        assert_eq!(snap.task_count(), 1);
    }

    #[test]
    fn remove_task_reports_presence() {
        let mut snap = Snapshot::new();
        snap.add_task(task("a"));
        assert!(snap.remove_task("a"));
        assert!(!snap.remove_task("a"));
    }

    #[test]
    fn update_task_bumps_revision_when_asked() {
        let mut snap = Snapshot::new();
        let mut t = task("a");
        t.meta.revision = 3;
        snap.add_task(t.clone());

        assert!(snap.update_task(t.clone(), true));
        assert_eq!(snap.task("a").unwrap().meta.revision, 4);

        assert!(snap.set_task(t));
        assert_eq!(snap.task("a").unwrap().meta.revision, 3);

        assert!(!snap.update_task(task("missing"), true));
    }

    #[test]
    fn new_and_dirty_task_filters() {
        let mut snap = Snapshot::new();
        let mut synced = task("a");
        synced.meta.revision = 1;
        let mut dirty = task("b");
        dirty.meta.revision = 2;
        dirty.meta.dirty = true;
        let fresh = task("c");
        snap.add_task(synced);
        snap.add_task(dirty);
        snap.add_task(fresh);

        let new: Vec<_> = snap.new_tasks().iter().map(|t| t.uuid.clone()).collect();
        assert_eq!(new, vec!["c"]);
        let dirty: Vec<_> = snap.dirty_tasks().iter().map(|t| t.uuid.clone()).collect();
        assert_eq!(dirty, vec!["b"]);
    }

    #[test]
    fn used_and_unused_tags() {
        let mut snap = Snapshot::new();
        snap.add_tag(Tag::new("used"));
        snap.add_tag(Tag::new("unused"));
        let mut t = task("a");
        t.add_tag("used");
        snap.add_task(t);

        assert_eq!(snap.used_tags().len(), 1);
        assert_eq!(snap.unused_tags().len(), 1);
        snap.remove_unused_tags();
        assert!(snap.contains_tag("used"));
        assert!(!snap.contains_tag("unused"));
    }

    #[test]
    fn clear_sync_bits_resets_everything() {
        let mut snap = Snapshot::new();
        let mut t = task("a");
        t.meta.dirty = true;
        snap.add_task(t);
        snap.add_tag(Tag::new("fresh"));
        snap.record_deleted_task("gone");
        snap.record_deleted_tag("old");

        snap.clear_sync_bits();

        assert_eq!(snap.task("a").unwrap().meta.revision, 0);
        assert!(!snap.task("a").unwrap().meta.dirty);
        assert_eq!(snap.tag("fresh").unwrap().meta.revision, 0);
        assert!(snap.deleted_task_uuids.is_empty());
        assert!(snap.deleted_tag_names.is_empty());
    }

    #[test]
    fn clear_sync_bits_keeps_assigned_revisions() {
        let mut snap = Snapshot::new();
        let mut t = task("a");
        t.meta.revision = 5;
        t.meta.dirty = true;
        snap.add_task(t);

        snap.clear_sync_bits();
        assert_eq!(snap.task("a").unwrap().meta.revision, 5);
    }

    #[test]
    fn json_roundtrip_preserves_snapshot() {
        let mut snap = Snapshot::new();
        snap.revision = 7;
        snap.add_task(task("a"));
        snap.add_tag(Tag::new("home"));
        snap.record_deleted_task("old-task");

        let json = snap.to_json().unwrap();
        assert!(json.contains("\"deletedTaskUuids\":[\"old-task\"]"));

        let back = Snapshot::from_json(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn json_missing_fields_default() {
        let snap = Snapshot::from_json("{}").unwrap();
        assert_eq!(snap.revision, UNSYNCED_REVISION);
        assert!(snap.is_empty());

        let snap = Snapshot::from_json(r#"{"revision":3,"tasks":[{"uuid":"x"}]}"#).unwrap();
        assert_eq!(snap.revision, 3);
        assert_eq!(snap.task_count(), 1);
    }

    #[test]
    fn json_parse_failure_is_an_error_value() {
        assert!(Snapshot::from_json("not json").is_err());
        assert!(Snapshot::from_json("").is_err());
    }
}
