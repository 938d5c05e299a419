//! The local on-disk snapshot store.

use crate::error::StoreError;
use std::fs;
use std::path::{Path, PathBuf};
use ticksync_core::{Snapshot, Tag, Task, Timestamp};
use tracing::{debug, info};

/// Owns the working snapshot and its data file.
///
/// Edit operations stamp modification timestamps, set dirty flags, and record
/// tombstones so a later merge can reconcile them; they also mark the store
/// as needing a save, which the debounced saver or the sync cycle flushes.
pub struct LocalStore {
    path: PathBuf,
    snapshot: Snapshot,
    pending_save: bool,
    loaded: bool,
}

impl LocalStore {
    /// Creates a store over the given data file. Nothing is read until
    /// [`LocalStore::load`] runs.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: Snapshot::new(),
            pending_save: false,
            loaded: false,
        }
    }

    /// True once the working snapshot has been read from disk.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Path of the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current working snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Replaces the working snapshot without touching the disk.
    pub fn set_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.loaded = true;
        debug!("working snapshot replaced");
    }

    /// True if edits happened since the last save.
    #[must_use]
    pub fn pending_save(&self) -> bool {
        self.pending_save
    }

    /// Loads the snapshot from disk, replacing the working copy.
    ///
    /// An absent file is not an error; it yields an empty snapshot, the
    /// first-run state.
    pub fn load(&mut self) -> Result<(), StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no data file yet, starting empty");
            self.snapshot = Snapshot::new();
            self.loaded = true;
            return Ok(());
        }

        let json = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        self.snapshot = Snapshot::from_json(&json).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })?;
        self.loaded = true;
        info!(
            path = %self.path.display(),
            revision = self.snapshot.revision,
            tasks = self.snapshot.task_count(),
            "loaded local snapshot"
        );
        Ok(())
    }

    /// Writes the working snapshot to disk.
    ///
    /// The snapshot is written to a sibling temp file and renamed into
    /// place, so an interrupted save never destroys the previous data file.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let json = self.snapshot.to_json().map_err(StoreError::Encode)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.pending_save = false;
        info!(
            path = %self.path.display(),
            revision = self.snapshot.revision,
            tasks = self.snapshot.task_count(),
            "saved local snapshot"
        );
        Ok(())
    }

    /// Replaces the working snapshot and writes it to disk.
    pub fn set_and_save(&mut self, snapshot: Snapshot) -> Result<(), StoreError> {
        self.set_snapshot(snapshot);
        self.save()
    }

    // --- edit operations --------------------------------------------------

    /// Adds a brand-new task, stamping creation/modification times and the
    /// dirty flag. Rejects tasks with an empty uuid.
    pub fn add_task(&mut self, mut task: Task) -> Result<(), StoreError> {
        if task.uuid.is_empty() {
            return Err(StoreError::InvalidTask {
                reason: "empty uuid".into(),
            });
        }
        let now = Timestamp::now();
        task.creation = Some(now);
        task.modified = Some(now);
        task.meta.dirty = true;
        debug!(uuid = %task.uuid, title = %task.title, "adding task");
        self.snapshot.add_task(task);
        self.pending_save = true;
        Ok(())
    }

    /// Replaces an existing task's content, stamping the modification time
    /// and dirty flag. Returns false if no task with that uuid exists.
    pub fn update_task(&mut self, mut task: Task) -> bool {
        task.modified = Some(Timestamp::now());
        task.meta.dirty = true;
        debug!(uuid = %task.uuid, "updating task");
        let updated = self.snapshot.set_task(task);
        if updated {
            self.pending_save = true;
        }
        updated
    }

    /// Removes a task and records its tombstone. Returns false if absent.
    pub fn remove_task(&mut self, uuid: &str) -> bool {
        if self.snapshot.remove_task(uuid) {
            self.snapshot.record_deleted_task(uuid);
            self.pending_save = true;
            true
        } else {
            false
        }
    }

    /// Adds a local-only tag. Adding an existing name is a no-op.
    pub fn add_tag(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.snapshot.contains_tag(&name) {
            self.snapshot.add_tag(Tag::new(name));
            self.pending_save = true;
        }
    }

    /// Removes a tag and records its tombstone. Returns false if absent.
    pub fn remove_tag(&mut self, name: &str) -> bool {
        if self.snapshot.remove_tag(name) {
            self.snapshot.record_deleted_tag(name);
            self.pending_save = true;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticksync_core::UNSYNCED_REVISION;

    fn store_in(dir: &tempfile::TempDir) -> LocalStore {
        LocalStore::new(dir.path().join("tasks.json"))
    }

    #[test]
    fn absent_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.load().unwrap();
        assert!(store.snapshot().is_empty());
        assert_eq!(store.snapshot().revision, UNSYNCED_REVISION);
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.add_task(Task::new("write tests")).unwrap();
        store.add_tag("home");
        store.save().unwrap();
        assert!(!store.pending_save());

        let mut reloaded = store_in(&dir);
        reloaded.load().unwrap();
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "garbage").unwrap();

        let mut store = LocalStore::new(path);
        assert!(matches!(store.load(), Err(StoreError::Decode { .. })));
    }

    #[test]
    fn add_task_stamps_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let task = Task::new("buy milk");
        let uuid = task.uuid.clone();
        store.add_task(task).unwrap();

        let stored = store.snapshot().task(&uuid).unwrap();
        assert!(stored.meta.dirty);
        assert!(stored.creation.is_some());
        assert!(stored.modified.is_some());
        assert!(store.pending_save());
    }

    #[test]
    fn add_task_rejects_empty_uuid() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let mut task = Task::new("bad");
        task.uuid.clear();
        assert!(matches!(
            store.add_task(task),
            Err(StoreError::InvalidTask { .. })
        ));
    }

    #[test]
    fn update_task_marks_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let mut task = Task::new("original");
        let uuid = task.uuid.clone();
        store.add_task(task.clone()).unwrap();
        store.save().unwrap();

        task.title = "renamed".into();
        assert!(store.update_task(task));
        let stored = store.snapshot().task(&uuid).unwrap();
        assert_eq!(stored.title, "renamed");
        assert!(stored.meta.dirty);
        assert!(store.pending_save());

        let mut unknown = Task::new("ghost");
        unknown.uuid = "missing".into();
        assert!(!store.update_task(unknown));
    }

    #[test]
    fn remove_records_tombstones() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        let task = Task::new("doomed");
        let uuid = task.uuid.clone();
        store.add_task(task).unwrap();
        store.add_tag("old");

        assert!(store.remove_task(&uuid));
        assert!(store.remove_tag("old"));
        assert_eq!(store.snapshot().deleted_task_uuids, vec![uuid]);
        assert_eq!(store.snapshot().deleted_tag_names, vec!["old".to_string()]);

        assert!(!store.remove_task("absent"));
        assert!(!store.remove_tag("absent"));
    }

    #[test]
    fn save_replaces_file_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.add_task(Task::new("first")).unwrap();
        store.save().unwrap();
        let first = fs::read_to_string(store.path()).unwrap();

        store.add_task(Task::new("second")).unwrap();
        store.save().unwrap();

        let second = fs::read_to_string(store.path()).unwrap();
        assert_ne!(first, second);

        let mut tmp = store.path().to_path_buf().into_os_string();
        tmp.push(".tmp");
        assert!(!PathBuf::from(tmp).exists());
    }
}
