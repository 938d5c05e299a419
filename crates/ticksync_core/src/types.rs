//! Shared type definitions for the ticksync data model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Revision value meaning "never synced, exists only on this client".
pub const UNSYNCED_REVISION: i64 = -1;

/// An instant in time, stored as integer milliseconds since the Unix epoch.
///
/// All persisted timestamps use this representation, matching the wire
/// format of the snapshot JSON.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a timestamp from milliseconds since the Unix epoch.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the raw millisecond value.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Self(millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Per-item synchronization metadata shared by tasks and tags.
///
/// `revision` is assigned by the remote authority and only ever advances;
/// [`UNSYNCED_REVISION`] marks an item that the server has never seen.
/// `dirty` is set when the item's content changed locally since its last
/// successful reconciliation and is serialized as `needsSyncToServer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMeta {
    /// Server-assigned revision, or [`UNSYNCED_REVISION`] for local-only items.
    #[serde(default = "default_revision")]
    pub revision: i64,
    /// True if the item changed locally since the last merge.
    #[serde(rename = "needsSyncToServer", default)]
    pub dirty: bool,
}

impl SyncMeta {
    /// Metadata for a freshly created, never-synced item.
    #[must_use]
    pub const fn local_only() -> Self {
        Self {
            revision: UNSYNCED_REVISION,
            dirty: false,
        }
    }

    /// Returns true if the item has never been assigned a server revision.
    #[must_use]
    pub const fn is_unsynced(&self) -> bool {
        self.revision == UNSYNCED_REVISION
    }
}

impl Default for SyncMeta {
    fn default() -> Self {
        Self::local_only()
    }
}

fn default_revision() -> i64 {
    UNSYNCED_REVISION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_ordering() {
        let a = Timestamp::from_millis(1_000);
        let b = Timestamp::from_millis(2_000);
        assert!(a < b);
        assert_eq!(a.as_millis(), 1_000);
    }

    #[test]
    fn optional_timestamp_treats_none_as_oldest() {
        // Option's derived ordering puts None before any Some, which is the
        // "missing timestamp is the oldest possible instant" rule.
        let none: Option<Timestamp> = None;
        let some = Some(Timestamp::from_millis(0));
        assert!(none < some);
    }

    #[test]
    fn sync_meta_defaults_to_local_only() {
        let meta = SyncMeta::default();
        assert_eq!(meta.revision, UNSYNCED_REVISION);
        assert!(!meta.dirty);
        assert!(meta.is_unsynced());
    }

    #[test]
    fn sync_meta_json_field_names() {
        let meta = SyncMeta {
            revision: 3,
            dirty: true,
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"revision\":3"));
        assert!(json.contains("\"needsSyncToServer\":true"));
    }

    #[test]
    fn sync_meta_missing_fields_default() {
        let meta: SyncMeta = serde_json::from_str("{}").unwrap();
        assert_eq!(meta.revision, UNSYNCED_REVISION);
        assert!(!meta.dirty);
    }
}
