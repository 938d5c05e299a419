//! Tags and the reserved builtin tag names.

use crate::types::SyncMeta;
use serde::{Deserialize, Serialize};

/// Builtin tag marking a task as being worked on right now.
pub const TAG_CURRENT: &str = "current";
/// Builtin tag marking a task as queued up next.
pub const TAG_SOON: &str = "soon";
/// Builtin tag marking a task for evening hours.
pub const TAG_EVENING: &str = "evening";

/// The reserved builtin tag names.
pub const BUILTIN_TAGS: [&str; 3] = [TAG_CURRENT, TAG_SOON, TAG_EVENING];

/// A user-visible tag. Its name is its identity within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Tag {
    /// Tag name; unique within a snapshot, compared verbatim.
    #[serde(default)]
    pub name: String,
    /// Synchronization metadata.
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl Tag {
    /// Creates a new local-only tag with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: SyncMeta::local_only(),
        }
    }

    /// Returns true if this is one of the reserved builtin tags.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        BUILTIN_TAGS.contains(&self.name.as_str())
    }
}

/// Applies builtin precedence to a tag-name collection: `"current"`
/// dominates `"soon"`, so a set holding both drops `"soon"`.
pub fn apply_builtin_precedence(names: &mut Vec<String>) {
    if names.iter().any(|n| n == TAG_CURRENT) {
        names.retain(|n| n != TAG_SOON);
    }
}
