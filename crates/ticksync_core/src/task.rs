//! Tasks and the field-level conflict-merge rule.

use crate::tag::apply_builtin_precedence;
use crate::types::{SyncMeta, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single task.
///
/// `uuid` is the task's identity: globally unique within a snapshot and
/// immutable for the life of the task. The calendar-linkage fields are
/// opaque pass-through data owned by external calendar integrations; the
/// merge never inspects or alters them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Task {
    /// Stable identity; never changes once assigned.
    #[serde(default)]
    pub uuid: String,
    /// Parent task for subtask hierarchies.
    #[serde(rename = "parentUuid", default, skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
    /// Task title.
    #[serde(default)]
    pub title: String,
    /// Completion state.
    #[serde(rename = "isDone", default)]
    pub done: bool,
    /// Importance flag.
    #[serde(rename = "isImportant", default)]
    pub important: bool,
    /// Hide this task on weekends.
    #[serde(rename = "hideOnWeekends", default)]
    pub hide_on_weekends: bool,
    /// Tag names attached to this task, ordered and deduplicated.
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the task was created.
    #[serde(
        rename = "creationTimestamp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub creation: Option<Timestamp>,
    /// When the task content last changed.
    #[serde(
        rename = "modificationTimestamp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub modified: Option<Timestamp>,
    /// When the task is due.
    #[serde(rename = "dueDate", default, skip_serializing_if = "Option::is_none")]
    pub due: Option<Timestamp>,
    /// When the task was completed.
    #[serde(
        rename = "completionDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub completed: Option<Timestamp>,
    /// Event uuid inside the linked device calendar.
    #[serde(
        rename = "uuidInDeviceCalendar",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub uuid_in_device_calendar: Option<String>,
    /// Uuid of the linked device calendar.
    #[serde(
        rename = "deviceCalendarUuid",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub device_calendar_uuid: Option<String>,
    /// Display name of the linked device calendar.
    #[serde(
        rename = "deviceCalendarName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub device_calendar_name: Option<String>,
    /// Synchronization metadata.
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl Task {
    /// Creates a new local-only task with a fresh uuid and the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            title: title.into(),
            creation: Some(Timestamp::now()),
            ..Self::default()
        }
    }

    /// Returns true if the task carries the given tag name.
    #[must_use]
    pub fn contains_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }

    /// Attaches a tag name, keeping the collection deduplicated.
    pub fn add_tag(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.contains_tag(&name) {
            self.tags.push(name);
        }
    }

    /// Detaches a tag name. Removing an absent tag is a no-op.
    pub fn remove_tag(&mut self, name: &str) {
        self.tags.retain(|t| t != name);
    }

    /// Resolves a divergence between this task (today's server value) and
    /// `incoming` (the client's pre-merge value), returning the merged task.
    ///
    /// Deterministic and directional; the caller guarantees it runs once per
    /// detected conflict, gated by a revision bump. Field rules:
    ///
    /// - `done`: logical AND, an incomplete state on either replica wins
    /// - `important`: logical OR, importance is sticky
    /// - `due`: a lone value is adopted; with two values the side whose
    ///   `modified` timestamp is strictly later wins (a missing timestamp
    ///   counts as the oldest possible instant)
    /// - `title`: the incoming title is adopted only if it differs and
    ///   `incoming.modified` is strictly later
    /// - `tags`: name-deduplicated union, then builtin precedence
    ///   (`"current"` over `"soon"`)
    ///
    /// Identity, creation time, calendar linkage, and sync metadata keep the
    /// server-side values.
    #[must_use]
    pub fn merge_conflict(&self, incoming: &Task) -> Task {
        let mut merged = self.clone();

        merged.done = self.done && incoming.done;
        merged.important = self.important || incoming.important;

        merged.due = match (self.due, incoming.due) {
            (Some(due), None) => Some(due),
            (None, Some(due)) => Some(due),
            (Some(_), Some(theirs)) => {
                // Option's None-is-least ordering handles missing timestamps.
                if incoming.modified > self.modified {
                    Some(theirs)
                } else {
                    self.due
                }
            }
            (None, None) => None,
        };

        if incoming.title != self.title && incoming.modified > self.modified {
            merged.title = incoming.title.clone();
        }

        for name in &incoming.tags {
            if !merged.contains_tag(name) {
                merged.tags.push(name.clone());
            }
        }
        apply_builtin_precedence(&mut merged.tags);

        merged
    }
}
