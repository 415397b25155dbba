//! Core data structures for the agenda application.
//!
//! This module contains the primary types used throughout the application:
//! notes, their checklist items, and reminder schedules.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single checklist item belonging to exactly one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique within the parent note
    pub id: String,
    /// The checklist item text
    pub text: String,
    /// Whether the item has been checked off
    pub completed: bool,
}

impl Todo {
    pub fn new(id: String, text: String) -> Self {
        Todo {
            id,
            text,
            completed: false,
        }
    }
}

/// Recurrence rule for a reminder. A reminder without one fires once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Repeat {
    /// Uppercase label used to prefix the titles of recurring occurrences
    /// in the calendar view.
    pub fn label(&self) -> &'static str {
        match self {
            Repeat::Daily => "DAILY",
            Repeat::Weekly => "WEEKLY",
            Repeat::Monthly => "MONTHLY",
            Repeat::Yearly => "YEARLY",
        }
    }
}

/// An optional schedule attached to a note: either a one-time alert or an
/// infinite recurring series anchored at `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Anchor timestamp of the schedule
    pub date: DateTime<Utc>,
    /// Recurrence step; `None` means the reminder fires exactly once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Repeat>,
}

/// Represents a single note in our system.
///
/// Serialized with camelCase field names and RFC 3339 timestamps; this is
/// the durable snapshot layout as well as the import/export format. `tags`,
/// `todos`, `reminder` and `isArchived` default when absent so older
/// exports still load, while `id`, `title`, `content` and `createdAt` are
/// required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier, immutable after creation
    pub id: String,
    /// Note title
    pub title: String,
    /// Note content as free text / Markdown
    pub content: String,
    /// Tags for organization
    #[serde(default)]
    pub tags: Vec<String>,
    /// Checklist items, in insertion order
    #[serde(default)]
    pub todos: Vec<Todo>,
    /// When the note was created; immutable after creation
    pub created_at: DateTime<Utc>,
    /// Optional reminder schedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<Reminder>,
    /// Soft-exclusion flag hiding the note from default views
    #[serde(default)]
    pub is_archived: bool,
}

/// Input for creating a note: everything the caller supplies. The store
/// assigns `id`, `createdAt`, fresh todo ids, and `isArchived = false`.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Checklist item texts, in order
    pub todos: Vec<String>,
    pub reminder: Option<Reminder>,
}
