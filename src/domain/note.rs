//! Note record as read from the external store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque note identifier assigned by the external store.
///
/// For the Notes app this is a Core Data URI
/// (`x-coredata://...`); it is stable across reads and is the handle
/// used to address a note in update commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A note snapshot from the external store.
///
/// Notes are created, mutated, and destroyed entirely by the store;
/// this type is a read-side copy. Timestamps are normalized to UTC at
/// the store adapter boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    title: String,
    body: String,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl Note {
    pub fn new(
        id: NoteId,
        title: impl Into<String>,
        body: impl Into<String>,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
            created,
            modified,
        }
    }

    pub fn id(&self) -> &NoteId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Returns a copy with the given title and body, keeping identity
    /// and timestamps. Used for cleaned export copies.
    pub fn with_content(&self, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            title: title.into(),
            body: body.into(),
            created: self.created,
            modified: self.modified,
        }
    }
}
