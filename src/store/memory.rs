//! In-memory note store for tests and offline runs.

use super::{NoteStore, Projection, StoreError};
use crate::domain::{Note, NoteId, QueryMode};

/// A `NoteStore` backed by a plain vector.
///
/// Mirrors the adapter contract: `list` applies only the date-mode
/// predicate and the materialization cap, leaving marker/text filtering
/// and ordering to the engine.
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: Vec<Note>,
    /// When set, every call fails with this message as `Unavailable`.
    unavailable: Option<String>,
}

impl MemoryStore {
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            notes,
            unavailable: None,
        }
    }

    /// Makes every store call fail, for error-path tests.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            notes: Vec::new(),
            unavailable: Some(message.into()),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id() == id)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        match &self.unavailable {
            Some(msg) => Err(StoreError::Unavailable(msg.clone())),
            None => Ok(()),
        }
    }
}

impl NoteStore for MemoryStore {
    fn list(
        &self,
        mode: &QueryMode,
        max: usize,
        projection: Projection,
    ) -> Result<Vec<Note>, StoreError> {
        self.check_available()?;
        let selected = self
            .notes
            .iter()
            .filter(|n| match mode {
                QueryMode::Latest => true,
                QueryMode::Forward(from) => n.modified() >= *from,
                QueryMode::Backward(to) => n.modified() <= *to,
                QueryMode::Range(from, to) => n.modified() >= *from && n.modified() <= *to,
            })
            .take(max)
            .map(|n| match projection {
                Projection::Full => n.clone(),
                Projection::Headers => n.with_content(n.title(), ""),
            })
            .collect();
        Ok(selected)
    }

    fn update(&mut self, id: &NoteId, title: &str, body: &str) -> Result<(), StoreError> {
        self.check_available()?;
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id() == id)
            .ok_or_else(|| StoreError::MalformedRecord(format!("no note with id {id}")))?;
        *note = note.with_content(title, body);
        Ok(())
    }
}
