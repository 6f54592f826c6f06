//! Note store boundary.
//!
//! The external Notes store is reached through a loosely-contracted
//! scripting interface; everything behind [`NoteStore`] is the single
//! seam where its responses are parsed and validated into typed
//! [`Note`] records.

mod applescript;
mod memory;

pub use applescript::AppleScriptStore;
pub use memory::MemoryStore;

use crate::domain::{Note, NoteId, QueryMode};
use thiserror::Error;

/// Errors from the external notes store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached at all.
    #[error("notes store unavailable: {0}")]
    Unavailable(String),

    /// The store denied access (automation permissions not granted).
    #[error("notes store access denied: {0}")]
    PermissionDenied(String),

    /// The call exceeded its wall-clock bound.
    #[error("notes store call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// A response record did not match the expected shape.
    #[error("malformed store record: {0}")]
    MalformedRecord(String),
}

/// How much of each note to materialize.
///
/// Stats-only queries with no text filter can skip bodies entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// All fields including the body.
    Full,
    /// Identity, title, and timestamps; body left empty.
    Headers,
}

/// The only interface to the notes store.
///
/// `list` returns raw candidate records for a query mode, capped at
/// `max` records; ordering is not guaranteed and callers sort. `update`
/// rewrites a note's title and body in place.
pub trait NoteStore {
    fn list(
        &self,
        mode: &QueryMode,
        max: usize,
        projection: Projection,
    ) -> Result<Vec<Note>, StoreError>;

    fn update(&mut self, id: &NoteId, title: &str, body: &str) -> Result<(), StoreError>;
}
