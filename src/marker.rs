//! Marker semantics: annotating processed notes so they are not
//! reprocessed.
//!
//! A note is considered marked iff its title begins with the exact
//! marker string. Marking is idempotent and mutates only the original
//! store record, never an exported copy.

use crate::domain::Note;
use crate::store::{NoteStore, StoreError};

/// Sentinel prefixed to a processed note's title.
pub const MARKER: &str = "NOTE-VOYEUR: TARGET ACQUIRED!";

/// Outcome of one mark attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked,
    AlreadyMarked,
}

/// Totals from marking a result set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MarkSummary {
    pub marked: usize,
    pub skipped: usize,
}

/// Pure check: does this title carry the marker?
///
/// Exact, case-sensitive prefix match; never fuzzy.
pub fn is_marked(title: &str) -> bool {
    title.starts_with(MARKER)
}

/// Computes the marked title for an unmarked original.
fn marked_title(title: &str) -> String {
    format!("{MARKER} {title}")
}

/// Computes the marked body: the new title becomes the first line, with
/// all original body content unmodified beneath it.
fn marked_body(new_title: &str, body: &str) -> String {
    format!("{new_title}\n{body}")
}

/// Marks a note in the external store.
///
/// A no-op returning `AlreadyMarked` when the title already carries the
/// marker, so repeated invocations over the same note set never alter
/// state further.
pub fn mark_note<S: NoteStore>(store: &mut S, note: &Note) -> Result<MarkOutcome, StoreError> {
    if is_marked(note.title()) {
        return Ok(MarkOutcome::AlreadyMarked);
    }
    let title = marked_title(note.title());
    let body = marked_body(&title, note.body());
    store.update(note.id(), &title, &body)?;
    Ok(MarkOutcome::Marked)
}

/// Marks every note in a result set, skipping already-marked ones.
pub fn mark_all<S: NoteStore>(store: &mut S, notes: &[Note]) -> Result<MarkSummary, StoreError> {
    let mut summary = MarkSummary::default();
    for note in notes {
        match mark_note(store, note)? {
            MarkOutcome::Marked => summary.marked += 1,
            MarkOutcome::AlreadyMarked => summary.skipped += 1,
        }
    }
    Ok(summary)
}
