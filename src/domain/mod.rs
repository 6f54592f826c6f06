//! Core domain types: notes and filter specifications.

mod filter;
mod note;

pub use filter::{FilterError, FilterSpec, QueryMode};
pub use note::{Note, NoteId};
