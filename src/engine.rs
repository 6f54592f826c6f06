//! Filter engine: turns a `FilterSpec` into the exact matching note
//! set.
//!
//! The store adapter handles only the date-mode predicate and the
//! materialization cap; marker exclusion, text filtering, ordering, and
//! limit truncation all happen here so the semantics are identical for
//! every backend.

use crate::domain::{FilterSpec, Note};
use crate::marker;
use crate::store::{NoteStore, Projection, StoreError};

/// Hard cap on candidate materialization per invocation, independent of
/// the requested limit.
pub const MAX_CANDIDATES: usize = 500;

/// Selection and counting over a note store.
pub struct FilterEngine<'a, S: NoteStore> {
    store: &'a S,
}

impl<'a, S: NoteStore> FilterEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns the matching notes, most recently modified first, at
    /// most `spec.limit()` of them.
    pub fn select(&self, spec: &FilterSpec) -> Result<Vec<Note>, StoreError> {
        self.materialize(spec, Projection::Full, spec.limit())
    }

    /// Counts qualifying notes without the limit applied.
    ///
    /// Agrees exactly with `select` under an unbounded limit. Bodies
    /// are only materialized when a text filter needs them.
    pub fn count(&self, spec: &FilterSpec) -> Result<usize, StoreError> {
        let projection = if spec.text_filter().is_some() {
            Projection::Full
        } else {
            Projection::Headers
        };
        Ok(self.materialize(spec, projection, usize::MAX)?.len())
    }

    fn materialize(
        &self,
        spec: &FilterSpec,
        projection: Projection,
        limit: usize,
    ) -> Result<Vec<Note>, StoreError> {
        let mut notes = self.store.list(&spec.mode(), MAX_CANDIDATES, projection)?;

        // Marker exclusion runs before truncation so excluded notes
        // never use up the limit.
        if spec.exclude_marked() {
            notes.retain(|n| !marker::is_marked(n.title()));
        }

        // Text filter after date/marker filtering, still before
        // truncation. The candidate window is not expanded to make up
        // for filtered-out notes.
        if let Some(token) = spec.text_filter() {
            notes.retain(|n| {
                contains_ignore_case(n.title(), token) || contains_ignore_case(n.body(), token)
            });
        }

        notes.sort_by_key(|n| std::cmp::Reverse(n.modified()));
        notes.truncate(limit);
        Ok(notes)
    }
}

/// Case-insensitive substring test.
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NoteId;
    use crate::marker::MARKER;
    use crate::store::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn note(id: &str, title: &str, body: &str, modified: DateTime<Utc>) -> Note {
        Note::new(NoteId::new(id), title, body, modified, modified)
    }

    fn spec(
        limit: usize,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        text: Option<&str>,
        exclude_marked: bool,
    ) -> FilterSpec {
        FilterSpec::new(limit, from, to, text.map(str::to_string), exclude_marked).unwrap()
    }

    fn ids(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.id().as_str()).collect()
    }

    #[test]
    fn latest_mode_returns_newest_first() {
        let store = MemoryStore::new(vec![
            note("old", "Old", "", ts(2025, 3, 1)),
            note("new", "New", "", ts(2025, 5, 1)),
            note("mid", "Mid", "", ts(2025, 4, 1)),
        ]);
        let engine = FilterEngine::new(&store);
        let result = engine.select(&spec(2, None, None, None, false)).unwrap();
        assert_eq!(ids(&result), vec!["new", "mid"]);
    }

    #[test]
    fn range_returns_only_in_range_notes() {
        // Store has notes dated 2025-04-15 and 2025-05-02; an April
        // range must return only the April one.
        let store = MemoryStore::new(vec![
            note("april", "April note", "", ts(2025, 4, 15)),
            note("may", "May note", "", ts(2025, 5, 2)),
        ]);
        let engine = FilterEngine::new(&store);
        let result = engine
            .select(&spec(
                10,
                Some(ts(2025, 4, 1)),
                Some(ts(2025, 4, 30)),
                None,
                false,
            ))
            .unwrap();
        assert_eq!(ids(&result), vec!["april"]);
    }

    #[test]
    fn range_equals_intersection_of_forward_and_backward() {
        let notes: Vec<Note> = (1..=28)
            .map(|d| note(&format!("d{d:02}"), "t", "b", ts(2025, 4, d)))
            .collect();
        let store = MemoryStore::new(notes);
        let engine = FilterEngine::new(&store);

        let from = ts(2025, 4, 10);
        let to = ts(2025, 4, 20);
        let big = usize::MAX - 1;

        let forward = engine
            .select(&spec(big, Some(from), None, None, false))
            .unwrap();
        let backward = engine
            .select(&spec(big, None, Some(to), None, false))
            .unwrap();
        let range = engine
            .select(&spec(big, Some(from), Some(to), None, false))
            .unwrap();

        let expected: Vec<&str> = ids(&forward)
            .into_iter()
            .filter(|id| ids(&backward).contains(id))
            .collect();
        assert_eq!(ids(&range), expected);
    }

    #[test]
    fn count_agrees_with_unbounded_select() {
        let notes: Vec<Note> = (1..=15)
            .map(|d| {
                let title = if d % 3 == 0 {
                    format!("{MARKER} note {d}")
                } else {
                    format!("note {d}")
                };
                note(&format!("n{d}"), &title, "alpha beta", ts(2025, 4, d))
            })
            .collect();
        let store = MemoryStore::new(notes);
        let engine = FilterEngine::new(&store);

        for s in [
            spec(2, None, None, None, false),
            spec(2, Some(ts(2025, 4, 5)), None, None, true),
            spec(2, None, Some(ts(2025, 4, 10)), Some("alpha"), false),
            spec(2, Some(ts(2025, 4, 3)), Some(ts(2025, 4, 12)), None, true),
        ] {
            let unbounded = FilterSpec::new(
                usize::MAX,
                s.from_bound(),
                s.to_bound(),
                s.text_filter().map(str::to_string),
                s.exclude_marked(),
            )
            .unwrap();
            assert_eq!(
                engine.count(&s).unwrap(),
                engine.select(&unbounded).unwrap().len()
            );
        }
    }

    #[test]
    fn marker_exclusion_precedes_truncation() {
        // 10 notes, the 3 most recent marked; exclude_marked with
        // limit 3 must return the next 3 unmarked notes.
        let notes: Vec<Note> = (1..=10)
            .map(|d| {
                let title = if d >= 8 {
                    format!("{MARKER} note {d}")
                } else {
                    format!("note {d}")
                };
                note(&format!("n{d}"), &title, "", ts(2025, 4, d))
            })
            .collect();
        let store = MemoryStore::new(notes);
        let engine = FilterEngine::new(&store);

        let result = engine.select(&spec(3, None, None, None, true)).unwrap();
        assert_eq!(ids(&result), vec!["n7", "n6", "n5"]);
    }

    #[test]
    fn text_filter_is_case_insensitive_over_title_and_body() {
        let store = MemoryStore::new(vec![
            note("hit", "Tools", "...using ai tools...", ts(2025, 4, 2)),
            note("title-hit", "AI roadmap", "nothing here", ts(2025, 4, 3)),
            note("miss", "Groceries", "milk and eggs", ts(2025, 4, 4)),
        ]);
        let engine = FilterEngine::new(&store);
        let result = engine
            .select(&spec(10, None, None, Some("AI"), false))
            .unwrap();
        assert_eq!(ids(&result), vec!["title-hit", "hit"]);
    }

    #[test]
    fn oversized_limit_returns_all_matches() {
        let store = MemoryStore::new(vec![
            note("a", "t", "", ts(2025, 4, 1)),
            note("b", "t", "", ts(2025, 4, 2)),
        ]);
        let engine = FilterEngine::new(&store);
        let result = engine.select(&spec(1000, None, None, None, false)).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn empty_result_set_is_not_an_error() {
        let store = MemoryStore::new(vec![note("a", "t", "", ts(2025, 4, 1))]);
        let engine = FilterEngine::new(&store);
        let result = engine
            .select(&spec(10, Some(ts(2026, 1, 1)), None, None, false))
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn store_failure_is_surfaced_not_swallowed() {
        let store = MemoryStore::unavailable("offline");
        let engine = FilterEngine::new(&store);
        assert!(engine.select(&spec(5, None, None, None, false)).is_err());
    }
}
