//! Client-side search over the held note collection.
//!
//! The filtered view is recomputed from `(collection, query)` on every read
//! and is never mutated on its own.

use crate::models::Note;

/// Notes whose title or content contains `query`, ignoring case.
///
/// Order is preserved. An empty query yields the full collection.
#[must_use]
pub fn filter_notes(notes: &[Note], query: &str) -> Vec<Note> {
    if query.is_empty() {
        return notes.to_vec();
    }
    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|note| note.matches_lowercase(&needle))
        .cloned()
        .collect()
}
