//! Editor draft: the uncommitted buffer for a note being created or edited.

use crate::gateway::NotePayload;
use crate::models::{Note, NoteId};

const WORDS_PER_MINUTE: usize = 200;

/// Working copy of a note's title and content.
///
/// Edits never touch the held collection; only a successful save does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    editing: Option<NoteId>,
    pub title: String,
    pub content: String,
}

/// Live counters shown while editing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftStats {
    pub words: usize,
    pub chars: usize,
    pub reading_minutes: usize,
}

impl Draft {
    /// Blank draft for a new note
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft seeded from an existing note
    #[must_use]
    pub fn for_note(note: &Note) -> Self {
        Self {
            editing: Some(note.id),
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }

    /// Id of the note being edited, `None` when creating
    #[must_use]
    pub const fn editing(&self) -> Option<NoteId> {
        self.editing
    }

    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.editing.is_none()
    }

    #[must_use]
    pub fn can_save(&self) -> bool {
        !(self.title.trim().is_empty() && self.content.trim().is_empty())
    }

    /// Trimmed payload, or `None` if there is nothing to save.
    #[must_use]
    pub fn to_payload(&self) -> Option<NotePayload> {
        NotePayload::from_input(&self.title, &self.content)
    }

    #[must_use]
    pub fn stats(&self) -> DraftStats {
        let words = self.content.split_whitespace().count();
        DraftStats {
            words,
            chars: self.content.chars().count(),
            reading_minutes: words.div_ceil(WORDS_PER_MINUTE),
        }
    }
}
