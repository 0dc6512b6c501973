//! Presentation helpers shared by front-ends.

use chrono::{DateTime, Utc};

use crate::models::Note;

pub const UNKNOWN_DATE: &str = "Unknown Date";
pub const UNKNOWN_TIME: &str = "Unknown Time";
pub const EMPTY_SEARCH_HEADLINE: &str = "No notes found";
pub const EMPTY_COLLECTION_HEADLINE: &str = "Your creative space awaits";

/// `Oct 18, 2026`
#[must_use]
pub fn format_date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(
        || UNKNOWN_DATE.to_string(),
        |date| date.format("%b %-d, %Y").to_string(),
    )
}

/// `02:05 PM`
#[must_use]
pub fn format_time(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(
        || UNKNOWN_TIME.to_string(),
        |date| date.format("%I:%M %p").to_string(),
    )
}

#[must_use]
pub fn note_count_label(count: usize) -> String {
    if count == 1 {
        "1 note".to_string()
    } else {
        format!("{count} notes")
    }
}

#[must_use]
pub fn favorite_count_label(count: usize) -> String {
    format!("{count} favorites")
}

/// Headline shown when the filtered view is empty
#[must_use]
pub const fn empty_state_headline(query: &str) -> &'static str {
    if query.is_empty() {
        EMPTY_COLLECTION_HEADLINE
    } else {
        EMPTY_SEARCH_HEADLINE
    }
}

/// First content line, whitespace-collapsed and truncated with `...`.
#[must_use]
pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}
