//! Authenticated identity

use serde::{Deserialize, Serialize};

/// The signed-in user as reported by `/auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl Session {
    /// First word of the user's name, used for greetings
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    /// Uppercased first character of the name, used as an avatar fallback
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        self.name
            .trim()
            .chars()
            .next()
            .and_then(|ch| ch.to_uppercase().next())
    }
}
