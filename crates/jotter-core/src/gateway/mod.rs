//! Boundary between local intents and the remote notes API.
//!
//! No gateway operation retries or caches: every call reaches the remote
//! store and its failure is handed back to the caller unchanged.

mod http;

use std::rc::Rc;

use serde::Serialize;

use crate::error::{GatewayError, GatewayResult};
use crate::models::{Note, NoteId, Session, UNTITLED};

pub use http::HttpGateway;

/// Body sent when creating or updating a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotePayload {
    pub title: String,
    pub content: String,
}

impl NotePayload {
    /// Trim user input and apply the "Untitled" default.
    ///
    /// Returns `None` when both title and content are blank; such a note is
    /// never sent to the remote.
    #[must_use]
    pub fn from_input(title: &str, content: &str) -> Option<Self> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() && content.is_empty() {
            return None;
        }
        Some(Self {
            title: if title.is_empty() { UNTITLED } else { title }.to_string(),
            content: content.to_string(),
        })
    }
}

/// Remote note CRUD operations.
#[allow(async_fn_in_trait)]
pub trait NoteGateway {
    /// Full collection as known to the remote store.
    async fn list_notes(&self) -> GatewayResult<Vec<Note>>;

    /// Create a note; the returned record carries the server-assigned id.
    async fn create_note(&self, payload: &NotePayload) -> GatewayResult<Note>;

    async fn update_note(&self, id: NoteId, payload: &NotePayload) -> GatewayResult<Note>;

    async fn delete_note(&self, id: NoteId) -> GatewayResult<()>;
}

/// Remote authentication operations.
#[allow(async_fn_in_trait)]
pub trait SessionGateway {
    /// Current identity, or `Ok(None)` when not signed in.
    async fn who_am_i(&self) -> GatewayResult<Option<Session>>;

    async fn login(&self, email: &str, password: &str) -> GatewayResult<Session>;

    async fn register(&self, name: &str, email: &str, password: &str) -> GatewayResult<()>;

    /// Best-effort; the local session is dropped whatever the outcome.
    async fn logout(&self) -> GatewayResult<()>;
}

impl<G: NoteGateway> NoteGateway for Rc<G> {
    async fn list_notes(&self) -> GatewayResult<Vec<Note>> {
        (**self).list_notes().await
    }

    async fn create_note(&self, payload: &NotePayload) -> GatewayResult<Note> {
        (**self).create_note(payload).await
    }

    async fn update_note(&self, id: NoteId, payload: &NotePayload) -> GatewayResult<Note> {
        (**self).update_note(id, payload).await
    }

    async fn delete_note(&self, id: NoteId) -> GatewayResult<()> {
        (**self).delete_note(id).await
    }
}

impl<G: SessionGateway> SessionGateway for Rc<G> {
    async fn who_am_i(&self) -> GatewayResult<Option<Session>> {
        (**self).who_am_i().await
    }

    async fn login(&self, email: &str, password: &str) -> GatewayResult<Session> {
        (**self).login(email, password).await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> GatewayResult<()> {
        (**self).register(name, email, password).await
    }

    async fn logout(&self) -> GatewayResult<()> {
        (**self).logout().await
    }
}

/// Client-side checks run before credentials leave the process.
pub fn validate_credentials(email: &str, password: &str) -> GatewayResult<()> {
    if email.trim().is_empty() {
        return Err(GatewayError::Validation("Email is required".to_string()));
    }
    if password.is_empty() {
        return Err(GatewayError::Validation("Password is required".to_string()));
    }
    Ok(())
}

pub fn validate_registration(name: &str, email: &str, password: &str) -> GatewayResult<()> {
    if name.trim().is_empty() {
        return Err(GatewayError::Validation("Name is required".to_string()));
    }
    validate_credentials(email, password)
}
