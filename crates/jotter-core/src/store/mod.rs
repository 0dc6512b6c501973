//! Local note collection store.
//!
//! Holds the in-process copy of the user's notes together with the transient
//! view state (search query, favorites, view mode, editor draft), and applies
//! gateway responses to it. The store is single-threaded: operations take
//! `&self`, keep state behind `RefCell`/`Cell`, and never hold a borrow across
//! an `.await`, so several intents may be in flight on one task at a time.
//!
//! Favorite marks are a client-only annotation. They are never sent to the
//! remote and are lost when the store is dropped.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use crate::draft::Draft;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{NoteGateway, NotePayload};
use crate::models::{LoadState, Note, NoteId, ViewMode};
use crate::search::filter_notes;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("A note needs a title or some content")]
    EmptyNote,
    #[error("Notes are not available (store is {0})")]
    NotReady(LoadState),
    #[error("Note {0} already has a change in progress")]
    MutationInFlight(NoteId),
    #[error("Note not found: {0}")]
    NotFound(NoteId),
    #[error("The editor is not open")]
    EditorClosed,
    #[error("The note view has been closed")]
    Closed,
}

impl StoreError {
    /// The remote rejected the session; callers should leave the view.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::Gateway(GatewayError::Auth(_)))
    }
}

#[derive(Debug, Default)]
struct Collection {
    notes: Vec<Note>,
    query: String,
    favorites: BTreeSet<NoteId>,
    view_mode: ViewMode,
    editor: Option<Draft>,
}

impl Collection {
    fn position(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    /// Replace wholesale, keeping the first occurrence of any repeated id.
    fn replace_all(&mut self, notes: Vec<Note>) {
        let mut seen = HashSet::with_capacity(notes.len());
        self.notes = notes
            .into_iter()
            .filter(|note| seen.insert(note.id))
            .collect();
    }

    fn prepend(&mut self, note: Note) {
        self.notes.retain(|existing| existing.id != note.id);
        self.notes.insert(0, note);
    }

    fn replace(&mut self, note: Note) -> bool {
        match self.position(note.id) {
            Some(index) => {
                self.notes[index] = note;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: NoteId) {
        self.notes.retain(|note| note.id != id);
        self.favorites.remove(&id);
        if self
            .editor
            .as_ref()
            .is_some_and(|draft| draft.editing() == Some(id))
        {
            self.editor = None;
        }
    }
}

/// Marks a note id as having a mutation in flight until dropped.
struct InFlight<'a> {
    ids: &'a RefCell<HashSet<NoteId>>,
    id: NoteId,
}

impl<'a> InFlight<'a> {
    fn acquire(ids: &'a RefCell<HashSet<NoteId>>, id: NoteId) -> StoreResult<Self> {
        if !ids.borrow_mut().insert(id) {
            return Err(StoreError::MutationInFlight(id));
        }
        Ok(Self { ids, id })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.ids.borrow_mut().remove(&self.id);
    }
}

/// Reconciles the remote note collection with local view state.
pub struct NoteStore<G> {
    gateway: G,
    collection: RefCell<Collection>,
    load_state: Cell<LoadState>,
    in_flight: RefCell<HashSet<NoteId>>,
    session_expired: Cell<bool>,
    closed: Cell<bool>,
}

impl<G: NoteGateway> NoteStore<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            collection: RefCell::new(Collection::default()),
            load_state: Cell::new(LoadState::Uninitialized),
            in_flight: RefCell::new(HashSet::new()),
            session_expired: Cell::new(false),
            closed: Cell::new(false),
        }
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Fetch the full collection and replace the held copy.
    ///
    /// Safe to repeat once ready; each call replaces rather than merges. Any
    /// failure moves the store to `Failed`, which is terminal.
    pub async fn load(&self) -> StoreResult<usize> {
        self.ensure_open()?;
        let state = self.load_state.get();
        match state {
            LoadState::Loading | LoadState::Failed => return Err(StoreError::NotReady(state)),
            LoadState::Uninitialized => self.set_load_state(LoadState::Loading),
            LoadState::Ready => {}
        }

        let result = self.gateway.list_notes().await;
        if self.closed.get() {
            tracing::warn!("Discarding note list received after the store was closed");
            return Err(StoreError::Closed);
        }

        match result {
            Ok(notes) => {
                let mut collection = self.collection.borrow_mut();
                collection.replace_all(notes);
                let count = collection.notes.len();
                drop(collection);
                self.set_load_state(LoadState::Ready);
                tracing::info!(count, "Loaded notes");
                Ok(count)
            }
            Err(error) => {
                self.set_load_state(LoadState::Failed);
                Err(self.record_failure(error))
            }
        }
    }

    pub fn set_search_query(&self, query: impl Into<String>) -> StoreResult<()> {
        self.ensure_ready()?;
        self.collection.borrow_mut().query = query.into();
        Ok(())
    }

    /// Create a note remotely and prepend the returned record.
    ///
    /// Nothing is inserted before the remote answers, so the held note always
    /// carries the server-assigned id.
    pub async fn create(&self, title: &str, content: &str) -> StoreResult<Note> {
        self.ensure_ready()?;
        let payload = NotePayload::from_input(title, content).ok_or(StoreError::EmptyNote)?;

        let result = self.gateway.create_note(&payload).await;
        let note = self.settle(result, "create")?;

        self.collection.borrow_mut().prepend(note.clone());
        tracing::debug!(note_id = %note.id, "Created note");
        Ok(note)
    }

    /// Update a note remotely and swap in the returned record by id.
    pub async fn update(&self, id: NoteId, title: &str, content: &str) -> StoreResult<Note> {
        self.ensure_ready()?;
        let payload = NotePayload::from_input(title, content).ok_or(StoreError::EmptyNote)?;
        let _in_flight = InFlight::acquire(&self.in_flight, id)?;

        let result = self.gateway.update_note(id, &payload).await;
        let note = self.settle(result, "update")?;

        if !self.collection.borrow_mut().replace(note.clone()) {
            tracing::debug!(note_id = %id, "Updated note is no longer held locally");
        }
        Ok(note)
    }

    /// Delete a note remotely, then drop it and its favorite mark locally.
    ///
    /// A remote `NotFound` counts as already deleted.
    pub async fn remove(&self, id: NoteId) -> StoreResult<()> {
        self.ensure_ready()?;
        let _in_flight = InFlight::acquire(&self.in_flight, id)?;

        let result = match self.gateway.delete_note(id).await {
            Err(error) if error.is_not_found() => {
                tracing::debug!(note_id = %id, "Note was already deleted remotely");
                Ok(())
            }
            other => other,
        };
        self.settle(result, "delete")?;

        self.collection.borrow_mut().remove(id);
        Ok(())
    }

    /// Flip the favorite mark for `id`; returns whether it is now marked.
    pub fn toggle_favorite(&self, id: NoteId) -> StoreResult<bool> {
        self.ensure_ready()?;
        let mut collection = self.collection.borrow_mut();
        if collection.favorites.remove(&id) {
            return Ok(false);
        }
        collection.favorites.insert(id);
        Ok(true)
    }

    pub fn set_view_mode(&self, mode: ViewMode) -> StoreResult<()> {
        self.ensure_ready()?;
        self.collection.borrow_mut().view_mode = mode;
        Ok(())
    }

    pub fn toggle_view_mode(&self) -> StoreResult<ViewMode> {
        self.ensure_ready()?;
        let mut collection = self.collection.borrow_mut();
        collection.view_mode = collection.view_mode.toggled();
        Ok(collection.view_mode)
    }

    /// Open the editor on a new note (`None`) or on a held note.
    pub fn open_editor(&self, id: Option<NoteId>) -> StoreResult<()> {
        self.ensure_ready()?;
        let mut collection = self.collection.borrow_mut();
        let draft = match id {
            None => Draft::new(),
            Some(id) => {
                let note = collection
                    .notes
                    .iter()
                    .find(|note| note.id == id)
                    .ok_or(StoreError::NotFound(id))?;
                Draft::for_note(note)
            }
        };
        collection.editor = Some(draft);
        Ok(())
    }

    /// Edit a copy of the open draft and write it back.
    ///
    /// No borrow is held while `edit` runs, so it may read the store. The
    /// copy is discarded if `edit` closes the editor.
    pub fn with_draft<R>(&self, edit: impl FnOnce(&mut Draft) -> R) -> StoreResult<R> {
        let mut draft = self.draft().ok_or(StoreError::EditorClosed)?;
        let result = edit(&mut draft);
        if let Some(open) = self.collection.borrow_mut().editor.as_mut() {
            *open = draft;
        }
        Ok(result)
    }

    /// Commit the open draft; the editor closes only on success.
    pub async fn save_draft(&self) -> StoreResult<Note> {
        let draft = self.draft().ok_or(StoreError::EditorClosed)?;
        let saved = match draft.editing() {
            Some(id) => self.update(id, &draft.title, &draft.content).await?,
            None => self.create(&draft.title, &draft.content).await?,
        };

        let mut collection = self.collection.borrow_mut();
        if collection
            .editor
            .as_ref()
            .is_some_and(|open| open.editing() == draft.editing())
        {
            collection.editor = None;
        }
        Ok(saved)
    }

    pub fn close_editor(&self) {
        self.collection.borrow_mut().editor = None;
    }

    /// Tear the store down; responses still in flight are discarded.
    pub fn close(&self) {
        self.closed.set(true);
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state.get()
    }

    /// Whether any gateway call reported an unauthenticated session.
    pub fn session_expired(&self) -> bool {
        self.session_expired.get()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.collection.borrow().notes.clone()
    }

    /// Held notes matching the current search query, in collection order.
    pub fn filtered_notes(&self) -> Vec<Note> {
        let collection = self.collection.borrow();
        filter_notes(&collection.notes, &collection.query)
    }

    pub fn note(&self, id: NoteId) -> Option<Note> {
        self.collection
            .borrow()
            .notes
            .iter()
            .find(|note| note.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.collection.borrow().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.borrow().notes.is_empty()
    }

    pub fn search_query(&self) -> String {
        self.collection.borrow().query.clone()
    }

    pub fn favorites(&self) -> BTreeSet<NoteId> {
        self.collection.borrow().favorites.clone()
    }

    pub fn is_favorite(&self, id: NoteId) -> bool {
        self.collection.borrow().favorites.contains(&id)
    }

    pub fn favorite_count(&self) -> usize {
        self.collection.borrow().favorites.len()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.collection.borrow().view_mode
    }

    pub fn editor_open(&self) -> bool {
        self.collection.borrow().editor.is_some()
    }

    pub fn draft(&self) -> Option<Draft> {
        self.collection.borrow().editor.clone()
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.get() {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    fn ensure_ready(&self) -> StoreResult<()> {
        self.ensure_open()?;
        match self.load_state.get() {
            LoadState::Ready => Ok(()),
            state => Err(StoreError::NotReady(state)),
        }
    }

    fn set_load_state(&self, state: LoadState) {
        let previous = self.load_state.replace(state);
        if previous != state {
            tracing::debug!(%previous, %state, "Note store state changed");
        }
    }

    /// Drop responses for a closed store and record auth failures.
    fn settle<T>(&self, result: GatewayResult<T>, action: &'static str) -> StoreResult<T> {
        if self.closed.get() {
            tracing::warn!(action, "Discarding response received after the store was closed");
            return Err(StoreError::Closed);
        }
        result.map_err(|error| self.record_failure(error))
    }

    fn record_failure(&self, error: GatewayError) -> StoreError {
        if error.is_auth() {
            self.session_expired.set(true);
        }
        tracing::warn!("Note operation failed: {}", error);
        StoreError::Gateway(error)
    }
}

#[cfg(test)]
mod tests;
