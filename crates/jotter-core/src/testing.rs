//! In-memory gateway double shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Notify;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{NoteGateway, NotePayload, SessionGateway};
use crate::models::{Note, NoteId, Session};

pub fn note(id: i64, title: &str, content: &str) -> Note {
    Note {
        id: NoteId::new(id),
        title: title.to_string(),
        content: content.to_string(),
        created_at: Some(epoch()),
        updated_at: Some(epoch()),
    }
}

pub fn session() -> Session {
    Session {
        id: 7,
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
    }
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(NotePayload),
    Update(NoteId, NotePayload),
    Delete(NoteId),
    WhoAmI,
    Login(String),
    Register(String),
    Logout,
}

/// Behaves like a tiny remote store: ids are assigned server-side, updates
/// refresh `updated_at`, and deletes of unknown ids answer `NotFound`.
///
/// Failures queued with `fail_next` are returned by the next call of any kind.
/// `hold_next` parks the next call until the returned `Notify` fires; the
/// response is computed after release.
#[derive(Default)]
pub struct ScriptedGateway {
    remote: RefCell<Vec<Note>>,
    session: RefCell<Option<Session>>,
    next_id: Cell<i64>,
    clock: Cell<i64>,
    failures: RefCell<VecDeque<GatewayError>>,
    gate: RefCell<Option<Rc<Notify>>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedGateway {
    pub fn with_notes(notes: Vec<Note>) -> Rc<Self> {
        let next_id = notes.iter().map(|note| note.id.get()).max().unwrap_or(0) + 1;
        let gateway = Self {
            remote: RefCell::new(notes),
            session: RefCell::new(Some(session())),
            next_id: Cell::new(next_id),
            ..Self::default()
        };
        Rc::new(gateway)
    }

    pub fn signed_out() -> Rc<Self> {
        let gateway = Self::with_notes(Vec::new());
        gateway.session.replace(None);
        gateway
    }

    pub fn fail_next(&self, error: GatewayError) {
        self.failures.borrow_mut().push_back(error);
    }

    pub fn hold_next(&self) -> Rc<Notify> {
        let notify = Rc::new(Notify::new());
        self.gate.replace(Some(Rc::clone(&notify)));
        notify
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn remote_notes(&self) -> Vec<Note> {
        self.remote.borrow().clone()
    }

    /// Change the remote copy without going through the gateway
    pub fn remote_delete(&self, id: NoteId) {
        self.remote.borrow_mut().retain(|note| note.id != id);
    }

    async fn enter(&self, call: Call) -> GatewayResult<()> {
        self.calls.borrow_mut().push(call);
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let failure = self.failures.borrow_mut().pop_front();
        failure.map_or(Ok(()), Err)
    }

    fn tick(&self) -> DateTime<Utc> {
        let step = self.clock.get() + 1;
        self.clock.set(step);
        epoch() + Duration::seconds(step)
    }
}

impl NoteGateway for ScriptedGateway {
    async fn list_notes(&self) -> GatewayResult<Vec<Note>> {
        self.enter(Call::List).await?;
        Ok(self.remote_notes())
    }

    async fn create_note(&self, payload: &NotePayload) -> GatewayResult<Note> {
        self.enter(Call::Create(payload.clone())).await?;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let now = self.tick();
        let created = Note {
            id: NoteId::new(id),
            title: payload.title.clone(),
            content: payload.content.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.remote.borrow_mut().insert(0, created.clone());
        Ok(created)
    }

    async fn update_note(&self, id: NoteId, payload: &NotePayload) -> GatewayResult<Note> {
        self.enter(Call::Update(id, payload.clone())).await?;
        let now = self.tick();
        let mut remote = self.remote.borrow_mut();
        let existing = remote
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or_else(|| GatewayError::NotFound("Note not found".to_string()))?;
        existing.title.clone_from(&payload.title);
        existing.content.clone_from(&payload.content);
        existing.updated_at = Some(now);
        Ok(existing.clone())
    }

    async fn delete_note(&self, id: NoteId) -> GatewayResult<()> {
        self.enter(Call::Delete(id)).await?;
        let mut remote = self.remote.borrow_mut();
        let before = remote.len();
        remote.retain(|note| note.id != id);
        if remote.len() == before {
            return Err(GatewayError::NotFound("Note not found".to_string()));
        }
        Ok(())
    }
}

impl SessionGateway for ScriptedGateway {
    async fn who_am_i(&self) -> GatewayResult<Option<Session>> {
        self.enter(Call::WhoAmI).await?;
        Ok(self.session.borrow().clone())
    }

    async fn login(&self, email: &str, _password: &str) -> GatewayResult<Session> {
        self.enter(Call::Login(email.to_string())).await?;
        let signed_in = session();
        self.session.replace(Some(signed_in.clone()));
        Ok(signed_in)
    }

    async fn register(&self, _name: &str, email: &str, _password: &str) -> GatewayResult<()> {
        self.enter(Call::Register(email.to_string())).await
    }

    async fn logout(&self) -> GatewayResult<()> {
        let result = self.enter(Call::Logout).await;
        self.session.replace(None);
        result
    }
}
