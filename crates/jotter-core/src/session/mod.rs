//! Session guard: gates the note view behind a valid session.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::gateway::{NoteGateway, SessionGateway};
use crate::models::Session;
use crate::store::{NoteStore, StoreError};

/// Receives the signal to leave for the unauthenticated entry point.
pub trait Navigator {
    fn leave_to_entry(&self);
}

impl<N: Navigator> Navigator for Rc<N> {
    fn leave_to_entry(&self) {
        (**self).leave_to_entry();
    }
}

impl<N: Navigator> Navigator for &N {
    fn leave_to_entry(&self) {
        (**self).leave_to_entry();
    }
}

/// Why the guard left the note view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// The server reported no signed-in user
    SignedOut,
    /// The session check itself failed, e.g. the server was unreachable
    CheckFailed,
    /// An operation was rejected as unauthenticated
    Expired,
    /// The user signed out
    LoggedOut,
}

/// Result of starting the note view.
#[derive(Debug)]
pub enum Startup {
    /// Session confirmed and notes loaded
    Ready(Session),
    /// No valid session; the navigator has been told to leave
    Redirected,
    /// Session confirmed but the initial load failed for another reason
    LoadFailed(StoreError),
}

pub struct SessionGuard<G, N> {
    gateway: G,
    navigator: N,
    session: RefCell<Option<Session>>,
    redirect_reason: Cell<Option<RedirectReason>>,
}

impl<G: SessionGateway, N: Navigator> SessionGuard<G, N> {
    pub const fn new(gateway: G, navigator: N) -> Self {
        Self {
            gateway,
            navigator,
            session: RefCell::new(None),
            redirect_reason: Cell::new(None),
        }
    }

    /// Check the session once at startup.
    ///
    /// Any failure, including a network error, abandons the view; there is no
    /// retry.
    pub async fn ensure_session(&self) -> Option<Session> {
        match self.gateway.who_am_i().await {
            Ok(Some(session)) => {
                tracing::debug!(user_id = session.id, "Session confirmed");
                self.session.replace(Some(session.clone()));
                Some(session)
            }
            Ok(None) => {
                tracing::info!("No active session");
                self.session.replace(None);
                self.redirect(RedirectReason::SignedOut);
                None
            }
            Err(error) => {
                tracing::warn!("Session check failed: {}", error);
                self.session.replace(None);
                self.redirect(RedirectReason::CheckFailed);
                None
            }
        }
    }

    /// Confirm the session, then perform the store's initial load.
    pub async fn start<S: NoteGateway>(&self, store: &NoteStore<S>) -> Startup {
        let Some(session) = self.ensure_session().await else {
            return Startup::Redirected;
        };
        match store.load().await {
            Ok(_) => Startup::Ready(session),
            Err(error) if self.handle_error(&error) => Startup::Redirected,
            Err(error) => Startup::LoadFailed(error),
        }
    }

    /// Treat an auth failure from a later operation as session expiry.
    ///
    /// Returns `true` when the error caused a redirect.
    pub fn handle_error(&self, error: &StoreError) -> bool {
        if !error.is_session_expired() {
            return false;
        }
        tracing::info!("Session expired");
        self.session.replace(None);
        self.redirect(RedirectReason::Expired);
        true
    }

    /// Best-effort remote logout; local teardown always happens.
    pub async fn logout(&self) {
        if let Err(error) = self.gateway.logout().await {
            tracing::warn!("Remote logout failed: {}", error);
        } else {
            tracing::info!("Signed out");
        }
        self.session.replace(None);
        self.redirect(RedirectReason::LoggedOut);
    }

    pub fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    pub fn redirected(&self) -> bool {
        self.redirect_reason.get().is_some()
    }

    /// Cause of the first redirect, if any.
    pub fn redirect_reason(&self) -> Option<RedirectReason> {
        self.redirect_reason.get()
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Signal navigation at most once per guard.
    fn redirect(&self, reason: RedirectReason) {
        if self.redirect_reason.get().is_none() {
            self.redirect_reason.set(Some(reason));
            self.navigator.leave_to_entry();
        }
    }
}
