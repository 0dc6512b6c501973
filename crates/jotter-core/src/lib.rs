//! jotter-core - Core library for Jotter
//!
//! This crate contains the note models, the remote API gateway, and the
//! client-side note collection state shared by every Jotter front-end.

pub mod config;
pub mod draft;
pub mod error;
pub mod format;
pub mod gateway;
pub mod models;
pub mod search;
pub mod session;
pub mod store;
pub mod util;

#[cfg(test)]
mod testing;

pub use error::{GatewayError, GatewayResult};
pub use models::{LoadState, Note, NoteId, Session, ViewMode};
