//! Data models for Jotter

mod note;
mod session;
mod view;

pub use note::{Note, NoteId, UNTITLED};
pub use session::Session;
pub use view::{LoadState, ViewMode};
