use std::collections::BTreeSet;
use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use jotter_core::format::{
    empty_state_headline, favorite_count_label, format_date, format_time, note_count_label,
    note_preview,
};
use jotter_core::gateway::HttpGateway;
use jotter_core::session::{Navigator, RedirectReason, SessionGuard, Startup};
use jotter_core::store::{NoteStore, StoreResult};
use jotter_core::{Note, NoteId, Session, ViewMode};
use serde::Serialize;

use crate::config_profiles::{resolve_client_config, CliProfilesConfig};
use crate::error::CliError;
use crate::session_cookie::{load_session_cookie, store_session_cookie};

const TITLE_WIDTH: usize = 28;
const LIST_PREVIEW_CHARS: usize = 48;
const GRID_PREVIEW_CHARS: usize = 72;

/// Gateway bound to a resolved profile and its stored session cookie.
pub struct ProfileContext {
    pub name: String,
    pub gateway: Rc<HttpGateway>,
}

impl ProfileContext {
    /// Mirror the gateway's current cookie into the keychain.
    pub fn persist_cookie(&self) -> Result<(), CliError> {
        store_session_cookie(&self.name, self.gateway.session_cookie().as_deref())
    }
}

pub fn open_profile(explicit_profile: Option<&str>) -> Result<ProfileContext, CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let name = config.resolve_profile_name(explicit_profile);
    let client_config = resolve_client_config(config.profile(&name))?;
    let gateway = HttpGateway::new(&client_config)?;
    gateway.set_session_cookie(load_session_cookie(&name)?);
    tracing::debug!("Using profile '{}' against {}", name, gateway.base_url());
    Ok(ProfileContext {
        name,
        gateway: Rc::new(gateway),
    })
}

/// Leaving the note view from a terminal means asking the user to sign in.
#[derive(Debug, Default)]
pub struct LoginRedirect;

impl Navigator for LoginRedirect {
    fn leave_to_entry(&self) {
        tracing::debug!("Leaving note view for sign-in");
    }
}

pub type CliGuard = SessionGuard<Rc<HttpGateway>, LoginRedirect>;
pub type CliStore = NoteStore<Rc<HttpGateway>>;

/// A signed-in, loaded note view.
pub struct Dashboard {
    pub profile: ProfileContext,
    pub guard: CliGuard,
    pub store: CliStore,
    pub session: Session,
}

pub async fn open_dashboard(explicit_profile: Option<&str>) -> Result<Dashboard, CliError> {
    let profile = open_profile(explicit_profile)?;
    let guard = SessionGuard::new(Rc::clone(&profile.gateway), LoginRedirect);
    let store = NoteStore::new(Rc::clone(&profile.gateway));

    match guard.start(&store).await {
        Startup::Ready(session) => Ok(Dashboard {
            profile,
            guard,
            store,
            session,
        }),
        Startup::Redirected => {
            profile.persist_cookie()?;
            Err(redirect_error(guard.redirect_reason()))
        }
        Startup::LoadFailed(error) => Err(error.into()),
    }
}

/// Error reported when the guard refused to open the note view.
pub const fn redirect_error(reason: Option<RedirectReason>) -> CliError {
    match reason {
        Some(RedirectReason::CheckFailed) => CliError::ServerUnreachable,
        Some(RedirectReason::Expired) => CliError::SessionExpired,
        _ => CliError::NotSignedIn,
    }
}

impl Dashboard {
    /// Route a store result through the session guard.
    pub fn check<T>(&self, result: StoreResult<T>) -> Result<T, CliError> {
        result.map_err(|error| {
            if self.guard.handle_error(&error) {
                if let Err(storage_error) = self.profile.persist_cookie() {
                    tracing::warn!("Failed to clear stored session: {}", storage_error);
                }
                CliError::SessionExpired
            } else {
                error.into()
            }
        })
    }

    pub fn header(&self) -> String {
        dashboard_header(
            &self.session,
            self.store.len(),
            self.store.favorite_count(),
        )
    }

    /// Notes matching the current query, rendered in the current layout.
    pub fn render(&self) -> Vec<String> {
        let notes = self.store.filtered_notes();
        if notes.is_empty() {
            return vec![empty_state_headline(&self.store.search_query()).to_string()];
        }
        format_note_lines(&notes, self.store.view_mode(), &self.store.favorites())
    }
}

pub fn dashboard_header(session: &Session, notes: usize, favorites: usize) -> String {
    format!(
        "Welcome back, {}! · {} · {}",
        session.first_name(),
        note_count_label(notes),
        favorite_count_label(favorites)
    )
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: i64,
    pub title: String,
    pub preview: String,
    pub content: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub date: String,
    pub time: String,
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.get(),
        title: note.display_title().to_string(),
        preview: note_preview(note, 80),
        content: note.content.clone(),
        created_at: note.created_at.map(|value| value.to_rfc3339()),
        updated_at: note.updated_at.map(|value| value.to_rfc3339()),
        date: format_date(note.updated_at),
        time: format_time(note.updated_at),
    }
}

pub fn print_notes_json(notes: &[Note]) -> Result<(), CliError> {
    let json_items = notes
        .iter()
        .map(note_to_list_item)
        .collect::<Vec<NoteListItem>>();
    println!("{}", serde_json::to_string_pretty(&json_items)?);
    Ok(())
}

pub fn format_note_lines(
    notes: &[Note],
    mode: ViewMode,
    favorites: &BTreeSet<NoteId>,
) -> Vec<String> {
    match mode {
        ViewMode::List => notes
            .iter()
            .map(|note| {
                let id = format!("#{}", note.id);
                let mark = favorite_mark(note.id, favorites);
                let title = fit(note.display_title(), TITLE_WIDTH);
                let date = format_date(note.updated_at);
                let preview = note_preview(note, LIST_PREVIEW_CHARS);
                format!("{id:>6} {mark} {title:<28}  {date:<12}  {preview}")
                    .trim_end()
                    .to_string()
            })
            .collect(),
        ViewMode::Grid => {
            let mut lines = Vec::new();
            for (index, note) in notes.iter().enumerate() {
                if index > 0 {
                    lines.push(String::new());
                }
                let mark = favorite_mark(note.id, favorites);
                lines.push(format!("#{} {mark} {}", note.id, note.display_title()));
                let preview = note_preview(note, GRID_PREVIEW_CHARS);
                if !preview.is_empty() {
                    lines.push(format!("   {preview}"));
                }
                lines.push(format!(
                    "   {} · {}",
                    format_date(note.updated_at),
                    format_time(note.updated_at)
                ));
            }
            lines
        }
    }
}

fn favorite_mark(id: NoteId, favorites: &BTreeSet<NoteId>) -> char {
    if favorites.contains(&id) {
        '★'
    } else {
        ' '
    }
}

/// Truncate to `max_chars`, marking the cut with `...`.
pub fn fit(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text
        .chars()
        .take(max_chars.saturating_sub(3))
        .collect::<String>();
    truncated.push_str("...");
    truncated
}

pub fn parse_note_id(id: &str) -> Result<NoteId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyNoteId);
    }
    trimmed
        .parse::<NoteId>()
        .map_err(|_| CliError::InvalidNoteId(trimmed.to_string()))
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    normalize_content(query).ok_or(CliError::EmptySearchQuery)
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input(initial_content: &str) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = read_and_remove(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content?))
}

/// Read a scratch file and delete it whether or not the read succeeded.
pub fn read_and_remove(path: &Path) -> io::Result<String> {
    let content = std::fs::read_to_string(path);
    if let Err(error) = std::fs::remove_file(path) {
        tracing::debug!("Failed to remove {}: {}", path.display(), error);
    }
    content
}

fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(CliError::EditorFailed("empty EDITOR command".into()));
    };

    let status = Command::new(program).args(parts).arg(file_path).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        )))
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("jotter-note-{}-{now}.md", std::process::id()))
}
