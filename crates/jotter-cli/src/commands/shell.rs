//! Interactive note session.
//!
//! Favorites, search and view mode live in the store for as long as the
//! shell runs and are never written anywhere.

use std::io::{self, BufRead, Write};

use jotter_core::format::note_count_label;
use jotter_core::store::StoreError;
use jotter_core::{LoadState, Note, NoteId, ViewMode};

use crate::commands::common::{format_note_lines, open_dashboard, parse_note_id, Dashboard};
use crate::error::CliError;
use crate::session_cookie::clear_session_cookie;

const HELP: &str = "\
Commands:
  ls                          show notes (current search and view)
  search <query>              filter by title or content
  clear                       clear the search
  new <title> | <content>     create a note
  edit <id> <title> | <content>
                              change a note (omit `| ...` to keep the content)
  rm <id>                     delete a note
  fav <id>                    toggle a favorite
  favs                        show favorites
  view [grid|list]            switch layout (toggles without an argument)
  reload                      fetch notes again
  whoami                      show the signed-in user
  logout                      sign out and leave
  help                        show this help
  quit                        leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Search(String),
    ClearSearch,
    New {
        title: String,
        content: String,
    },
    Edit {
        id: NoteId,
        title: String,
        content: Option<String>,
    },
    Remove(NoteId),
    Favorite(NoteId),
    Favorites,
    View(Option<ViewMode>),
    Reload,
    WhoAmI,
    Logout,
    Help,
    Quit,
}

enum ShellFlow {
    Continue,
    Exit,
}

/// Parse one input line; blank lines yield `None`.
pub fn parse_shell_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_ascii_lowercase().as_str() {
        "ls" | "list" => ShellCommand::List,
        "search" | "find" => ShellCommand::Search(rest.to_string()),
        "clear" => ShellCommand::ClearSearch,
        "new" | "add" => {
            let (title, content) = split_title_content(rest);
            ShellCommand::New {
                title,
                content: content.unwrap_or_default(),
            }
        }
        "edit" => {
            let (id, fields) = rest
                .split_once(char::is_whitespace)
                .map_or((rest, ""), |(id, fields)| (id, fields.trim()));
            if fields.is_empty() {
                return Err("usage: edit <id> <title> | <content>".to_string());
            }
            let (title, content) = split_title_content(fields);
            ShellCommand::Edit {
                id: shell_note_id(id)?,
                title,
                content,
            }
        }
        "rm" | "delete" => ShellCommand::Remove(shell_note_id(rest)?),
        "fav" | "star" => ShellCommand::Favorite(shell_note_id(rest)?),
        "favs" | "favorites" => ShellCommand::Favorites,
        "view" => {
            if rest.is_empty() {
                ShellCommand::View(None)
            } else {
                ShellCommand::View(Some(rest.parse::<ViewMode>()?))
            }
        }
        "reload" => ShellCommand::Reload,
        "whoami" => ShellCommand::WhoAmI,
        "logout" => ShellCommand::Logout,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}' (try `help`)")),
    };
    Ok(Some(command))
}

fn split_title_content(input: &str) -> (String, Option<String>) {
    match input.split_once('|') {
        Some((title, content)) => (title.trim().to_string(), Some(content.trim().to_string())),
        None => (input.trim().to_string(), None),
    }
}

fn shell_note_id(raw: &str) -> Result<NoteId, String> {
    parse_note_id(raw).map_err(|error| error.to_string())
}

pub async fn run_shell(profile: Option<&str>) -> Result<(), CliError> {
    let dashboard = open_dashboard(profile).await?;
    println!("{}", dashboard.header());
    println!("Type `help` for commands.");

    let result = shell_loop(&dashboard).await;
    dashboard.store.close();
    result
}

async fn shell_loop(dashboard: &Dashboard) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("jotter> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }

        let command = match parse_shell_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match execute(dashboard, command).await {
            Ok(ShellFlow::Continue) => {}
            Ok(ShellFlow::Exit) => return Ok(()),
            Err(error) if ends_shell(&error, dashboard.store.load_state()) => return Err(error),
            Err(error) => eprintln!("Error: {error}"),
        }
    }
}

/// A lost session or a failed store cannot be recovered from inside the shell.
pub fn ends_shell(error: &CliError, load_state: LoadState) -> bool {
    error.needs_login() || load_state == LoadState::Failed
}

async fn execute(dashboard: &Dashboard, command: ShellCommand) -> Result<ShellFlow, CliError> {
    let store = &dashboard.store;
    match command {
        ShellCommand::List => print_lines(&dashboard.render()),
        ShellCommand::Search(query) => {
            dashboard.check(store.set_search_query(query))?;
            print_lines(&dashboard.render());
        }
        ShellCommand::ClearSearch => {
            dashboard.check(store.set_search_query(String::new()))?;
            print_lines(&dashboard.render());
        }
        ShellCommand::New { title, content } => {
            dashboard.check(store.open_editor(None))?;
            dashboard.check(store.with_draft(|draft| {
                draft.title = title;
                draft.content = content;
            }))?;
            let note = save_or_discard(dashboard).await?;
            println!("Created #{} {}", note.id, note.display_title());
        }
        ShellCommand::Edit { id, title, content } => {
            dashboard.check(store.open_editor(Some(id)))?;
            dashboard.check(store.with_draft(|draft| {
                draft.title = title;
                if let Some(content) = content {
                    draft.content = content;
                }
            }))?;
            let note = save_or_discard(dashboard).await?;
            println!("Updated #{} {}", note.id, note.display_title());
        }
        ShellCommand::Remove(id) => {
            dashboard.check(store.remove(id).await)?;
            println!("Deleted #{id}");
        }
        ShellCommand::Favorite(id) => {
            if store.note(id).is_none() {
                return Err(StoreError::NotFound(id).into());
            }
            if dashboard.check(store.toggle_favorite(id))? {
                println!("★ #{id} added to favorites");
            } else {
                println!("#{id} removed from favorites");
            }
        }
        ShellCommand::Favorites => {
            let favorites = store.favorites();
            let notes = store
                .notes()
                .into_iter()
                .filter(|note| favorites.contains(&note.id))
                .collect::<Vec<Note>>();
            if notes.is_empty() {
                println!("No favorites yet. Use `fav <id>` to add one.");
            } else {
                print_lines(&format_note_lines(&notes, store.view_mode(), &favorites));
            }
        }
        ShellCommand::View(mode) => {
            let mode = match mode {
                Some(mode) => {
                    dashboard.check(store.set_view_mode(mode))?;
                    mode
                }
                None => dashboard.check(store.toggle_view_mode())?,
            };
            println!("View: {mode}");
        }
        ShellCommand::Reload => {
            let count = dashboard.check(store.load().await)?;
            println!("Loaded {}", note_count_label(count));
        }
        ShellCommand::WhoAmI => {
            let session = dashboard.guard.session().unwrap_or_else(|| dashboard.session.clone());
            println!("{} <{}>", session.name, session.email);
        }
        ShellCommand::Logout => {
            dashboard.guard.logout().await;
            clear_session_cookie(&dashboard.profile.name)?;
            println!("Signed out profile '{}'", dashboard.profile.name);
            return Ok(ShellFlow::Exit);
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => return Ok(ShellFlow::Exit),
    }
    Ok(ShellFlow::Continue)
}

/// One-shot editor: a failed save does not leave a stale draft behind.
async fn save_or_discard(dashboard: &Dashboard) -> Result<Note, CliError> {
    let result = dashboard.store.save_draft().await;
    if result.is_err() {
        dashboard.store.close_editor();
    }
    dashboard.check(result)
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
