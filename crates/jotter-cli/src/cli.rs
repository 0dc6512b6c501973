use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use jotter_core::ViewMode;

#[derive(Parser)]
#[command(name = "jotter")]
#[command(about = "Read and write your Jotter notes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name (API endpoint and stored session)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the session for this profile
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Create a new account
    Register {
        #[arg(long, value_name = "NAME")]
        name: String,
        #[arg(long, value_name = "EMAIL")]
        email: String,
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show who the stored session belongs to
    Whoami,
    /// List all notes
    #[command(alias = "ls")]
    List {
        /// Layout for the listing
        #[arg(long, value_enum, default_value_t = ViewArg::Grid)]
        view: ViewArg,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search notes by title or content
    Search {
        /// Search query (case-insensitive substring)
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new note
    #[command(alias = "new")]
    Add {
        #[arg(short, long)]
        title: Option<String>,
        /// Note content (read from stdin when piped)
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Edit an existing note; opens $EDITOR when no field is given
    Edit {
        /// Note ID
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID
        id: String,
    },
    /// Interactive session with search, favorites and view toggling
    Shell,
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ViewArg {
    Grid,
    List,
}

impl From<ViewArg> for ViewMode {
    fn from(value: ViewArg) -> Self {
        match value {
            ViewArg::Grid => Self::Grid,
            ViewArg::List => Self::List,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Notes API base URL (e.g. <http://localhost:8080>)
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}
