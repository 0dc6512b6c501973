//! Jotter CLI - your notes from the terminal.
//!
//! Talks to the Jotter notes API with the session stored for the active
//! profile.

mod cli;
mod commands;
mod config_profiles;
mod error;
mod session_cookie;


use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::{run_login, run_logout, run_register, run_whoami};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::search::run_search;
use crate::commands::shell::run_shell;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        if error.needs_login() {
            eprintln!("Run `jotter login --email <email> --password <password>` to sign in.");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Login { email, password } => run_login(&email, &password, profile).await?,
        Commands::Register {
            name,
            email,
            password,
        } => run_register(&name, &email, &password, profile).await?,
        Commands::Logout => run_logout(profile).await?,
        Commands::Whoami => run_whoami(profile).await?,
        Commands::List { view, json } => run_list(view.into(), json, profile).await?,
        Commands::Search { query, json } => run_search(&query, json, profile).await?,
        Commands::Add { title, content } => run_add(title, content, profile).await?,
        Commands::Edit { id, title, content } => run_edit(&id, title, content, profile).await?,
        Commands::Delete { id } => run_delete(&id, profile).await?,
        Commands::Shell => run_shell(profile).await?,
        Commands::Config { command } => run_config(command, profile)?,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}

fn init_tracing() -> Result<(), CliError> {
    let directive = "jotter=info"
        .parse::<Directive>()
        .map_err(|error| CliError::Config(error.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
