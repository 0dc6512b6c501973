use std::env;

use jotter_core::config::{normalize_base_url, API_URL_ENV, DEFAULT_API_BASE_URL};
use jotter_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_url,
            no_activate,
        } => run_config_init(global_profile, api_url, no_activate),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    api_url: Option<String>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing_url = config
        .profile(&profile_name)
        .and_then(|profile| profile.api_base_url());

    let api_base_url = resolve_api_base_url(
        normalize_text_option(api_url),
        normalize_text_option(env::var(API_URL_ENV).ok()),
        existing_url,
    )?;

    config.profile_mut_or_default(&profile_name).api_base_url = Some(api_base_url.clone());
    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );
    println!("Notes API: {api_base_url}");
    println!("Run `jotter login --email <email> --password <password>` to sign in.");
    Ok(())
}

/// Explicit flag, then environment, then the stored value, then the default.
pub fn resolve_api_base_url(
    explicit: Option<String>,
    from_env: Option<String>,
    existing: Option<String>,
) -> Result<String, CliError> {
    let raw = explicit
        .or(from_env)
        .or(existing)
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    normalize_base_url(&raw).map_err(|error| CliError::Config(error.to_string()))
}
