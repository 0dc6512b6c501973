use std::rc::Rc;

use jotter_core::gateway::SessionGateway;
use jotter_core::session::{RedirectReason, SessionGuard};

use crate::commands::common::{open_profile, LoginRedirect};
use crate::error::CliError;
use crate::session_cookie::clear_session_cookie;

pub async fn run_login(email: &str, password: &str, profile: Option<&str>) -> Result<(), CliError> {
    let context = open_profile(profile)?;
    let session = context.gateway.login(email, password).await?;
    context.persist_cookie()?;
    if context.gateway.session_cookie().is_none() {
        tracing::warn!("Server did not issue a session cookie; later commands may be rejected");
    }

    tracing::info!("Signed in profile '{}' as {}", context.name, session.email);
    println!("Welcome back, {}!", session.first_name());
    Ok(())
}

pub async fn run_register(
    name: &str,
    email: &str,
    password: &str,
    profile: Option<&str>,
) -> Result<(), CliError> {
    let context = open_profile(profile)?;
    context.gateway.register(name, email, password).await?;
    println!("Account created for {}.", email.trim());
    println!("Run `jotter login --email {} --password <password>` to sign in.", email.trim());
    Ok(())
}

pub async fn run_logout(profile: Option<&str>) -> Result<(), CliError> {
    let context = open_profile(profile)?;
    let guard = SessionGuard::new(Rc::clone(&context.gateway), LoginRedirect);
    guard.logout().await;
    clear_session_cookie(&context.name)?;
    println!("Signed out profile '{}'", context.name);
    Ok(())
}

pub async fn run_whoami(profile: Option<&str>) -> Result<(), CliError> {
    let context = open_profile(profile)?;
    let guard = SessionGuard::new(Rc::clone(&context.gateway), LoginRedirect);
    let session = guard.ensure_session().await;
    context.persist_cookie()?;

    match session {
        Some(session) => println!("{} <{}>", session.name, session.email),
        None if guard.redirect_reason() == Some(RedirectReason::CheckFailed) => {
            return Err(CliError::ServerUnreachable);
        }
        None => println!("Profile '{}' is not signed in.", context.name),
    }
    Ok(())
}
