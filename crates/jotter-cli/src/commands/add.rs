use crate::commands::common::{capture_editor_input, open_dashboard, read_piped_stdin};
use crate::error::CliError;

pub async fn run_add(
    title: Option<String>,
    content: Option<String>,
    profile: Option<&str>,
) -> Result<(), CliError> {
    let content = match content {
        Some(content) => Some(content),
        None => match read_piped_stdin()? {
            Some(piped) => Some(piped),
            None if title.is_none() => capture_editor_input("")?,
            None => None,
        },
    };

    let dashboard = open_dashboard(profile).await?;
    let store = &dashboard.store;
    dashboard.check(store.open_editor(None))?;
    dashboard.check(store.with_draft(|draft| {
        draft.title = title.unwrap_or_default();
        draft.content = content.unwrap_or_default();
    }))?;

    let note = dashboard.check(store.save_draft().await)?;
    println!("{}", note.id);
    Ok(())
}
