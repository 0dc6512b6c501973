use crate::commands::common::{capture_editor_input, open_dashboard, parse_note_id};
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    title: Option<String>,
    content: Option<String>,
    profile: Option<&str>,
) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let dashboard = open_dashboard(profile).await?;
    let store = &dashboard.store;
    dashboard.check(store.open_editor(Some(note_id)))?;

    let content = if title.is_none() && content.is_none() {
        let current = dashboard.check(store.with_draft(|draft| draft.content.clone()))?;
        capture_editor_input(&current)?
    } else {
        content
    };

    let unchanged = dashboard.check(store.with_draft(|draft| {
        let before = (draft.title.clone(), draft.content.clone());
        if let Some(title) = title {
            draft.title = title;
        }
        if let Some(content) = content {
            draft.content = content;
        }
        before == (draft.title.clone(), draft.content.clone())
    }))?;

    if unchanged {
        store.close_editor();
        println!("{note_id}");
        return Ok(());
    }

    let updated = dashboard.check(store.save_draft().await)?;
    println!("{}", updated.id);
    Ok(())
}
