use crate::commands::common::{open_dashboard, parse_note_id};
use crate::error::CliError;

pub async fn run_delete(id: &str, profile: Option<&str>) -> Result<(), CliError> {
    let note_id = parse_note_id(id)?;
    let dashboard = open_dashboard(profile).await?;
    dashboard.check(dashboard.store.remove(note_id).await)?;
    println!("{note_id}");
    Ok(())
}
