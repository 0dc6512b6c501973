use crate::commands::common::{normalize_search_query, open_dashboard, print_notes_json};
use crate::error::CliError;

pub async fn run_search(query: &str, as_json: bool, profile: Option<&str>) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    let dashboard = open_dashboard(profile).await?;
    dashboard.check(dashboard.store.set_search_query(normalized_query))?;

    if as_json {
        return print_notes_json(&dashboard.store.filtered_notes());
    }

    for line in dashboard.render() {
        println!("{line}");
    }
    Ok(())
}
