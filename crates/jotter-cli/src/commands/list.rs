use jotter_core::ViewMode;

use crate::commands::common::{open_dashboard, print_notes_json};
use crate::error::CliError;

pub async fn run_list(view: ViewMode, as_json: bool, profile: Option<&str>) -> Result<(), CliError> {
    let dashboard = open_dashboard(profile).await?;

    if as_json {
        return print_notes_json(&dashboard.store.notes());
    }

    dashboard.check(dashboard.store.set_view_mode(view))?;
    println!("{}", dashboard.header());
    println!();
    for line in dashboard.render() {
        println!("{line}");
    }
    Ok(())
}
