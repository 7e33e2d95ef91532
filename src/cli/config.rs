use super::CliResult;
use crate::settings::io::{get_config_path, save_settings_to_file};
use crate::settings::AppSettings;

pub fn show(settings: &AppSettings, write: bool) -> CliResult {
    let path = get_config_path()?;
    if write {
        save_settings_to_file(settings)?;
        println!("Settings written to {}", path.display());
    } else {
        println!("# {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(settings)?);
    println!("# database: {}", settings.resolved_database_path().display());
    Ok(())
}
