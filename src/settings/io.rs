use directories_next::ProjectDirs;
use std::fs;
use std::io::{self, BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "SheetRows";
const APPLICATION: &str = "sheetrows";
const CONFIG_FILE: &str = "settings.json";

pub fn get_config_path() -> io::Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION) {
        let config_dir = proj_dirs.config_dir();
        fs::create_dir_all(config_dir)?;
        Ok(config_dir.join(CONFIG_FILE))
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine project directories for app settings.",
        ))
    }
}

/// Load settings from the platform config directory, or defaults when the
/// file does not exist yet.
pub fn load_settings_from_file<T: for<'de> serde::de::Deserialize<'de> + Default>() -> io::Result<T> {
    let config_file = get_config_path()?;
    load_settings_from_path(&config_file)
}

pub fn load_settings_from_path<T: for<'de> serde::de::Deserialize<'de> + Default>(
    config_file: &Path,
) -> io::Result<T> {
    debug!("AppSettings: Attempting to load settings from {:?}", config_file);
    match fs::File::open(config_file) {
        Ok(file) => {
            let reader = BufReader::new(file);
            match serde_json::from_reader(reader) {
                Ok(settings) => {
                    debug!("AppSettings: Successfully deserialized settings.");
                    Ok(settings)
                }
                Err(e) => {
                    error!("AppSettings: Failed to parse settings file {:?}: {}", config_file, e);
                    Err(io::Error::new(
                        ErrorKind::InvalidData,
                        format!("Failed to parse settings file: {}", e),
                    ))
                }
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("AppSettings: Settings file not found at {:?}. Returning default.", config_file);
            Ok(Default::default())
        }
        Err(e) => {
            error!("AppSettings: Failed to open settings file {:?}: {}", config_file, e);
            Err(e)
        }
    }
}

pub fn save_settings_to_path<T: serde::Serialize>(settings: &T, config_file: &Path) -> io::Result<()> {
    info!("AppSettings: Saving settings to {:?}", config_file);
    let file = fs::File::create(config_file)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, settings).map_err(|e| {
        error!("AppSettings: Failed to serialize settings to {:?}: {}", config_file, e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;
    Ok(())
}

pub fn save_settings_to_file<T: serde::Serialize>(settings: &T) -> io::Result<()> {
    let config_file = get_config_path()?;
    save_settings_to_path(settings, &config_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AppSettings;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sheetrows-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = temp_file("missing");
        let _ = fs::remove_file(&path);
        let settings: AppSettings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_file("roundtrip");
        let settings = AppSettings {
            max_batch_operations: 7,
            ..Default::default()
        };
        save_settings_to_path(&settings, &path).unwrap();
        let loaded: AppSettings = load_settings_from_path(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded.max_batch_operations, 7);
    }

    #[test]
    fn test_garbage_file_is_invalid_data() {
        let path = temp_file("garbage");
        fs::write(&path, "not json").unwrap();
        let result: io::Result<AppSettings> = load_settings_from_path(&path);
        let _ = fs::remove_file(&path);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidData);
    }
}
