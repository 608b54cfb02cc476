use crate::infrastructure::error::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const SETTINGS_JSON: &str = "settings.json";
const SUPPORTED_SCHEMA: u8 = 1;

/// User-tunable presentation settings, persisted under `config/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub schema: u8,
    pub show_weekends: bool,
    pub people_page_size: u32,
    pub exercises_page_size: u32,
    pub default_session_rows: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema: SUPPORTED_SCHEMA,
            show_weekends: true,
            people_page_size: 100,
            exercises_page_size: 50,
            default_session_rows: 3,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if self.people_page_size == 0 {
            return Err("settings.peoplePageSize must be > 0".to_string());
        }
        if self.exercises_page_size == 0 {
            return Err("settings.exercisesPageSize must be > 0".to_string());
        }
        Ok(())
    }
}

pub fn ensure_default_settings(config_dir: &Path) -> Result<(), AppError> {
    let path = config_dir.join(SETTINGS_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&Settings::default())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

pub fn load_settings(config_dir: &Path) -> Result<Settings, AppError> {
    let path = config_dir.join(SETTINGS_JSON);
    let raw = fs::read_to_string(&path)?;
    let settings: Settings = serde_json::from_str(&raw)?;
    if settings.schema != SUPPORTED_SCHEMA {
        return Err(AppError::InvalidInput(format!(
            "unsupported schema {} in {}",
            settings.schema,
            path.display()
        )));
    }
    settings.validate().map_err(AppError::InvalidInput)?;
    Ok(settings)
}

pub fn save_settings(config_dir: &Path, settings: &Settings) -> Result<(), AppError> {
    settings.validate().map_err(AppError::InvalidInput)?;
    let formatted = serde_json::to_string_pretty(settings)?;
    fs::write(config_dir.join(SETTINGS_JSON), format!("{formatted}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_DIR: AtomicUsize = AtomicUsize::new(0);

    struct TempConfigDir {
        path: PathBuf,
    }

    impl TempConfigDir {
        fn new() -> Self {
            let sequence = NEXT_TEMP_DIR.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "gymdesk-config-tests-{}-{}",
                std::process::id(),
                sequence
            ));
            fs::create_dir_all(&path).expect("create temp config dir");
            Self { path }
        }
    }

    impl Drop for TempConfigDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn defaults_are_seeded_once_and_load_back() {
        let dir = TempConfigDir::new();
        ensure_default_settings(&dir.path).expect("seed defaults");
        let settings = load_settings(&dir.path).expect("load settings");
        assert_eq!(settings, Settings::default());

        // A second ensure must not clobber user edits.
        let mut edited = settings;
        edited.show_weekends = false;
        save_settings(&dir.path, &edited).expect("save settings");
        ensure_default_settings(&dir.path).expect("idempotent ensure");
        assert_eq!(load_settings(&dir.path).expect("reload"), edited);
    }

    #[test]
    fn unsupported_schema_is_rejected() {
        let dir = TempConfigDir::new();
        fs::write(
            dir.path.join("settings.json"),
            r#"{"schema": 9, "showWeekends": true, "peoplePageSize": 10, "exercisesPageSize": 10, "defaultSessionRows": 2}"#,
        )
        .expect("write bad schema");
        assert!(load_settings(&dir.path).is_err());
    }

    #[test]
    fn zero_page_size_fails_validation() {
        let mut settings = Settings::default();
        settings.people_page_size = 0;
        assert!(settings.validate().is_err());
    }
}
