//! Settings snapshot stored as a single JSON document.

use std::path::PathBuf;

use terrarium_app::ports::SettingsRepository;
use terrarium_domain::error::TerrariumError;
use terrarium_domain::settings::Settings;

use crate::error::StorageError;
use crate::fs;

/// [`SettingsRepository`] backed by one JSON file.
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsRepository for SettingsFile {
    fn load(&self) -> Result<Option<Settings>, TerrariumError> {
        let Some(raw) = fs::read_optional(&self.path)? else {
            return Ok(None);
        };
        let settings = serde_json::from_str(&raw).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(settings))
    }

    fn save(&self, settings: &Settings) -> Result<(), TerrariumError> {
        let raw = serde_json::to_vec_pretty(settings).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write_atomic(&self.path, &raw)?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
