//! Storage ports: repositories for the settings snapshot and wear counters.

use std::sync::Arc;

use terrarium_domain::device::LifecycleCounter;
use terrarium_domain::error::TerrariumError;
use terrarium_domain::settings::Settings;

/// Persists the [`Settings`] snapshot.
pub trait SettingsRepository: Send + Sync {
    /// Load the persisted snapshot, `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot exists but cannot be read
    /// or parsed.
    fn load(&self) -> Result<Option<Settings>, TerrariumError>;

    /// Replace the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot cannot be written.
    fn save(&self, settings: &Settings) -> Result<(), TerrariumError>;
}

impl<T: SettingsRepository> SettingsRepository for Arc<T> {
    fn load(&self) -> Result<Option<Settings>, TerrariumError> {
        (**self).load()
    }

    fn save(&self, settings: &Settings) -> Result<(), TerrariumError> {
        (**self).save(settings)
    }
}

/// Persists remaining-life counters of wear-tracked devices.
pub trait LifecycleRepository: Send + Sync {
    /// Load all counters, empty when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the record cannot be read.
    fn load(&self) -> Result<Vec<LifecycleCounter>, TerrariumError>;

    /// Replace all counters.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the record cannot be written.
    fn save(&self, counters: &[LifecycleCounter]) -> Result<(), TerrariumError>;
}

impl<T: LifecycleRepository> LifecycleRepository for Arc<T> {
    fn load(&self) -> Result<Vec<LifecycleCounter>, TerrariumError> {
        (**self).load()
    }

    fn save(&self, counters: &[LifecycleCounter]) -> Result<(), TerrariumError> {
        (**self).save(counters)
    }
}
