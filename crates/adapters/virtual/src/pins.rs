//! Virtual output pins.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use terrarium_app::ports::OutputPort;
use terrarium_domain::error::TerrariumError;

/// Output pins that only record their level.
#[derive(Default)]
pub struct VirtualPins {
    levels: Mutex<BTreeMap<u8, bool>>,
}

impl VirtualPins {
    /// Last level written to `pin`, `None` if it was never driven.
    #[must_use]
    pub fn level(&self, pin: u8) -> Option<bool> {
        self.lock_levels().get(&pin).copied()
    }

    #[cfg(test)]
    fn snapshot(&self) -> Vec<(u8, bool)> {
        self.lock_levels().iter().map(|(p, l)| (*p, *l)).collect()
    }

    fn lock_levels(&self) -> MutexGuard<'_, BTreeMap<u8, bool>> {
        self.levels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutputPort for VirtualPins {
    fn set_level(&self, pin: u8, high: bool) -> Result<(), TerrariumError> {
        tracing::debug!(pin, high, "virtual pin driven");
        self.lock_levels().insert(pin, high);
        Ok(())
    }
}
