//! Shared access to the controller from the control loop and command handlers.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::controller::Controller;

/// Cloneable handle to the single [`Controller`].
///
/// Every read-modify-write sequence runs inside [`Self::with_state`] under
/// the exclusive lock. Plain getters may use [`Self::read`]. A panic inside
/// one closure poisons the lock; later callers recover the inner state
/// instead of propagating the panic to the control loop.
///
/// Snapshots bound for storage go through [`Self::persist`], which orders
/// them: no snapshot is taken while an earlier one is still being written.
pub struct SharedController<O, T> {
    inner: Arc<RwLock<Controller<O, T>>>,
    writes: Arc<Mutex<()>>,
}

impl<O, T> Clone for SharedController<O, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            writes: Arc::clone(&self.writes),
        }
    }
}

impl<O, T> SharedController<O, T> {
    #[must_use]
    pub fn new(controller: Controller<O, T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(controller)),
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Run `f` with exclusive access.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut Controller<O, T>) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Run `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&Controller<O, T>) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Change the controller and take a snapshot with exclusive access, then
    /// hand the snapshot to `save` once the controller lock is released.
    ///
    /// Writes happen in snapshot order, so storage never ends up holding an
    /// older snapshot than memory.
    ///
    /// # Errors
    ///
    /// Returns the error of `snapshot`, in which case nothing is saved, or
    /// the error of `save`.
    pub fn persist<S, E>(
        &self,
        snapshot: impl FnOnce(&mut Controller<O, T>) -> Result<S, E>,
        save: impl FnOnce(&S) -> Result<(), E>,
    ) -> Result<(), E> {
        let _writing = self.writes.lock().unwrap_or_else(PoisonError::into_inner);
        let taken = self.with_state(snapshot)?;
        save(&taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    use crate::testing::{at, controller_with};
    use terrarium_domain::device::OnPeriod;
    use terrarium_domain::settings::Settings;

    #[test]
    fn should_share_state_between_clones() {
        let (controller, _, _) = controller_with(Settings::default());
        let shared = SharedController::new(controller);
        let other = shared.clone();

        other.with_state(|c| c.switch_on("pump", OnPeriod::Endless, at(8, 0, 0)).unwrap());

        assert!(shared.read(|c| c.is_on(c.index_of("pump").unwrap())));
    }

    #[test]
    fn should_recover_after_panic_inside_closure() {
        let (controller, _, _) = controller_with(Settings::default());
        let shared = SharedController::new(controller);
        let clone = shared.clone();

        let result = std::thread::spawn(move || {
            clone.with_state(|c| {
                if !c.devices().is_empty() {
                    panic!("handler bug");
                }
            });
        })
        .join();
        assert!(result.is_err());

        let devices = shared.read(|c| c.devices().len());
        assert_eq!(devices, 10);
    }

    #[test]
    fn should_not_snapshot_while_an_earlier_snapshot_is_being_saved() {
        let (controller, _, _) = controller_with(Settings::default());
        let shared = SharedController::new(controller);
        let written = Arc::new(Mutex::new(Vec::new()));
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let first = {
            let shared = shared.clone();
            let written = Arc::clone(&written);
            std::thread::spawn(move || {
                shared.persist(
                    |c| Ok::<_, ()>(c.lifecycle_counters()),
                    |counters| {
                        entered_tx.send(()).unwrap();
                        release_rx.recv().unwrap();
                        written.lock().unwrap().push(counters[0].hours);
                        Ok(())
                    },
                )
            })
        };
        entered_rx.recv().unwrap();

        let second = {
            let shared = shared.clone();
            let written = Arc::clone(&written);
            std::thread::spawn(move || {
                shared.persist(
                    |c| c.set_lifecycle_counter("uvlight", 10).map_err(|_| ()),
                    |counters| {
                        written.lock().unwrap().push(counters[0].hours);
                        Ok(())
                    },
                )
            })
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(!second.is_finished());

        release_tx.send(()).unwrap();
        first.join().unwrap().unwrap();
        second.join().unwrap().unwrap();
        assert_eq!(*written.lock().unwrap(), vec![0, 10]);
    }

    #[test]
    fn should_skip_save_when_snapshot_fails() {
        let (controller, _, _) = controller_with(Settings::default());
        let shared = SharedController::new(controller);
        let mut saved = false;

        let result = shared.persist(
            |c| c.set_lifecycle_counter("light1", 10),
            |_| {
                saved = true;
                Ok(())
            },
        );

        assert!(result.is_err());
        assert!(!saved);
    }

    #[test]
    fn should_serialize_concurrent_writers() {
        let (controller, _, _) = controller_with(Settings::default());
        let shared = SharedController::new(controller);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        shared.with_state(|c| {
                            let name = if i % 2 == 0 { "light1" } else { "light2" };
                            let ix = c.index_of(name).unwrap();
                            if c.is_on(ix) {
                                c.switch_off(name, at(8, 0, 0)).unwrap();
                            } else {
                                c.switch_on(name, OnPeriod::Endless, at(8, 0, 0)).unwrap();
                            }
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        shared.read(|c| {
            for ix in 0..c.devices().len() {
                assert_eq!(c.is_on(ix), c.device_state(ix).on_period != OnPeriod::Off);
            }
        });
    }
}
