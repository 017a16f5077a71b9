//! Moves the dock by rewriting its monitor setting

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::constants::dock;
use crate::providers::{ProcessController, SettingStore};
use crate::types::Display;

/// Outcome of a relocation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
    /// Stored value already pointed at the display
    Unchanged,
    /// New value written (and dock restarted if enabled)
    Moved,
}

/// Value stored in dconf for a display
///
/// The primary display is stored as `''` so plank follows whichever monitor
/// is primary instead of pinning it by name.
pub fn target_value(display: &Display) -> String {
    if display.primary {
        dock::PRIMARY_VALUE.to_string()
    } else {
        format!("'{}'", display.name)
    }
}

/// Canonical form of a stored value
///
/// An unset key reads back as empty output, which plank treats the same as
/// `''`.
fn normalize_stored(raw: &str) -> &str {
    match raw.trim() {
        "" => dock::PRIMARY_VALUE,
        value => value,
    }
}

pub struct DockRelocator {
    store: Box<dyn SettingStore>,
    /// Set when the dock must be restarted to pick up a new monitor
    restarter: Option<Box<dyn ProcessController>>,
    key: String,
}

impl DockRelocator {
    pub fn new(store: Box<dyn SettingStore>) -> Self {
        Self {
            store,
            restarter: None,
            key: dock::MONITOR_KEY.to_string(),
        }
    }

    /// Restart the dock through `controller` after every write
    pub fn with_restart(mut self, controller: Box<dyn ProcessController>) -> Self {
        self.restarter = Some(controller);
        self
    }

    /// Point the dock at `display`
    ///
    /// Single attempt: a read, write or restart failure is returned as is.
    /// A failed write never triggers a restart.
    pub fn relocate(&self, display: &Display) -> Result<Relocation> {
        let target = target_value(display);
        let name = &display.name;
        let stored = self
            .store
            .read(&self.key)
            .context(format!("Failed to read {}", self.key))?;

        if normalize_stored(&stored) == target {
            debug!(display = %name, value = %target, "Dock already on display");
            return Ok(Relocation::Unchanged);
        }

        self.store
            .write(&self.key, &target)
            .context(format!("Failed to write {} = {}", self.key, target))?;

        let is_primary = display.primary;
        info!(
            display = %name,
            primary = is_primary,
            from = %stored.trim(),
            to = %target,
            "Moved plank to display"
        );

        if let Some(controller) = &self.restarter {
            controller
                .stop(dock::PROGRAM)
                .context("Failed to stop plank")?;
            controller
                .start(dock::PROGRAM)
                .context("Failed to start plank")?;
            info!(program = dock::PROGRAM, "Restarted dock");
        }

        Ok(Relocation::Moved)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use anyhow::anyhow;
    use std::sync::{Arc, Mutex};

    /// In-memory dconf recording every write
    #[derive(Clone, Default)]
    pub struct MockStore {
        pub value: Arc<Mutex<String>>,
        pub writes: Arc<Mutex<Vec<(String, String)>>>,
        pub fail_read: Arc<Mutex<bool>>,
        pub fail_write: Arc<Mutex<bool>>,
        /// Writes left to fail before the store recovers
        pub failing_writes: Arc<Mutex<usize>>,
    }

    impl MockStore {
        pub fn with_value(value: &str) -> Self {
            let store = Self::default();
            *store.value.lock().unwrap() = value.to_string();
            store
        }

        pub fn write_count(&self) -> usize {
            self.writes.lock().unwrap().len()
        }

        pub fn last_write(&self) -> Option<String> {
            self.writes.lock().unwrap().last().map(|(_, v)| v.clone())
        }
    }

    impl SettingStore for MockStore {
        fn read(&self, _key: &str) -> Result<String> {
            if *self.fail_read.lock().unwrap() {
                return Err(anyhow!("dconf read failed"));
            }
            // dconf prints the value followed by a newline
            Ok(format!("{}\n", self.value.lock().unwrap()))
        }

        fn write(&self, key: &str, value: &str) -> Result<()> {
            if *self.fail_write.lock().unwrap() {
                return Err(anyhow!("dconf write failed"));
            }
            let mut failing = self.failing_writes.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(anyhow!("dconf write failed"));
            }
            drop(failing);
            *self.value.lock().unwrap() = value.to_string();
            self.writes
                .lock()
                .unwrap()
                .push((key.to_string(), value.to_string()));
            Ok(())
        }
    }

    /// Records start/stop calls
    #[derive(Clone, Default)]
    pub struct MockController {
        pub calls: Arc<Mutex<Vec<String>>>,
        pub fail_start: Arc<Mutex<bool>>,
    }

    impl ProcessController for MockController {
        fn start(&self, program: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("start {program}"));
            if *self.fail_start.lock().unwrap() {
                return Err(anyhow!("{program} not found"));
            }
            Ok(())
        }

        fn stop(&self, name: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("stop {name}"));
            Ok(())
        }
    }
}
