//! Cached display layout shared between the refresher thread and the event loop

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::geometry::parse_displays;
use crate::providers::GeometrySource;
use crate::types::Display;

/// Copy of the cached layout handed to consumers
#[derive(Debug, Clone)]
pub struct DisplaySnapshot {
    pub displays: Vec<Display>,
    /// When the layout last changed; pass back as `since` on the next request
    pub changed_at: Instant,
}

#[derive(Debug, Default)]
struct CacheState {
    displays: Vec<Display>,
    /// Raw report the displays were parsed from
    fingerprint: Option<String>,
    last_changed: Option<Instant>,
}

/// Display layout cache guarded by a single read/write lock
pub struct DisplayCache {
    source: Box<dyn GeometrySource>,
    state: RwLock<CacheState>,
}

impl DisplayCache {
    pub fn new(source: Box<dyn GeometrySource>) -> Self {
        Self {
            source,
            state: RwLock::new(CacheState::default()),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-query the layout and commit it if the raw report changed
    ///
    /// Returns `Ok(true)` when a new layout was committed. An identical report
    /// is not re-parsed and leaves the change timestamp alone. On any error
    /// the cached state is untouched.
    pub fn refresh(&self) -> Result<bool> {
        // Fetch outside the lock
        let raw = self
            .source
            .query()
            .context("Failed to query display geometry")?;

        if self.read_state().fingerprint.as_deref() == Some(raw.as_str()) {
            debug!("Display report unchanged");
            return Ok(false);
        }

        let displays = parse_displays(&raw).context("Failed to parse display geometry")?;
        if displays.is_empty() {
            warn!("No connected displays found in geometry report");
        }

        let count = displays.len();
        let mut state = self.write_state();
        state.displays = displays;
        state.fingerprint = Some(raw);
        state.last_changed = Some(Instant::now());
        drop(state);

        info!(count = count, "Display layout changed");
        Ok(true)
    }

    /// Current layout if it changed strictly after `since`
    ///
    /// `None` for `since` means the caller has never consumed a snapshot.
    /// Returning `None` tells the caller to keep using its own copy.
    pub fn snapshot_if_newer(&self, since: Option<Instant>) -> Option<DisplaySnapshot> {
        let state = self.read_state();
        let changed_at = state.last_changed?;
        if since.is_some_and(|since| changed_at <= since) {
            return None;
        }

        Some(DisplaySnapshot {
            displays: state.displays.clone(),
            changed_at,
        })
    }

    pub fn last_changed(&self) -> Option<Instant> {
        self.read_state().last_changed
    }

    /// Spawn a background thread refreshing the cache every `interval`
    pub fn spawn_refresher(
        self: Arc<Self>,
        interval: Duration,
        shutdown: Arc<AtomicBool>,
    ) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("display-refresher".to_string())
            .spawn(move || {
                info!(interval = ?interval, "Display refresher started");
                loop {
                    thread::sleep(interval);
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Err(e) = self.refresh() {
                        error!(error = ?e, "Display refresh failed");
                    }
                }
                debug!("Display refresher stopped");
            })
            .context("Failed to spawn display refresher thread")
    }
}
