//! Dock-follows-cursor daemon - wires the sampler, cache and relocator together

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::constants::{timing, zone};
use crate::display_cache::DisplayCache;
use crate::process::SystemProcessController;
use crate::providers::{Dconf, Xdotool, Xrandr};
use crate::relocator::{DockRelocator, Relocation};
use crate::sampler::spawn_sampler;
use crate::signals::spawn_signal_handler;
use crate::types::{Display, Point};
use crate::zone::evaluate;

/// Sole consumer of cursor samples
pub struct EventLoop {
    cache: Arc<DisplayCache>,
    relocator: DockRelocator,
    band_height: i32,
    /// Local copy of the layout, replaced only when the cache has a newer one
    displays: Vec<Display>,
    last_snapshot: Option<Instant>,
}

impl EventLoop {
    pub fn new(cache: Arc<DisplayCache>, relocator: DockRelocator, band_height: i32) -> Self {
        Self {
            cache,
            relocator,
            band_height,
            displays: Vec::new(),
            last_snapshot: None,
        }
    }

    /// Process one cursor sample
    ///
    /// Returns the relocation outcome when the cursor is in a display's
    /// activation zone, `None` otherwise.
    pub fn handle_sample(&mut self, point: Point) -> Result<Option<Relocation>> {
        if let Some(snapshot) = self.cache.snapshot_if_newer(self.last_snapshot) {
            if snapshot.displays.is_empty() {
                error!("No displays found");
            }
            debug!(count = snapshot.displays.len(), "Picked up new display layout");
            self.displays = snapshot.displays;
            self.last_snapshot = Some(snapshot.changed_at);
        }

        let Some(display) = evaluate(point, &self.displays, self.band_height) else {
            return Ok(None);
        };

        let name = &display.name;
        debug!(x = point.x, y = point.y, display = %name, "Cursor in activation zone");
        self.relocator
            .relocate(display)
            .context(format!("Failed to move plank to {name}"))
            .map(Some)
    }

    /// Consume samples until every sender is gone
    pub fn run(mut self, samples: Receiver<Point>) {
        for point in samples {
            let _ = self
                .handle_sample(point)
                .inspect_err(|err| error!(error = ?err, "Relocation failed"));
        }
        info!("Sample stream closed");
    }
}

pub fn run_daemon(settings: &Settings) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let _signal_handle = spawn_signal_handler(Arc::clone(&shutdown))?;

    let cache = Arc::new(DisplayCache::new(Box::new(Xrandr)));
    // Populate once before the loop so the first sample has a layout
    if let Err(e) = cache.refresh() {
        error!(error = ?e, "Initial display query failed");
    }
    if cache.last_changed().is_none() {
        warn!("Starting without a display layout, waiting for the next refresh");
    }
    let _refresher = Arc::clone(&cache)
        .spawn_refresher(timing::DISPLAY_REFRESH_INTERVAL, Arc::clone(&shutdown))?;

    let mut relocator = DockRelocator::new(Box::new(Dconf));
    if settings.restart_dock {
        relocator = relocator.with_restart(Box::new(SystemProcessController::new()));
    }

    let (sample_tx, sample_rx) = mpsc::channel();
    let _sampler = spawn_sampler(
        Box::new(Xdotool),
        Duration::from_secs(settings.poll_interval_secs),
        sample_tx,
        Arc::clone(&shutdown),
    )?;

    info!(
        interval_secs = settings.poll_interval_secs,
        restart_dock = settings.restart_dock,
        band_height = zone::BAND_HEIGHT,
        "Daemon running"
    );

    EventLoop::new(cache, relocator, zone::BAND_HEIGHT).run(sample_rx);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::GeometrySource;
    use crate::relocator::mock::MockStore;
    use std::sync::Mutex;

    const DUAL_HEAD: &str = "\
Screen 0: minimum 8 x 8, current 3840 x 1080, maximum 32767 x 32767
HDMI-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 527mm x 296mm
eDP-1 connected 1920x1080+1920+0 (normal left inverted right x axis y axis) 344mm x 194mm
DP-1 disconnected (normal left inverted right x axis y axis)
";

    /// Geometry source whose report can be swapped mid-test
    #[derive(Clone)]
    struct SwappableSource(Arc<Mutex<String>>);

    impl GeometrySource for SwappableSource {
        fn query(&self) -> Result<String> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    fn setup(
        report: &str,
        stored: &str,
    ) -> (EventLoop, MockStore, SwappableSource, Arc<DisplayCache>) {
        let source = SwappableSource(Arc::new(Mutex::new(report.to_string())));
        let cache = Arc::new(DisplayCache::new(Box::new(source.clone())));
        cache.refresh().unwrap();
        let store = MockStore::with_value(stored);
        let relocator = DockRelocator::new(Box::new(store.clone()));
        let event_loop = EventLoop::new(Arc::clone(&cache), relocator, zone::BAND_HEIGHT);
        (event_loop, store, source, cache)
    }

    #[test]
    fn test_primary_display_writes_empty_value() {
        let (mut event_loop, store, _, _) = setup(DUAL_HEAD, "'eDP-1'");
        let outcome = event_loop.handle_sample(Point::new(960, 1060)).unwrap();
        assert_eq!(outcome, Some(Relocation::Moved));
        assert_eq!(store.last_write().as_deref(), Some("''"));
    }

    #[test]
    fn test_secondary_display_writes_quoted_name() {
        let (mut event_loop, store, _, _) = setup(DUAL_HEAD, "''");
        event_loop.handle_sample(Point::new(2880, 1060)).unwrap();
        assert_eq!(store.last_write().as_deref(), Some("'eDP-1'"));
    }

    #[test]
    fn test_mid_screen_does_nothing() {
        let (mut event_loop, store, _, _) = setup(DUAL_HEAD, "''");
        assert_eq!(event_loop.handle_sample(Point::new(960, 500)).unwrap(), None);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_repeated_samples_write_once() {
        let (mut event_loop, store, _, _) = setup(DUAL_HEAD, "''");
        for _ in 0..5 {
            event_loop.handle_sample(Point::new(2880, 1070)).unwrap();
        }
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_layout_change_is_picked_up() {
        let (mut event_loop, store, source, cache) = setup(DUAL_HEAD, "''");
        assert_eq!(event_loop.handle_sample(Point::new(2880, 1300)).unwrap(), None);

        // eDP-1 becomes a taller panel
        *source.0.lock().unwrap() = "HDMI-1 connected primary 1920x1080+0+0\n\
            eDP-1 connected 1920x1440+1920+0\n"
            .to_string();
        assert!(cache.refresh().unwrap());

        assert_eq!(
            event_loop.handle_sample(Point::new(2880, 1430)).unwrap(),
            Some(Relocation::Moved)
        );
        assert_eq!(store.last_write().as_deref(), Some("'eDP-1'"));
    }

    #[test]
    fn test_relocation_error_does_not_stop_loop() {
        let (event_loop, store, _, _) = setup(DUAL_HEAD, "''");
        *store.failing_writes.lock().unwrap() = 1;

        let (tx, rx) = mpsc::channel();
        tx.send(Point::new(2880, 1060)).unwrap();
        tx.send(Point::new(2880, 1060)).unwrap();
        drop(tx);

        // The failed first write is logged and the next sample retries it
        event_loop.run(rx);
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.last_write().as_deref(), Some("'eDP-1'"));
    }

    #[test]
    fn test_empty_cache_matches_nothing() {
        let cache = Arc::new(DisplayCache::new(Box::new(SwappableSource(Arc::new(
            Mutex::new(String::new()),
        )))));
        let store = MockStore::with_value("''");
        let mut event_loop =
            EventLoop::new(cache, DockRelocator::new(Box::new(store.clone())), zone::BAND_HEIGHT);
        assert_eq!(event_loop.handle_sample(Point::new(960, 1070)).unwrap(), None);
    }
}
