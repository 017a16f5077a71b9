//! Cursor sampler - polls the pointer position on a fixed period

use anyhow::{Context, Result, bail};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::providers::CursorSource;
use crate::types::Point;

/// Parse `x:123 y:456 screen:0 window:789` into a point
pub fn parse_mouse_location(out: &str) -> Result<Point> {
    let cols: Vec<&str> = out.split_whitespace().collect();
    if cols.len() < 4 {
        bail!("Unexpected output from xdotool: {:?}", out.trim());
    }

    Ok(Point::new(parse_axis(cols[0])?, parse_axis(cols[1])?))
}

/// Strip the two character `x:` / `y:` prefix and parse the rest
fn parse_axis(field: &str) -> Result<i32> {
    field
        .get(2..)
        .with_context(|| format!("Truncated xdotool field {field:?}"))?
        .parse()
        .with_context(|| format!("Invalid xdotool coordinate {field:?}"))
}

/// Spawn the sampling thread
///
/// Each tick waits `interval` then asks `source` for one sample. Failures are
/// logged and the tick is skipped. The thread exits when the receiver is
/// dropped or `shutdown` is set.
pub fn spawn_sampler(
    source: Box<dyn CursorSource>,
    interval: Duration,
    sender: Sender<Point>,
    shutdown: Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("cursor-sampler".to_string())
        .spawn(move || {
            info!(interval = ?interval, "Cursor sampler started");
            loop {
                thread::sleep(interval);
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }

                let point = match source.position() {
                    Ok(point) => point,
                    Err(e) => {
                        warn!(error = ?e, "Failed to sample cursor position");
                        continue;
                    }
                };

                if sender.send(point).is_err() {
                    debug!("Sample consumer hung up");
                    break;
                }
            }
            debug!("Cursor sampler stopped");
        })
        .context("Failed to spawn cursor sampler thread")
}
