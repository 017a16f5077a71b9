//! SIGINT/SIGTERM handling for a graceful stop

use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Set `shutdown` on the first SIGINT/SIGTERM, exit on the second
pub fn spawn_signal_handler(shutdown: Arc<AtomicBool>) -> Result<JoinHandle<()>> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handlers")?;

    thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                if shutdown.swap(true, Ordering::SeqCst) {
                    warn!(signal = sig, "Received second signal, exiting immediately");
                    std::process::exit(1);
                }
                info!(signal = sig, "Received signal, shutting down");
            }
        })
        .context("Failed to spawn signal handler thread")
}
