//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Activation zone constants
pub mod zone {
    /// Height in pixels of the band above a display's bottom edge that moves the dock
    pub const BAND_HEIGHT: i32 = 20;
}

/// Timer periods
pub mod timing {
    use std::time::Duration;

    /// Default cursor poll interval in seconds
    pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

    /// How often the display layout is re-queried
    pub const DISPLAY_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

    /// Upper bound on waiting for the dock to exit after SIGTERM
    pub const DOCK_STOP_TIMEOUT: Duration = Duration::from_secs(3);

    /// Poll period while waiting for the dock to exit
    pub const DOCK_STOP_POLL: Duration = Duration::from_millis(50);
}

/// External executables and their arguments
pub mod tools {
    pub const XRANDR: &str = "xrandr";
    pub const XDOTOOL: &str = "xdotool";
    pub const DCONF: &str = "dconf";

    /// Arguments for querying the cursor position
    pub const XDOTOOL_MOUSE_ARGS: &[&str] = &["getmouselocation"];

    /// Tools that must always be resolvable on PATH
    pub const REQUIRED: &[&str] = &[XRANDR, XDOTOOL, DCONF];
}

/// Plank dock constants
pub mod dock {
    /// Executable and process name of the dock
    pub const PROGRAM: &str = "plank";

    /// dconf key holding the monitor plank is shown on
    pub const MONITOR_KEY: &str = "/net/launchpad/plank/docks/dock1/monitor";

    /// Stored value meaning "follow the primary monitor"
    pub const PRIMARY_VALUE: &str = "''";
}

/// Geometry report parsing
pub mod xrandr {
    /// Marker that qualifies a report line as a connected output
    pub const CONNECTED_MARKER: &str = " connected";

    /// Token that precedes the geometry of the primary output
    pub const PRIMARY_TOKEN: &str = "primary";
}

/// Filesystem paths
pub mod paths {
    /// procfs mount used to find processes by name
    pub const PROC: &str = "/proc";
}

/// Configuration file location
pub mod config {
    pub const APP_DIR: &str = "autoplank";
    pub const FILENAME: &str = "config.json";
}

/// Config validation bounds
pub mod validation {
    pub const MIN_POLL_INTERVAL_SECS: u64 = 1;
    pub const MAX_POLL_INTERVAL_SECS: u64 = 60;
}
