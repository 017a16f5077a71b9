//! External data providers
//!
//! The daemon never talks to X11 or dconf directly. Each concern sits behind a
//! small trait so the decision logic can be driven by mocks in tests, and the
//! production implementations shell out to the usual command line tools.

use anyhow::{Context, Result, bail};
use std::process::Command;
use tracing::debug;

use crate::constants::tools;
use crate::sampler::parse_mouse_location;
use crate::types::Point;

/// Source of the current cursor position
pub trait CursorSource: Send {
    fn position(&self) -> Result<Point>;
}

/// Source of the raw display layout report
pub trait GeometrySource: Send + Sync {
    fn query(&self) -> Result<String>;
}

/// Persisted key/value settings (dconf)
pub trait SettingStore: Send {
    fn read(&self, key: &str) -> Result<String>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Start and stop processes by name
pub trait ProcessController: Send {
    fn start(&self, program: &str) -> Result<()>;
    fn stop(&self, name: &str) -> Result<()>;
}

/// Run a command to completion and return its stdout
///
/// A non-zero exit status is an error carrying the command's stderr.
#[tracing::instrument(level = "trace")]
pub fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .context(format!("Failed to execute {program}"))?;

    if !output.status.success() {
        bail!(
            "{program} {} exited with {}: {}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let stdout = String::from_utf8(output.stdout)
        .context(format!("{program} produced non UTF-8 output"))?;
    debug!(program = %program, bytes = stdout.len(), "Command completed");
    Ok(stdout)
}

/// Cursor position via `xdotool getmouselocation`
#[derive(Debug, Default)]
pub struct Xdotool;

impl CursorSource for Xdotool {
    fn position(&self) -> Result<Point> {
        let out = run_command(tools::XDOTOOL, tools::XDOTOOL_MOUSE_ARGS)?;
        parse_mouse_location(&out)
    }
}

/// Display layout via `xrandr`
#[derive(Debug, Default)]
pub struct Xrandr;

impl GeometrySource for Xrandr {
    fn query(&self) -> Result<String> {
        run_command(tools::XRANDR, &[])
    }
}

/// Settings via `dconf read` / `dconf write`
#[derive(Debug, Default)]
pub struct Dconf;

impl SettingStore for Dconf {
    fn read(&self, key: &str) -> Result<String> {
        run_command(tools::DCONF, &["read", key])
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        run_command(tools::DCONF, &["write", key, value]).map(|_| ())
    }
}
