//! Startup check for the external tools the daemon shells out to

use tracing::error;

use crate::constants::{dock, tools};
use crate::process::find_executable;

/// Tools that must be on PATH for the given settings
pub fn required_tools(restart_dock: bool) -> Vec<&'static str> {
    let mut required = tools::REQUIRED.to_vec();
    if restart_dock {
        required.push(dock::PROGRAM);
    }
    required
}

/// Subset of `required` that cannot be resolved with `lookup`
pub fn missing_tools<'a>(
    required: &[&'a str],
    lookup: impl Fn(&str) -> bool,
) -> Vec<&'a str> {
    required.iter().copied().filter(|tool| !lookup(*tool)).collect()
}

/// Report every missing tool; returns false if any is absent
pub fn validate(restart_dock: bool) -> bool {
    let missing = missing_tools(&required_tools(restart_dock), |tool| {
        find_executable(tool).is_some()
    });
    for tool in &missing {
        eprintln!("{tool} not found in PATH");
        error!(tool = %tool, "Required tool not found in PATH");
    }
    missing.is_empty()
}
