//! Dock process control: lookup on PATH, detached launch, stop by name

use anyhow::{Context, Result, anyhow};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::{Pid, getgid, getuid};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::constants::{paths, timing};
use crate::providers::ProcessController;

/// Resolve `program` against the directories in `search_path`
pub fn find_in_path(program: &str, search_path: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

/// Resolve `program` against the current `PATH`
pub fn find_executable(program: &str) -> Option<PathBuf> {
    let search_path = std::env::var_os("PATH")?;
    find_in_path(program, &search_path)
}

fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Zombies keep their procfs entry until reaped but are already dead
fn is_zombie(proc_dir: &Path) -> bool {
    fs::read_to_string(proc_dir.join("stat"))
        .ok()
        .and_then(|stat| {
            let (_, rest) = stat.rsplit_once(')')?;
            rest.split_whitespace().next().map(|state| state == "Z")
        })
        .unwrap_or(false)
}

/// PIDs under `proc_root` owned by `uid` whose command name equals `name`
pub fn pids_by_name(proc_root: &Path, name: &str, uid: u32) -> Result<Vec<i32>> {
    let mut pids = Vec::new();
    for entry in fs::read_dir(proc_root)
        .context(format!("Failed to read {}", proc_root.display()))?
    {
        let entry = entry?;
        let Some(pid) = entry
            .file_name()
            .to_str()
            .and_then(|s| s.parse::<i32>().ok())
        else {
            continue;
        };

        let proc_dir = entry.path();
        // Processes may exit between readdir and read
        let Ok(meta) = fs::metadata(&proc_dir) else {
            continue;
        };
        if meta.uid() != uid {
            continue;
        }
        if let Ok(comm) = fs::read_to_string(proc_dir.join("comm"))
            && comm.trim_end() == name
            && !is_zombie(&proc_dir)
        {
            pids.push(pid);
        }
    }
    pids.sort_unstable();
    Ok(pids)
}

/// Controls the current user's processes through signals and procfs
pub struct SystemProcessController {
    proc_root: PathBuf,
    search_path: OsString,
    stop_timeout: Duration,
}

impl Default for SystemProcessController {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from(paths::PROC),
            search_path: std::env::var_os("PATH").unwrap_or_default(),
            stop_timeout: timing::DOCK_STOP_TIMEOUT,
        }
    }
}

impl SystemProcessController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Our own processes named `name`, excluding this daemon
    fn own_pids(&self, name: &str) -> Result<Vec<i32>> {
        let own_pid = std::process::id() as i32;
        Ok(pids_by_name(&self.proc_root, name, getuid().as_raw())?
            .into_iter()
            .filter(|&pid| pid != own_pid)
            .collect())
    }

    fn wait_for_exit(&self, name: &str) -> Result<()> {
        let deadline = Instant::now() + self.stop_timeout;
        loop {
            let remaining = self.own_pids(name)?.len();
            if remaining == 0 {
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(name = %name, remaining = remaining, "Processes still running after SIGTERM");
                return Ok(());
            }
            thread::sleep(timing::DOCK_STOP_POLL);
        }
    }
}

impl ProcessController for SystemProcessController {
    fn start(&self, program: &str) -> Result<()> {
        let path = find_in_path(program, &self.search_path)
            .ok_or_else(|| anyhow!("{program} not found in PATH"))?;

        let mut child = Command::new(&path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .uid(getuid().as_raw())
            .gid(getgid().as_raw())
            // Own process group so terminal signals aimed at us don't reach it
            .process_group(0)
            .spawn()
            .context(format!("Failed to spawn {}", path.display()))?;

        let pid = child.id();
        info!(pid = pid, path = %path.display(), "Started process");

        // Reap the child whenever it exits
        thread::Builder::new()
            .name(format!("reap-{program}"))
            .spawn(move || match child.wait() {
                Ok(status) => debug!(pid = pid, status = %status, "Child exited"),
                Err(e) => warn!(pid = pid, error = %e, "Failed to wait for child"),
            })
            .context("Failed to spawn reaper thread")?;

        Ok(())
    }

    fn stop(&self, name: &str) -> Result<()> {
        let pids = self.own_pids(name)?;
        if pids.is_empty() {
            debug!(name = %name, "No running process to stop");
            return Ok(());
        }

        for &pid in &pids {
            match kill(Pid::from_raw(pid), Signal::SIGTERM) {
                Ok(()) => info!(pid = pid, name = %name, "Sent SIGTERM"),
                // Exited, or changed owner since the scan
                Err(Errno::ESRCH) | Err(Errno::EPERM) => {
                    debug!(pid = pid, name = %name, "Process gone or not ours, skipping");
                }
                Err(e) => return Err(e).context(format!("Failed to signal {name} (pid {pid})")),
            }
        }

        self.wait_for_exit(name)
    }
}
