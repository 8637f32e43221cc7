//! Single-run lock using PID files
//!
//! Keeps two CLI sync runs from writing the same store at once. The HTTP
//! surface guards its own runs in-process.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use mes_domain::{MesError, Result};

const PID_FILE_NAME: &str = "mes-sync.pid";

/// An unreadable PID file younger than this belongs to a process that is
/// still writing it.
const PID_WRITE_GRACE: Duration = Duration::from_secs(5);

/// Held for the duration of a sync run; the PID file is removed on drop.
pub struct InstanceLock {
    pid_file: PathBuf,
}

impl InstanceLock {
    /// Take the lock in `lock_dir`.
    ///
    /// The PID file is created exclusively, so two runs starting together
    /// cannot both succeed. Returns `MesError::Conflict` if a live process
    /// already holds it. A PID file left behind by a dead process is removed
    /// and creation is retried once.
    pub fn acquire<P: AsRef<Path>>(lock_dir: P) -> Result<Self> {
        let lock_dir = lock_dir.as_ref();
        fs::create_dir_all(lock_dir).map_err(|e| {
            MesError::Internal(format!("failed to create lock dir {}: {e}", lock_dir.display()))
        })?;
        let pid_file = lock_dir.join(PID_FILE_NAME);
        let current_pid = std::process::id();

        match create_pid_file(&pid_file, current_pid) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                ensure_stale(&pid_file, current_pid)?;
                if let Err(err) = fs::remove_file(&pid_file) {
                    if err.kind() != io::ErrorKind::NotFound {
                        tracing::warn!(
                            error = %err,
                            path = %pid_file.display(),
                            "instance_lock.remove_stale_pid_failed"
                        );
                    }
                }
                create_pid_file(&pid_file, current_pid).map_err(|e| {
                    if e.kind() == io::ErrorKind::AlreadyExists {
                        MesError::Conflict("a sync is already running".to_string())
                    } else {
                        MesError::Internal(format!("failed to create PID file: {e}"))
                    }
                })?;
            }
            Err(e) => return Err(MesError::Internal(format!("failed to create PID file: {e}"))),
        }

        tracing::info!(pid = current_pid, path = %pid_file.display(), "instance_lock.acquired");

        Ok(Self { pid_file })
    }

    pub fn path(&self) -> &Path {
        &self.pid_file
    }
}

fn create_pid_file(pid_file: &Path, pid: u32) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(pid_file)?;
    file.write_all(pid.to_string().as_bytes())
}

/// Fail with `Conflict` unless the existing PID file may be replaced.
fn ensure_stale(pid_file: &Path, current_pid: u32) -> Result<()> {
    match read_pid(pid_file) {
        Some(pid) if pid != current_pid && is_process_running(pid) => {
            tracing::warn!(existing_pid = pid, "instance_lock.process_active");
            Err(MesError::Conflict(format!("a sync is already running (PID: {pid})")))
        }
        Some(pid) => {
            tracing::warn!(stale_pid = pid, "instance_lock.stale_pid_file_detected");
            Ok(())
        }
        None if recently_modified(pid_file) => {
            tracing::warn!(path = %pid_file.display(), "instance_lock.pid_file_being_written");
            Err(MesError::Conflict("a sync is already running".to_string()))
        }
        None => {
            tracing::warn!(path = %pid_file.display(), "instance_lock.unreadable_pid_file");
            Ok(())
        }
    }
}

fn recently_modified(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age < PID_WRITE_GRACE)
}

fn read_pid(pid_file: &Path) -> Option<u32> {
    fs::read_to_string(pid_file).ok()?.trim().parse().ok()
}

#[cfg(target_os = "linux")]
fn is_process_running(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn is_process_running(pid: u32) -> bool {
    use std::process::Command;

    // `kill -0` probes for the process without signalling it
    Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_process_running(pid: u32) -> bool {
    tracing::warn!(pid, "instance_lock.process_check_unsupported");
    false
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.pid_file) {
            tracing::warn!(
                error = %e,
                path = %self.pid_file.display(),
                "instance_lock.remove_pid_failed"
            );
        } else {
            tracing::info!(path = %self.pid_file.display(), "instance_lock.released");
        }
    }
}
