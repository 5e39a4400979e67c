//! cgroup v2 resource control for a single job (Linux-only).
//!
//! Each job gets its own cgroup directory under `/sys/fs/cgroup`. Unlike a
//! `pre_exec`-based approach where the child places itself into the cgroup
//! before exec, the controller here writes the *parent's* observed PID into
//! `cgroup.procs` after the child has already been spawned — this is what
//! lets `spawn` and `install` stay two separate, independently-fallible
//! steps (spawn can succeed while limit setup fails, and the caller decides
//! whether that's fatal).
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

use sentry_model::Limits;
use tracing::debug;

use crate::error::{ExecError, ExecResult};

const CGROUP_ROOT: &str = "/sys/fs/cgroup";
const CGROUP_PREFIX: &str = "sentry-run";

/// Owns the lifecycle of one job's cgroup directory.
pub struct CgroupController {
    job_id: String,
    path: PathBuf,
}

impl CgroupController {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self::with_root(job_id, CGROUP_ROOT)
    }

    /// Same as [`CgroupController::new`], but rooted somewhere other than
    /// `/sys/fs/cgroup` — used by tests and by deployments that bind-mount
    /// the cgroup hierarchy elsewhere.
    pub fn with_root(job_id: impl Into<String>, root: impl AsRef<std::path::Path>) -> Self {
        let job_id = job_id.into();
        let path = root.as_ref().join(format!("{CGROUP_PREFIX}-{job_id}"));
        Self { job_id, path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Create the cgroup, add `pid` to it, and write whichever limits are set.
    ///
    /// Write order matters: `cgroup.procs` first (a cgroup with limits but
    /// no member process is harmless; a process that never got added is
    /// not limited at all), then `cpu.max`, then `memory.max`, then `io.max`.
    pub fn install(&self, pid: u32, limits: &Limits) -> ExecResult<()> {
        self.create_dir()?;
        self.add_pid(pid)?;

        if let Some(cpu_max) = &limits.cpu_max {
            self.write_controller_file("cpu.max", cpu_max)?;
        }
        if let Some(memory_max) = &limits.memory_max {
            self.write_controller_file("memory.max", memory_max)?;
        }
        if limits.has_io_limit() {
            let content = self.render_io_max(limits)?;
            self.write_controller_file("io.max", &content)?;
        }

        debug!(job_id = %self.job_id, pid, path = %self.path.display(), "installed cgroup limits");
        Ok(())
    }

    /// Remove the cgroup directory. Only valid once no process remains in it.
    pub fn remove(&self) -> ExecResult<()> {
        match fs::remove_dir(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ExecError::CgroupCleanupFailed {
                job_id: self.job_id.clone(),
                source,
            }),
        }
    }

    fn create_dir(&self) -> ExecResult<()> {
        fs::create_dir_all(&self.path).map_err(|source| ExecError::LimitSetupFailed {
            job_id: self.job_id.clone(),
            source,
        })
    }

    fn add_pid(&self, pid: u32) -> ExecResult<()> {
        self.write_controller_file("cgroup.procs", &pid.to_string())
    }

    fn write_controller_file(&self, name: &str, content: &str) -> ExecResult<()> {
        fs::write(self.path.join(name), content).map_err(|source| ExecError::LimitSetupFailed {
            job_id: self.job_id.clone(),
            source,
        })
    }

    /// `io.max` takes a `MAJ:MIN` device target; the minor number is pinned
    /// to zero since cgroup v2 I/O limits only apply at whole-device
    /// granularity. The device is derived from the root filesystem, since
    /// the job's actual mount is not known to the cgroup layer.
    fn render_io_max(&self, limits: &Limits) -> ExecResult<String> {
        let meta = fs::metadata("/").map_err(|source| ExecError::LimitSetupFailed {
            job_id: self.job_id.clone(),
            source,
        })?;
        let major = (meta.dev() >> 8) & 0xfff;
        let minor = 0u64;

        let mut line = format!("{major}:{minor}");
        if let Some(wbps) = &limits.write_bps {
            line.push_str(&format!(" wbps={wbps}"));
        }
        if let Some(rbps) = &limits.read_bps {
            line.push_str(&format!(" rbps={rbps}"));
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_namespaced_by_job_id() {
        let ctl = CgroupController::new("abc123");
        assert_eq!(
            ctl.path(),
            std::path::Path::new("/sys/fs/cgroup/sentry-run-abc123")
        );
    }

    #[test]
    fn render_io_max_includes_only_set_fields() {
        let ctl = CgroupController::new("job-1");
        let mut limits = Limits::default();
        limits.write_bps = Some("1048576".into());
        let line = ctl.render_io_max(&limits).expect("root fs must stat");
        assert!(line.contains("wbps=1048576"));
        assert!(!line.contains("rbps="));
    }
}
