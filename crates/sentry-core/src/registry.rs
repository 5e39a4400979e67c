//! The thread-safe map from job id to job record, and the five lifecycle
//! operations the RPC façade calls into.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use sentry_exec::{CgroupController, spawn_job};
use sentry_model::{JobId, JobState, JobSummary, Limits, OutputChunk};
use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::broadcaster;
use crate::error::{CoreError, CoreResult};
use crate::record::JobRecord;

const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// Owns every live job. One lock guards the map itself; each job's own
/// mutable state (histories, subscribers) is guarded separately on
/// [`JobRecord`], so a slow subscriber on one job never blocks a `start`
/// or `list` call for any other job.
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Arc<JobRecord>>>,
    cgroup_root: PathBuf,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::with_cgroup_root(DEFAULT_CGROUP_ROOT)
    }

    pub fn with_cgroup_root(root: impl AsRef<Path>) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            cgroup_root: root.as_ref().to_path_buf(),
        }
    }

    /// Spawn `command`, install its cgroup limits, and register it.
    ///
    /// Transactional: any failure after spawning rolls back (kills the
    /// child, removes whatever cgroup state was created) and the registry
    /// ends up with no trace of the attempt.
    pub async fn start(
        &self,
        command: String,
        args: Vec<String>,
        limits: Limits,
        chroot: Option<String>,
    ) -> CoreResult<JobId> {
        let id = JobId::generate();

        let spawned =
            spawn_job(&command, &args, chroot.as_deref()).map_err(CoreError::SpawnFailed)?;
        let sentry_exec::SpawnedChild {
            mut child,
            stdout,
            stderr,
        } = spawned;

        let pid = child.id().expect("freshly spawned child has a pid") as i32;
        let cgroup = CgroupController::with_root(id.as_str(), &self.cgroup_root);

        if let Err(err) = cgroup.install(pid as u32, &limits) {
            if let Err(sig_err) = kill(Pid::from_raw(pid), Signal::SIGKILL) {
                warn!(job_id = %id, %sig_err, "failed to kill child after limit setup failure");
            }
            let _ = child.wait().await;
            if let Err(cleanup_err) = cgroup.remove() {
                warn!(job_id = %id, %cleanup_err, "cgroup cleanup failed after limit setup failure");
            }
            return Err(CoreError::LimitSetupFailed(err));
        }

        let record = JobRecord::new(id.clone(), command, args, limits, chroot, pid);
        broadcaster::spawn(record.clone(), child, stdout, stderr, cgroup);

        self.jobs.write().await.insert(id.clone(), record);
        info!(job_id = %id, pid, "job started");
        Ok(id)
    }

    /// Send SIGTERM. Cgroup teardown happens once, later, when the
    /// broadcaster observes both pipes reach EOF — not here — so a
    /// process that ignores SIGTERM (it can be trapped) simply keeps its
    /// cgroup until `kill` or natural exit.
    pub async fn stop(&self, id: &JobId) -> CoreResult<()> {
        self.signal_and_forget(id, Signal::SIGTERM).await
    }

    /// Send SIGKILL. Same removal semantics as [`JobRegistry::stop`].
    pub async fn kill(&self, id: &JobId) -> CoreResult<()> {
        self.signal_and_forget(id, Signal::SIGKILL).await
    }

    async fn signal_and_forget(&self, id: &JobId, signal: Signal) -> CoreResult<()> {
        let record = self
            .jobs
            .write()
            .await
            .remove(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        kill(Pid::from_raw(record.pid), signal).map_err(|source| CoreError::SignalFailed {
            job_id: id.to_string(),
            source,
        })
    }

    /// Best-effort liveness probe (signal 0).
    pub async fn status(&self, id: &JobId) -> CoreResult<bool> {
        let record = self.lookup(id).await?;
        Ok(record.is_alive())
    }

    /// Snapshot of every registered job, running or exited-but-not-removed.
    pub async fn list(&self) -> Vec<JobSummary> {
        self.jobs
            .read()
            .await
            .values()
            .map(|record| JobSummary {
                id: record.id.clone(),
                command: record.command.clone(),
                args: record.args.clone(),
                running: record.is_alive(),
                limits: record.limits.clone(),
                chroot: record.chroot.clone(),
            })
            .collect()
    }

    /// Concatenated stdout/stderr history, for the non-streaming logs
    /// convenience call.
    pub async fn logs_snapshot(&self, id: &JobId) -> CoreResult<Vec<u8>> {
        let record = self.lookup(id).await?;
        let inner = record.inner.lock().await;
        let mut combined = Vec::with_capacity(inner.stdout_history.len() + inner.stderr_history.len());
        combined.extend_from_slice(&inner.stdout_history);
        combined.extend_from_slice(&inner.stderr_history);
        Ok(combined)
    }

    /// Replay history into `sink`, then register it for live chunks until
    /// `cancel` fires or the job exits, whichever comes first.
    pub async fn stream(
        &self,
        id: &JobId,
        cancel: CancellationToken,
        sink: mpsc::Sender<OutputChunk>,
    ) -> CoreResult<()> {
        let record = self.lookup(id).await?;

        let notified = record.exited.notified();
        tokio::pin!(notified);

        let already_exited = {
            let mut inner = record.inner.lock().await;
            if !inner.stdout_history.is_empty() {
                let chunk = OutputChunk::new(Bytes::copy_from_slice(&inner.stdout_history), false);
                if sink.send(chunk).await.is_err() {
                    return Ok(());
                }
            }
            if !inner.stderr_history.is_empty() {
                let chunk = OutputChunk::new(Bytes::copy_from_slice(&inner.stderr_history), true);
                if sink.send(chunk).await.is_err() {
                    return Ok(());
                }
            }
            inner.subscribers.push(sink.clone());
            // Register as a waiter before releasing the lock: otherwise the
            // broadcaster could observe exit and call `notify_waiters()` in
            // the gap between this read and the `select!` below, and the
            // notification would be lost.
            notified.as_mut().enable();
            inner.state == JobState::Exited
        };

        if already_exited {
            detach(&record, &sink).await;
            return Ok(());
        }

        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = &mut notified => {}
        }
        detach(&record, &sink).await;
        Ok(())
    }

    /// Kill every registered job and attempt cgroup cleanup for each.
    /// Called once, from the shutdown coordinator, after which no new
    /// jobs should be started against this registry.
    pub async fn shutdown_all(&self) {
        let ids: Vec<JobId> = self.jobs.read().await.keys().cloned().collect();
        for id in ids {
            if let Err(err) = self.kill(&id).await {
                warn!(job_id = %id, %err, "failed to kill job during shutdown");
            }
        }
    }

    async fn lookup(&self, id: &JobId) -> CoreResult<Arc<JobRecord>> {
        self.jobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }
}

async fn detach(record: &JobRecord, sink: &mpsc::Sender<OutputChunk>) {
    let mut inner = record.inner.lock().await;
    inner.subscribers.retain(|s| !s.same_channel(sink));
}
