use async_trait::async_trait;
use sentry_model::{JobId, JobSummary, Limits, OutputChunk};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;

/// Job execution API handler.
///
/// This trait abstracts the backend implementation, allowing users to:
/// - Use the provided `RegistryApiAdapter`
/// - Implement custom handlers with additional logic (auth, rate limiting, etc.)
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Start a new job.
    async fn start_job(
        &self,
        command: String,
        args: Vec<String>,
        limits: Limits,
        chroot: Option<String>,
    ) -> Result<JobId, ApiError>;

    /// Send SIGTERM and remove the job from the registry.
    async fn stop_job(&self, id: &JobId) -> Result<(), ApiError>;

    /// Send SIGKILL and remove the job from the registry.
    async fn kill_job(&self, id: &JobId) -> Result<(), ApiError>;

    /// Best-effort liveness probe (signal 0).
    async fn job_status(&self, id: &JobId) -> Result<bool, ApiError>;

    /// Snapshot of the job's concatenated stdout/stderr history.
    async fn job_logs(&self, id: &JobId) -> Result<Vec<u8>, ApiError>;

    /// Replay history into `sink`, then stream live chunks until `cancel`
    /// fires or the job exits.
    async fn stream_job_logs(
        &self,
        id: &JobId,
        cancel: CancellationToken,
        sink: mpsc::Sender<OutputChunk>,
    ) -> Result<(), ApiError>;

    /// Snapshot of every registered job.
    async fn list_jobs(&self) -> Result<Vec<JobSummary>, ApiError>;
}
