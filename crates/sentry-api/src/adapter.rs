use std::sync::Arc;

use async_trait::async_trait;
use sentry_core::JobRegistry;
use sentry_model::{JobId, JobSummary, Limits, OutputChunk};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::handler::ApiHandler;

/// Adapter that bridges [`JobRegistry`] to [`ApiHandler`].
///
/// This is a ready-to-use implementation that directly delegates to the
/// registry; `sentry-server` wires it into the generated tonic service.
pub struct RegistryApiAdapter {
    registry: Arc<JobRegistry>,
}

impl RegistryApiAdapter {
    /// Create a new adapter wrapping the given registry.
    pub fn new(registry: Arc<JobRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl ApiHandler for RegistryApiAdapter {
    async fn start_job(
        &self,
        command: String,
        args: Vec<String>,
        limits: Limits,
        chroot: Option<String>,
    ) -> Result<JobId, ApiError> {
        self.registry
            .start(command, args, limits, chroot)
            .await
            .map_err(ApiError::from)
    }

    async fn stop_job(&self, id: &JobId) -> Result<(), ApiError> {
        self.registry.stop(id).await.map_err(ApiError::from)
    }

    async fn kill_job(&self, id: &JobId) -> Result<(), ApiError> {
        self.registry.kill(id).await.map_err(ApiError::from)
    }

    async fn job_status(&self, id: &JobId) -> Result<bool, ApiError> {
        self.registry.status(id).await.map_err(ApiError::from)
    }

    async fn job_logs(&self, id: &JobId) -> Result<Vec<u8>, ApiError> {
        self.registry.logs_snapshot(id).await.map_err(ApiError::from)
    }

    async fn stream_job_logs(
        &self,
        id: &JobId,
        cancel: CancellationToken,
        sink: mpsc::Sender<OutputChunk>,
    ) -> Result<(), ApiError> {
        self.registry
            .stream(id, cancel, sink)
            .await
            .map_err(ApiError::from)
    }

    async fn list_jobs(&self) -> Result<Vec<JobSummary>, ApiError> {
        Ok(self.registry.list().await)
    }
}
