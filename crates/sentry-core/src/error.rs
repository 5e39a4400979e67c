use sentry_exec::ExecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("job not found: {0}")]
    NotFound(String),

    #[error("failed to spawn job: {0}")]
    SpawnFailed(#[source] ExecError),

    #[error("failed to install resource limits: {0}")]
    LimitSetupFailed(#[source] ExecError),

    #[error("failed to signal job {job_id}: {source}")]
    SignalFailed {
        job_id: String,
        #[source]
        source: nix::Error,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;
