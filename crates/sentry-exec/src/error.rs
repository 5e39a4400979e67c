use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn command: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("failed to set up resource limits for job {job_id}: {source}")]
    LimitSetupFailed {
        job_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to clean up cgroup for job {job_id}: {source}")]
    CgroupCleanupFailed {
        job_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExecResult<T> = Result<T, ExecError>;
