use sentry_core::CoreError;
use thiserror::Error;
use tonic::{Code, Status};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<ApiError> for Status {
    fn from(err: ApiError) -> Self {
        let code = match &err {
            ApiError::InvalidRequest(_) => Code::InvalidArgument,
            ApiError::Core(CoreError::NotFound(_)) => Code::NotFound,
            ApiError::Core(CoreError::SpawnFailed(_)) => Code::Internal,
            ApiError::Core(CoreError::LimitSetupFailed(_)) => Code::Internal,
            ApiError::Core(CoreError::SignalFailed { .. }) => Code::Internal,
        };
        Status::new(code, err.to_string())
    }
}
