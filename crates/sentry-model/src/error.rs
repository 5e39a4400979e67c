use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid job id: {0}")]
    InvalidJobId(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
