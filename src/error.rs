pub type PrevizResult<T> = Result<T, PrevizError>;

#[derive(thiserror::Error, Debug)]
pub enum PrevizError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("timeline error: {0}")]
    Timeline(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PrevizError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }
}
