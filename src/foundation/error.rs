pub type FramefoldResult<T> = Result<T, FramefoldError>;

#[derive(thiserror::Error, Debug)]
pub enum FramefoldError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("presentation error: {0}")]
    Present(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramefoldError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn present(msg: impl Into<String>) -> Self {
        Self::Present(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for FramefoldError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}
