use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed job manifest: {0}")]
    Manifest(String),

    #[error("unknown event action: {0}")]
    UnknownAction(String),

    #[error("invalid repository name: {0}")]
    InvalidRepository(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ModelError {
    fn from(e: serde_yaml::Error) -> Self {
        ModelError::Manifest(e.to_string())
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
