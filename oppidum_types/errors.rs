mod app_error;
mod game_error;
mod storage_error;

use thiserror::Error;

pub use app_error::AppError;
pub use game_error::GameError;
pub use storage_error::StorageError;

/// Top-level error wrapper crossing component boundaries.
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for ApplicationError {
    fn from(err: anyhow::Error) -> Self {
        ApplicationError::Unknown(err.to_string())
    }
}

pub type Result<T, E = ApplicationError> = std::result::Result<T, E>;
