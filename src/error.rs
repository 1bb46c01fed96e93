use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("secret store error: {0}")]
    SecretStore(String),
    #[error("ticketing error: {0}")]
    Ticketing(String),
    #[error("translation error: {0}")]
    Translation(String),
    #[error("malformed event: {0}")]
    Event(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
