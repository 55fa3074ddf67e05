//! Error types for notefeed-core

use thiserror::Error;

use crate::auth::AuthError;
use crate::http::ApiError;
use crate::session::SessionError;

/// Result type alias using notefeed-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notefeed-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Login/registration error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Session persistence error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
