use std::io;

use notefeed_core::auth::AuthError;
use notefeed_core::http::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] notefeed_core::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No content provided")]
    EmptyContent,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Note title cannot be empty")]
    EmptyTitle,
    #[error("Failed to read attachment {path}: {source}")]
    Attachment { path: String, source: io::Error },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Not signed in. Run `notefeed auth login --username <name> --password <password>`.")]
    NotSignedIn,
}
