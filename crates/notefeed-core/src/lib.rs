//! notefeed-core - Client library for the notefeed notes service
//!
//! This crate contains the models, session handling, HTTP adapter and stores
//! shared by every notefeed front end (currently the CLI).

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod notes;
pub mod router;
pub mod session;
pub mod toast;
pub mod util;

pub use app::App;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{Note, NoteId};
