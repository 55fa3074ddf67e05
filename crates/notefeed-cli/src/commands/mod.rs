pub mod auth_cmd;
pub mod comments;
pub mod common;
pub mod completions;
pub mod config;
pub mod create;
pub mod delete;
pub mod edit;
pub mod list;
pub mod show;
pub mod toggle;
