//! Notefeed CLI - Command-line client for the notefeed notes service
//!
//! Browse the feed, react to notes and write your own from the terminal.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use notefeed_core::notes::NoteView;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::comments::{run_comment, run_comments};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::create::run_create;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_update;
use crate::commands::list::run_list;
use crate::commands::show::run_show;
use crate::commands::toggle::{run_toggle, Toggle};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive = "notefeed=info"
        .parse()
        .map_err(|error| CliError::Config(format!("invalid log filter: {error}")))?;
    let filter = EnvFilter::from_default_env().add_directive(directive);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();
    let api_url = cli.api_url;

    match cli.command {
        Commands::Config { command } => run_config(command, profile)?,
        Commands::Auth { command } => run_auth(command, profile, api_url).await?,
        Commands::Feed(args) => run_list(NoteView::Feed, args, profile, api_url).await?,
        Commands::Mine(args) => run_list(NoteView::Mine, args, profile, api_url).await?,
        Commands::Favorites(args) => {
            run_list(NoteView::Favorites, args, profile, api_url).await?;
        }
        Commands::Show { id, json } => run_show(&id, json, profile, api_url).await?,
        Commands::Like { id } => run_toggle(Toggle::Like, &id, profile, api_url).await?,
        Commands::Favorite { id } => {
            run_toggle(Toggle::Favorite, &id, profile, api_url).await?;
        }
        Commands::Comments { id, json } => run_comments(&id, json, profile, api_url).await?,
        Commands::Comment { id, text } => run_comment(&id, &text, profile, api_url).await?,
        Commands::Create(note) => run_create(note, profile, api_url).await?,
        Commands::Update { id, note } => run_update(&id, note, profile, api_url).await?,
        Commands::Delete { id } => run_delete(&id, profile, api_url).await?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
