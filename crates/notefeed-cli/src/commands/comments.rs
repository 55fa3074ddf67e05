use chrono::Utc;

use crate::commands::common::{
    format_comment_lines, normalize_note_identifier, open_app, require_session, resolve_text,
};
use crate::error::CliError;

pub async fn run_comments(
    id: &str,
    as_json: bool,
    global_profile: Option<&str>,
    api_url: Option<String>,
) -> Result<(), CliError> {
    let note_id = normalize_note_identifier(id)?;
    let opened = open_app(global_profile, api_url)?;
    let comments = opened.app.notes.fetch_comments(&note_id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&comments)?);
    } else if comments.is_empty() {
        println!("No comments on note {note_id}.");
    } else {
        for line in format_comment_lines(&comments, Utc::now()) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_comment(
    id: &str,
    text: &[String],
    global_profile: Option<&str>,
    api_url: Option<String>,
) -> Result<(), CliError> {
    let note_id = normalize_note_identifier(id)?;
    let content = resolve_text(text)?;
    let opened = open_app(global_profile, api_url)?;
    let app = &opened.app;
    require_session(app)?;

    app.notes.add_comment(&note_id, &content).await?;
    let count = app.notes.comments(&note_id).len();
    println!("Commented on note {note_id} ({count} comments)");
    Ok(())
}
