use crate::commands::common::{normalize_note_identifier, open_app, require_session};
use crate::error::CliError;

pub async fn run_delete(
    id: &str,
    global_profile: Option<&str>,
    api_url: Option<String>,
) -> Result<(), CliError> {
    let note_id = normalize_note_identifier(id)?;
    let opened = open_app(global_profile, api_url)?;
    require_session(&opened.app)?;

    opened.app.notes.delete_note(&note_id).await?;
    println!("{note_id}");
    Ok(())
}
