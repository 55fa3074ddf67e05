use crate::cli::UpdateArgs;
use crate::commands::common::{build_draft, normalize_note_identifier, open_app, require_session};
use crate::error::CliError;

pub async fn run_update(
    id: &str,
    args: UpdateArgs,
    global_profile: Option<&str>,
    api_url: Option<String>,
) -> Result<(), CliError> {
    let note_id = normalize_note_identifier(id)?;
    let visibility = args.visibility();
    let draft = build_draft(args.fields)?;
    let opened = open_app(global_profile, api_url)?;
    let app = &opened.app;
    require_session(app)?;

    let is_public = match visibility {
        Some(is_public) => is_public,
        None => app.notes.fetch_note_by_id(&note_id).await?.is_public,
    };
    let note = app
        .notes
        .update_note(&note_id, draft.with_public(is_public))
        .await?;
    println!("{}", note.id);
    Ok(())
}
