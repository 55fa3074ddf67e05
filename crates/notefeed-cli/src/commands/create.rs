use crate::cli::NoteArgs;
use crate::commands::common::{build_draft, open_app, require_session};
use crate::error::CliError;

pub async fn run_create(
    args: NoteArgs,
    global_profile: Option<&str>,
    api_url: Option<String>,
) -> Result<(), CliError> {
    let draft = build_draft(args.fields)?.with_public(args.public);
    let opened = open_app(global_profile, api_url)?;
    let app = &opened.app;
    require_session(app)?;

    let title = draft.title.clone();
    app.notes.create_note(draft).await?;

    // the store reloads "my notes" after a create
    let created = app
        .notes
        .notes()
        .into_iter()
        .find(|note| note.title == title);
    match created {
        Some(note) => println!("{}", note.id),
        None => println!("Created note '{title}'"),
    }
    Ok(())
}
