use notefeed_core::notes::NoteView;

use crate::cli::ListArgs;
use crate::commands::common::{
    format_note_lines, note_to_list_item, open_app, require_session, NoteListItem,
};
use crate::error::CliError;

pub async fn run_list(
    view: NoteView,
    args: ListArgs,
    global_profile: Option<&str>,
    api_url: Option<String>,
) -> Result<(), CliError> {
    let opened = open_app(global_profile, api_url)?;
    let app = &opened.app;
    require_session(app)?;

    app.notes.fetch_view(view, args.page).await?;
    let notes = app.notes.notes();

    if args.json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("No notes in {view}.");
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
        println!(
            "Page {} of {}",
            args.page.saturating_add(1),
            app.notes.total_pages().max(1)
        );
    }

    Ok(())
}
