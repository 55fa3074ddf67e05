use notefeed_core::models::NoteId;
use notefeed_core::App;

use crate::commands::common::{normalize_note_identifier, open_app, require_session};
use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Like,
    Favorite,
}

pub async fn run_toggle(
    toggle: Toggle,
    id: &str,
    global_profile: Option<&str>,
    api_url: Option<String>,
) -> Result<(), CliError> {
    let note_id = normalize_note_identifier(id)?;
    let opened = open_app(global_profile, api_url)?;
    let app = &opened.app;
    require_session(app)?;

    // load the note first so the toggle starts from its current flags
    app.notes.fetch_note_by_id(&note_id).await?;
    match toggle {
        Toggle::Like => app.notes.toggle_like(&note_id).await?,
        Toggle::Favorite => app.notes.toggle_favorite(&note_id).await?,
    }

    println!("{}", describe_result(app, &note_id, toggle));
    Ok(())
}

fn describe_result(app: &App, id: &NoteId, toggle: Toggle) -> String {
    let Some(note) = app.notes.current_note() else {
        return format!("Updated note {id}");
    };
    match toggle {
        Toggle::Like if note.flags.liked => {
            format!("Liked note {id} ({} likes)", note.like_count)
        }
        Toggle::Like => format!("Unliked note {id} ({} likes)", note.like_count),
        Toggle::Favorite if note.flags.favorited => format!("Added note {id} to favorites"),
        Toggle::Favorite => format!("Removed note {id} from favorites"),
    }
}
