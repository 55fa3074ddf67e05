use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use notefeed_core::models::{Attachment, Comment, Note, NoteId};
use notefeed_core::notes::NoteDraft;
use notefeed_core::session::SessionPredicates;
use notefeed_core::App;
use serde::Serialize;

use crate::auth::KeyringPersistence;
use crate::cli::NoteFields;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// A client wired to the resolved profile's config and keychain session.
pub struct ProfileApp {
    pub profile_name: String,
    pub app: App,
}

pub fn open_app(
    global_profile: Option<&str>,
    api_url: Option<String>,
) -> Result<ProfileApp, CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();
    let client_config = profile.client_config(api_url).map_err(CliError::Config)?;

    let storage = Arc::new(KeyringPersistence::new(&profile_name));
    let app = App::new(client_config, storage)?;
    tracing::debug!("Opened profile '{}'", profile_name);
    Ok(ProfileApp { profile_name, app })
}

pub fn require_session(app: &App) -> Result<(), CliError> {
    if app.session.is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotSignedIn)
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub author: Option<String>,
    pub public: bool,
    pub like_count: u64,
    pub comment_count: Option<u64>,
    pub liked: bool,
    pub favorited: bool,
    pub attachment: Option<String>,
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        preview: note_preview(note, 80),
        author: note.owner_name().map(str::to_string),
        public: note.is_public,
        like_count: note.like_count,
        comment_count: note.comment_count,
        liked: note.flags.liked,
        favorited: note.flags.favorited,
        attachment: note.attachment.clone(),
    }
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .map(|note| {
            let id = note.id.to_string();
            let title = truncate(&note.title, 32);
            let author = note.owner_name().unwrap_or("-");
            let markers = flag_markers(note);
            format!(
                "{id:<8}  {title:<32}  @{author:<14}  {:>4} likes  {markers}",
                note.like_count
            )
        })
        .collect()
}

pub fn format_note_detail(note: &Note) -> Vec<String> {
    let mut lines = vec![
        format!("{} [{}]", note.title, note.id),
        format!(
            "by @{}  {}  {} likes  {} comments  {}",
            note.owner_name().unwrap_or("-"),
            if note.is_public { "public" } else { "private" },
            note.like_count,
            note.comment_count
                .map_or_else(|| "?".to_string(), |count| count.to_string()),
            flag_markers(note)
        ),
    ];
    if let Some(attachment) = &note.attachment {
        lines.push(format!("attachment: {attachment}"));
    }
    lines.push(String::new());
    lines.extend(note.content.lines().map(str::to_string));
    lines
}

pub fn format_comment_lines(comments: &[Comment], now: DateTime<Utc>) -> Vec<String> {
    comments
        .iter()
        .map(|comment| {
            let author = comment.author_name().unwrap_or("-");
            let when = comment
                .created_time()
                .map(|time| format_relative_time(time.timestamp_millis(), now.timestamp_millis()))
                .unwrap_or_default();
            format!("@{author:<14}  {when:<10}  {}", comment.content.trim())
        })
        .collect()
}

fn flag_markers(note: &Note) -> String {
    let mut markers = Vec::new();
    if note.flags.liked {
        markers.push("liked");
    }
    if note.flags.favorited {
        markers.push("favorite");
    }
    markers.join(",")
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    truncate(first_line, max_chars)
}

fn truncate(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<NoteId, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(NoteId::from(trimmed))
    }
}

/// Joins the given words, falling back to piped stdin.
pub fn resolve_text(parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn load_attachment(path: &Path) -> Result<Attachment, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::Attachment {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());
    let content_type = mime_guess::from_path(&file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(Attachment::new(file_name, content_type, bytes))
}

/// Builds a draft from the shared note fields; visibility is left to the caller.
pub fn build_draft(fields: NoteFields) -> Result<NoteDraft, CliError> {
    let title = normalize_content(&fields.title).ok_or(CliError::EmptyTitle)?;
    let content = match fields.content.as_deref().and_then(normalize_content) {
        Some(content) => content,
        None => resolve_text(&[])?,
    };

    let mut draft = NoteDraft::new(title, content);
    if let Some(path) = fields.file.as_deref() {
        draft = draft.with_file(load_attachment(path)?);
    }
    Ok(draft)
}
