use std::sync::Arc;

use chrono::{TimeZone, Utc};
use clap::Parser;
use notefeed_core::models::{comments_from_value, Note, ViewerFlags};
use notefeed_core::session::MemoryPersistence;
use notefeed_core::{App, ClientConfig};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::cli::{AuthCommands, Cli, Commands, CompletionShell, ConfigCommands};
use crate::commands::common::{
    format_comment_lines, format_note_detail, format_note_lines, format_relative_time,
    load_attachment, normalize_content, normalize_note_identifier, note_preview,
    note_to_list_item, require_session,
};
use crate::commands::completions::render_completions;
use crate::error::CliError;

fn sample_note() -> Note {
    let mut note = Note::new(
        "42",
        "Groceries",
        "milk, eggs\nand a very long tail that nobody reads",
    );
    note.like_count = 3;
    note.is_public = true;
    note.flags = ViewerFlags::new(true, false);
    note
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_note_identifier_rejects_blank() {
    assert_eq!(normalize_note_identifier(" 7 ").unwrap().as_str(), "7");
    assert!(matches!(
        normalize_note_identifier("   "),
        Err(CliError::EmptyNoteId)
    ));
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn note_preview_uses_first_line_only() {
    let note = Note::new("1", "t", "This is a very long sentence that should be shortened\nsecond");
    assert_eq!(note_preview(&note, 20), "This is a very lo...");
}

#[test]
fn note_lines_show_likes_and_markers() {
    let lines = format_note_lines(&[sample_note()]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("42 "));
    assert!(lines[0].contains("Groceries"));
    assert!(lines[0].contains("3 likes"));
    assert!(lines[0].ends_with("liked"));
}

#[test]
fn note_detail_includes_visibility_and_body() {
    let lines = format_note_detail(&sample_note());
    assert_eq!(lines[0], "Groceries [42]");
    assert!(lines[1].contains("public"));
    assert!(lines[1].contains("? comments"));
    assert_eq!(lines.last().map(String::as_str), Some("and a very long tail that nobody reads"));
}

#[test]
fn list_item_carries_viewer_flags() {
    let item = note_to_list_item(&sample_note());
    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["id"], "42");
    assert_eq!(value["liked"], true);
    assert_eq!(value["favorited"], false);
    assert_eq!(value["like_count"], 3);
}

#[test]
fn comment_lines_render_author_and_age() {
    let comments = comments_from_value(json!([
        { "content": " first! ", "user": { "username": "ann" }, "createdAt": "2024-01-01T10:00:00" },
        { "content": "anonymous" }
    ]));
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

    let lines = format_comment_lines(&comments, now);
    assert!(lines[0].starts_with("@ann"));
    assert!(lines[0].contains("2h ago"));
    assert!(lines[0].ends_with("first!"));
    assert!(lines[1].starts_with("@-"));
}

#[test]
fn attachment_type_is_guessed_from_extension() {
    let path = std::env::temp_dir().join(format!(
        "notefeed-cli-attachment-{}.png",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos())
    ));
    std::fs::write(&path, b"fake image").unwrap();

    let attachment = load_attachment(&path).unwrap();
    assert_eq!(attachment.content_type, "image/png");
    assert_eq!(attachment.bytes, b"fake image".to_vec());

    let _ = std::fs::remove_file(path);
}

#[test]
fn missing_attachment_reports_path() {
    let error = load_attachment(std::path::Path::new("/definitely/missing.png")).unwrap_err();
    assert!(error.to_string().contains("/definitely/missing.png"));
}

#[test]
fn cli_parses_list_and_global_flags() {
    let cli = Cli::try_parse_from([
        "notefeed",
        "feed",
        "--page",
        "2",
        "--json",
        "--profile",
        "work",
    ])
    .unwrap();
    assert_eq!(cli.profile.as_deref(), Some("work"));
    match cli.command {
        Commands::Feed(args) => {
            assert_eq!(args.page, 2);
            assert!(args.json);
        }
        _ => panic!("expected feed command"),
    }
}

#[test]
fn cli_parses_note_upload_arguments() {
    let cli = Cli::try_parse_from([
        "notefeed", "create", "--title", "t", "--content", "c", "--public",
    ])
    .unwrap();
    match cli.command {
        Commands::Create(note) => {
            assert_eq!(note.fields.title, "t");
            assert_eq!(note.fields.content.as_deref(), Some("c"));
            assert!(note.public);
            assert!(note.fields.file.is_none());
        }
        _ => panic!("expected create command"),
    }
}

fn update_visibility(args: &[&str]) -> Option<bool> {
    let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
    match cli.command {
        Commands::Update { id, note } => {
            assert_eq!(id, "9");
            note.visibility()
        }
        _ => panic!("expected update command"),
    }
}

#[test]
fn update_keeps_visibility_unless_asked() {
    let base = ["notefeed", "update", "9", "--title", "t"];
    assert_eq!(update_visibility(&base), None);
    assert_eq!(update_visibility(&[&base[..], &["--public"][..]].concat()), Some(true));
    assert_eq!(update_visibility(&[&base[..], &["--private"][..]].concat()), Some(false));

    let both = Cli::try_parse_from([&base[..], &["--public", "--private"][..]].concat());
    assert!(both.is_err());
}

#[test]
fn signed_out_profile_is_told_to_log_in() {
    let config = ClientConfig::new("http://localhost:8080/api").unwrap();
    let app = App::new(config, Arc::new(MemoryPersistence::new())).unwrap();
    assert!(matches!(require_session(&app), Err(CliError::NotSignedIn)));
}

#[test]
fn cli_parses_auth_and_config_commands() {
    let login = Cli::try_parse_from([
        "notefeed", "auth", "login", "--username", "ann", "--password", "pw",
    ])
    .unwrap();
    assert!(matches!(
        login.command,
        Commands::Auth {
            command: AuthCommands::Login { .. }
        }
    ));

    let init = Cli::try_parse_from([
        "notefeed",
        "config",
        "init",
        "--api-base-url",
        "https://notes.example.com/api",
        "--page-size",
        "20",
    ])
    .unwrap();
    match init.command {
        Commands::Config {
            command: ConfigCommands::Init { page_size, .. },
        } => assert_eq!(page_size, Some(20)),
        _ => panic!("expected config init"),
    }
}

#[test]
fn completions_mention_binary_name() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("notefeed"));
}
