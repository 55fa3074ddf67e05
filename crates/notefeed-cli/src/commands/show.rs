use crate::commands::common::{
    format_note_detail, normalize_note_identifier, note_to_list_item, open_app,
};
use crate::error::CliError;

pub async fn run_show(
    id: &str,
    as_json: bool,
    global_profile: Option<&str>,
    api_url: Option<String>,
) -> Result<(), CliError> {
    let note_id = normalize_note_identifier(id)?;
    let opened = open_app(global_profile, api_url)?;
    let note = opened.app.notes.fetch_note_by_id(&note_id).await?;

    if as_json {
        let mut item = serde_json::to_value(note_to_list_item(&note))?;
        if let Some(fields) = item.as_object_mut() {
            fields.insert("content".to_string(), note.content.clone().into());
        }
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        for line in format_note_detail(&note) {
            println!("{line}");
        }
    }
    Ok(())
}
