//! Note model

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::flags::{truthy, ViewerFlags};
use super::{NoteId, User};

const VISIBILITY_ALIASES: [&str; 2] = ["isPublic", "public"];
const ATTACHMENT_ALIASES: [&str; 4] = ["attachment", "attachmentUrl", "fileUrl", "imageUrl"];

/// A note as seen by the current viewer.
///
/// Decoded from backend payloads through [`Note::from_record`], which resolves
/// the aliased flag, visibility and attachment fields into single values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Owning user, when the payload embeds one
    pub user: Option<User>,
    pub is_public: bool,
    /// Attachment reference (URL or storage key)
    pub attachment: Option<String>,
    pub like_count: u64,
    pub comment_count: Option<u64>,
    pub flags: ViewerFlags,
    /// Fields this client does not interpret, kept for round-tripping.
    pub extra: Map<String, Value>,
}

impl Note {
    #[must_use]
    pub fn new(id: impl Into<NoteId>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            user: None,
            is_public: false,
            attachment: None,
            like_count: 0,
            comment_count: None,
            flags: ViewerFlags::default(),
            extra: Map::new(),
        }
    }

    /// Decodes a loosely shaped backend record.
    pub fn from_record(mut record: Map<String, Value>) -> Result<Self, String> {
        let flags = ViewerFlags::resolve(&record);
        ViewerFlags::strip_from(&mut record);

        let id = record
            .remove("id")
            .filter(|value| !value.is_null())
            .ok_or_else(|| "note record is missing an id".to_string())
            .and_then(|value| {
                serde_json::from_value::<NoteId>(value)
                    .map_err(|error| format!("invalid note id: {error}"))
            })?;

        let is_public = take_first(&mut record, &VISIBILITY_ALIASES).is_some_and(|v| truthy(&v));
        let attachment = take_first(&mut record, &ATTACHMENT_ALIASES).and_then(|value| match value {
            Value::String(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        });
        let title = take_string(&mut record, "title");
        let content = take_string(&mut record, "content");
        let like_count = take_count(&mut record, "likeCount").unwrap_or(0);
        let comment_count = take_count(&mut record, "commentCount");
        let user = match record.remove("user") {
            Some(value @ Value::Object(_)) => match serde_json::from_value::<User>(value.clone()) {
                Ok(user) => Some(user),
                Err(error) => {
                    tracing::debug!("Keeping undecodable note owner as raw JSON: {}", error);
                    record.insert("user".to_string(), value);
                    None
                }
            },
            Some(other) => {
                // keep scalar owners (e.g. a bare username) untouched
                if !other.is_null() {
                    record.insert("user".to_string(), other);
                }
                None
            }
            None => None,
        };

        Ok(Self {
            id,
            title,
            content,
            user,
            is_public,
            attachment,
            like_count,
            comment_count,
            flags,
            extra: record,
        })
    }

    /// Encodes the note back into the backend shape, mirroring every alias.
    #[must_use]
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = self.extra.clone();
        record.insert("id".to_string(), Value::String(self.id.to_string()));
        record.insert("title".to_string(), Value::String(self.title.clone()));
        record.insert("content".to_string(), Value::String(self.content.clone()));
        if let Some(user) = &self.user {
            if let Ok(value) = serde_json::to_value(user) {
                record.insert("user".to_string(), value);
            }
        }
        for alias in VISIBILITY_ALIASES {
            record.insert(alias.to_string(), Value::Bool(self.is_public));
        }
        if let Some(attachment) = &self.attachment {
            record.insert("attachment".to_string(), Value::String(attachment.clone()));
        }
        record.insert("likeCount".to_string(), Value::from(self.like_count));
        if let Some(count) = self.comment_count {
            record.insert("commentCount".to_string(), Value::from(count));
        }
        self.flags.write_into(&mut record);
        record
    }

    /// Username of the owner, when known.
    #[must_use]
    pub fn owner_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|user| user.username.as_str())
            .filter(|name| !name.is_empty())
            .or_else(|| self.extra.get("username").and_then(Value::as_str))
    }

    /// Applies a partial update to the viewer flags and like count.
    pub fn apply(&mut self, patch: &NotePatch) {
        if let Some(liked) = patch.liked {
            self.flags.liked = liked;
        }
        if let Some(favorited) = patch.favorited {
            self.flags.favorited = favorited;
        }
        if let Some(like_count) = patch.like_count {
            self.like_count = like_count;
        }
    }
}

impl Serialize for Note {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_record(record).map_err(de::Error::custom)
    }
}

/// Partial update to a note's viewer state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub liked: Option<bool>,
    pub favorited: Option<bool>,
    pub like_count: Option<u64>,
}

impl NotePatch {
    #[must_use]
    pub const fn like(liked: bool, like_count: u64) -> Self {
        Self {
            liked: Some(liked),
            favorited: None,
            like_count: Some(like_count),
        }
    }

    #[must_use]
    pub const fn favorite(favorited: bool) -> Self {
        Self {
            liked: None,
            favorited: Some(favorited),
            like_count: None,
        }
    }
}

fn take_first(record: &mut Map<String, Value>, aliases: &[&str]) -> Option<Value> {
    let mut resolved = None;
    for alias in aliases {
        if let Some(value) = record.remove(*alias) {
            if resolved.is_none() && !value.is_null() {
                resolved = Some(value);
            }
        }
    }
    resolved
}

fn take_string(record: &mut Map<String, Value>, key: &str) -> String {
    match record.remove(key) {
        Some(Value::String(text)) => text,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn take_count(record: &mut Map<String, Value>, key: &str) -> Option<u64> {
    let value = record.remove(key)?;
    value
        .as_u64()
        .or_else(|| value.as_i64().map(|n| n.max(0).unsigned_abs()))
        .or_else(|| value.as_str().and_then(|text| text.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::models::flags::{FAVORITE_ALIASES, LIKE_ALIASES};

    fn decode(value: Value) -> Note {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn decodes_listing_payload() {
        let note = decode(json!({
            "id": 42,
            "title": "Groceries",
            "content": "milk",
            "public": true,
            "likeCount": 5,
            "likedByCurrentUser": true,
            "user": { "id": 9, "username": "ann" },
            "createdAt": "2024-01-01T00:00:00"
        }));
        assert_eq!(note.id, NoteId::from("42"));
        assert!(note.is_public);
        assert_eq!(note.like_count, 5);
        assert_eq!(note.flags, ViewerFlags::new(true, false));
        assert_eq!(note.owner_name(), Some("ann"));
        assert_eq!(note.extra.get("createdAt"), Some(&json!("2024-01-01T00:00:00")));
    }

    #[test]
    fn odd_owner_shapes_keep_the_note() {
        let nulls = decode(json!({ "id": 1, "user": { "id": 9, "username": "ann", "role": null } }));
        assert_eq!(nulls.owner_name(), Some("ann"));

        let raw_owner = json!({ "id": 9, "username": ["ann"] });
        let odd = decode(json!({ "id": 2, "user": raw_owner.clone() }));
        assert!(odd.user.is_none());
        assert_eq!(odd.extra.get("user"), Some(&raw_owner));
    }

    #[test]
    fn missing_id_is_rejected() {
        assert!(serde_json::from_value::<Note>(json!({ "title": "x" })).is_err());
        assert!(serde_json::from_value::<Note>(json!({ "id": null })).is_err());
    }

    #[test]
    fn visibility_prefers_is_public() {
        let note = decode(json!({ "id": "1", "isPublic": false, "public": true }));
        assert!(!note.is_public);
    }

    #[test]
    fn negative_like_count_is_floored() {
        let note = decode(json!({ "id": "1", "likeCount": -3 }));
        assert_eq!(note.like_count, 0);
    }

    #[test]
    fn record_mirrors_every_alias() {
        let mut note = Note::new("7", "t", "c");
        note.flags = ViewerFlags::new(true, true);
        let record = note.to_record();
        for alias in LIKE_ALIASES.iter().chain(FAVORITE_ALIASES.iter()) {
            assert_eq!(record[*alias], json!(true), "{alias}");
        }
        assert_eq!(record["public"], record["isPublic"]);
    }

    #[test]
    fn record_round_trips() {
        let note = decode(json!({
            "id": 3,
            "title": "a",
            "content": "b",
            "fileUrl": "/files/3.png",
            "commentCount": 2,
            "isFavorited": true
        }));
        let again = decode(Value::Object(note.to_record()));
        assert_eq!(note, again);
        assert_eq!(again.attachment.as_deref(), Some("/files/3.png"));
    }

    #[test]
    fn patch_touches_only_given_fields() {
        let mut note = Note::new("1", "t", "c");
        note.like_count = 5;
        note.apply(&NotePatch::favorite(true));
        assert_eq!(note.like_count, 5);
        assert!(note.flags.favorited);
        assert!(!note.flags.liked);

        note.apply(&NotePatch::like(true, 6));
        assert_eq!(note.like_count, 6);
        assert!(note.flags.liked);
    }
}
