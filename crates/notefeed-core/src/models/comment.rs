//! Comment model

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CommentId, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CommentId>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub content: String,
    #[serde(default, alias = "author", skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Creation time as sent: an ISO string or a `[y, m, d, h, min, s, nanos]` array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Comment {
    /// Username of the author, when known.
    #[must_use]
    pub fn author_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|user| user.username.as_str())
            .filter(|name| !name.is_empty())
            .or_else(|| self.extra.get("username").and_then(Value::as_str))
    }

    /// Parses `createdAt`. Strings may be RFC 3339 or zone-less (read as UTC);
    /// arrays hold date and time components.
    #[must_use]
    pub fn created_time(&self) -> Option<DateTime<Utc>> {
        match self.created_at.as_ref()? {
            Value::String(raw) => parse_timestamp(raw.trim()),
            Value::Array(parts) => timestamp_from_parts(parts),
            _ => None,
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|time| time.and_utc())
        })
}

fn timestamp_from_parts(parts: &[Value]) -> Option<DateTime<Utc>> {
    let numbers = parts
        .iter()
        .map(|part| part.as_u64().and_then(|number| u32::try_from(number).ok()))
        .collect::<Option<Vec<u32>>>()?;
    if numbers.len() < 3 {
        return None;
    }
    let field = |index: usize| numbers.get(index).copied().unwrap_or(0);
    let year = i32::try_from(field(0)).ok()?;
    NaiveDate::from_ymd_opt(year, field(1), field(2))?
        .and_hms_nano_opt(field(3), field(4), field(5), field(6))
        .map(|time| time.and_utc())
}

/// Decodes a comments response.
///
/// The endpoint answers with either a bare array or a page object carrying a
/// `content` array. Any other shape is an empty list. Entries that fail to
/// decode are dropped.
pub fn comments_from_value(value: Value) -> Vec<Comment> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut page) => match page.remove("content") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(comment) => Some(comment),
            Err(error) => {
                tracing::warn!("Dropping undecodable comment: {}", error);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_bare_array() {
        let comments = comments_from_value(json!([
            { "id": 1, "content": "first", "user": { "username": "ann" } },
            { "id": 2, "content": "second", "username": "bob" }
        ]));
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].author_name(), Some("ann"));
        assert_eq!(comments[1].author_name(), Some("bob"));
    }

    #[test]
    fn decodes_page_object() {
        let comments =
            comments_from_value(json!({ "content": [{ "content": "hi" }], "totalPages": 1 }));
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "hi");
    }

    #[test]
    fn created_time_accepts_zoneless_timestamps() {
        let comments = comments_from_value(json!([
            { "content": "a", "createdAt": "2024-03-01T10:15:30.123" },
            { "content": "b", "createdAt": "2024-03-01T10:15:30Z" },
            { "content": "c", "createdAt": "yesterday" }
        ]));
        let expected = "2024-03-01T10:15:30Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(
            comments[0].created_time().map(|time| time.timestamp()),
            Some(expected.timestamp())
        );
        assert_eq!(comments[1].created_time(), Some(expected));
        assert!(comments[2].created_time().is_none());
    }

    #[test]
    fn other_shapes_are_empty() {
        assert!(comments_from_value(json!({ "content": "nope" })).is_empty());
        assert!(comments_from_value(json!(null)).is_empty());
    }

    #[test]
    fn odd_entries_do_not_sink_the_list() {
        let comments = comments_from_value(json!([
            { "id": 1, "content": "ok" },
            { "id": 2, "content": null },
            { "id": 3, "content": "array time", "createdAt": [2024, 3, 1, 10, 15, 30] },
            { "id": 4, "content": 17 },
            "not a comment"
        ]));
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].content, "ok");
        assert!(comments[1].content.is_empty());

        let expected = "2024-03-01T10:15:30Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(comments[2].created_time(), Some(expected));
    }

    #[test]
    fn short_or_invalid_time_arrays_are_ignored() {
        let comments = comments_from_value(json!([
            { "content": "a", "createdAt": [2024, 3] },
            { "content": "b", "createdAt": [2024, 13, 1] },
            { "content": "c", "createdAt": { "epoch": 1 } }
        ]));
        assert_eq!(comments.len(), 3);
        assert!(comments.iter().all(|comment| comment.created_time().is_none()));
    }
}
