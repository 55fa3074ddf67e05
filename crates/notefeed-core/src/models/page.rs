//! Paged listing responses

use serde::de::DeserializeOwned;
use serde_json::Value;

/// One page of a listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_pages: 0,
        }
    }
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(content: Vec<T>, total_pages: u32) -> Self {
        Self {
            content,
            total_pages,
        }
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Decodes a page leniently.
    ///
    /// A missing or non-array `content` yields an empty page and a missing
    /// `totalPages` yields zero. Entries that fail to decode are dropped.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut page) = value else {
            return Self::default();
        };
        let total_pages = page
            .get("totalPages")
            .and_then(Value::as_u64)
            .and_then(|pages| u32::try_from(pages).ok())
            .unwrap_or(0);
        let content = match page.remove("content") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match serde_json::from_value(item) {
                    Ok(entry) => Some(entry),
                    Err(error) => {
                        tracing::warn!("Dropping undecodable listing entry: {}", error);
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            content,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::Note;

    #[test]
    fn decodes_content_and_total_pages() {
        let page: Page<Note> = Page::from_value(json!({
            "content": [{ "id": 1 }, { "id": 2 }],
            "totalPages": 3,
            "number": 0
        }));
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn null_owner_fields_keep_every_entry() {
        let page: Page<Note> = Page::from_value(json!({
            "content": [
                { "id": 1, "user": { "id": 9, "username": "ann", "role": null } },
                { "id": 2, "user": { "username": null } }
            ],
            "totalPages": 3
        }));
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.content[0].owner_name(), Some("ann"));
    }

    #[test]
    fn non_array_content_is_empty() {
        let page: Page<Note> = Page::from_value(json!({ "content": null }));
        assert!(page.content.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn undecodable_entries_are_dropped() {
        let page: Page<Note> =
            Page::from_value(json!({ "content": [{ "id": 1 }, { "title": "no id" }] }));
        assert_eq!(page.content.len(), 1);
    }
}
