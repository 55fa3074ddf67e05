//! Viewer relationship flags and their legacy aliases.
//!
//! The backend reports "liked by me" and "favorited by me" under several field
//! names depending on the endpoint. [`normalize_flags`] folds every alias into a
//! single resolved value and mirrors it back under all names;
//! [`ViewerFlags::resolve`] is the typed adapter used at the decode boundary.

use serde_json::{Map, Value};

/// Like aliases in resolution order.
pub const LIKE_ALIASES: [&str; 4] = [
    "isLikedByCurrentUser",
    "likedByCurrentUser",
    "isLiked",
    "liked",
];

/// Favorite aliases in resolution order.
pub const FAVORITE_ALIASES: [&str; 4] = [
    "isFavoritedByCurrentUser",
    "favoritedByCurrentUser",
    "isFavorited",
    "favorited",
];

/// The current viewer's relationship to a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerFlags {
    pub liked: bool,
    pub favorited: bool,
}

impl ViewerFlags {
    #[must_use]
    pub const fn new(liked: bool, favorited: bool) -> Self {
        Self { liked, favorited }
    }

    /// Resolves both flags from a loosely shaped record.
    ///
    /// The first alias that is present and not `null` wins; when no alias is
    /// present the flag is `false`.
    #[must_use]
    pub fn resolve(record: &Map<String, Value>) -> Self {
        Self {
            liked: resolve_alias(record, &LIKE_ALIASES),
            favorited: resolve_alias(record, &FAVORITE_ALIASES),
        }
    }

    /// Writes both flags under every alias.
    pub fn write_into(self, record: &mut Map<String, Value>) {
        for alias in LIKE_ALIASES {
            record.insert(alias.to_string(), Value::Bool(self.liked));
        }
        for alias in FAVORITE_ALIASES {
            record.insert(alias.to_string(), Value::Bool(self.favorited));
        }
    }

    /// Removes every alias field from `record`.
    pub(crate) fn strip_from(record: &mut Map<String, Value>) {
        for alias in LIKE_ALIASES.iter().chain(FAVORITE_ALIASES.iter()) {
            record.remove(*alias);
        }
    }
}

/// Returns `record` with all eight alias fields set to the resolved flags.
#[must_use]
pub fn normalize_flags(mut record: Map<String, Value>) -> Map<String, Value> {
    ViewerFlags::resolve(&record).write_into(&mut record);
    record
}

fn resolve_alias(record: &Map<String, Value>, aliases: &[&str]) -> bool {
    aliases
        .iter()
        .find_map(|alias| record.get(*alias).filter(|value| !value.is_null()))
        .is_some_and(truthy)
}

/// Loose truthiness: non-zero numbers, non-empty strings and containers count.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
