//! Data models for Notefeed

mod attachment;
mod comment;
mod flags;
mod id;
mod note;
mod page;
mod user;

use serde::{Deserialize, Deserializer};

pub use attachment::Attachment;
pub use comment::{comments_from_value, Comment};
pub use flags::{normalize_flags, ViewerFlags, FAVORITE_ALIASES, LIKE_ALIASES};
pub use id::{CommentId, NoteId, UserId};
pub use note::{Note, NotePatch};
pub use page::Page;
pub use user::{Role, User};

/// Reads `null` as the field's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
