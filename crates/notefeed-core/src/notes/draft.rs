//! Create/update payloads.

use serde::{Deserialize, Serialize};

use crate::models::Attachment;

/// User input for creating or editing a note.
///
/// Visibility may arrive as either `isPublic` or `public`; `isPublic` wins when
/// both are given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(skip)]
    pub file: Option<Attachment>,
}

impl NoteDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: Attachment) -> Self {
        self.file = Some(file);
        self
    }

    #[must_use]
    pub fn visibility(&self) -> bool {
        self.is_public.or(self.public).unwrap_or(false)
    }

    #[must_use]
    pub fn into_upload(self) -> NoteUpload {
        let is_public = self.visibility();
        NoteUpload {
            payload: NotePayload {
                title: self.title,
                content: self.content,
                public: is_public,
                is_public,
            },
            file: self.file,
        }
    }
}

/// JSON part of the multipart upload. Visibility is sent under both names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotePayload {
    pub title: String,
    pub content: String,
    pub public: bool,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
}

/// Multipart body for `POST /notes` and `PUT /notes/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteUpload {
    pub payload: NotePayload,
    pub file: Option<Attachment>,
}
