//! Note store.
//!
//! Owns the active note collection, the detail view, per-note flag and comment
//! caches, and the loading flag. Listing endpoints are cheap but may report
//! stale viewer flags, so every listing is followed by a concurrent pass of
//! detail fetches that corrects the flags in place. Like/favorite toggles are
//! applied optimistically and rolled back if the server rejects them.

mod draft;
mod state;


use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::future::join_all;

use crate::http::ApiResult;
use crate::models::{Comment, Note, NoteId, NotePatch, Page, ViewerFlags};

pub use draft::{NoteDraft, NotePayload, NoteUpload};
pub use state::NoteState;

/// The three listing views sharing the active collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteView {
    Feed,
    Mine,
    Favorites,
}

impl NoteView {
    #[must_use]
    pub const fn route(self) -> &'static str {
        match self {
            Self::Feed => "/notes/feed",
            Self::Mine => "/notes/my",
            Self::Favorites => "/notes/favorites",
        }
    }
}

impl fmt::Display for NoteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Feed => "feed",
            Self::Mine => "my notes",
            Self::Favorites => "favorites",
        };
        f.write_str(label)
    }
}

/// Notes endpoints of the remote API.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn list_notes(&self, view: NoteView, page: u32, size: u32) -> ApiResult<Page<Note>>;
    async fn get_note(&self, id: &NoteId) -> ApiResult<Note>;
    async fn create_note(&self, upload: &NoteUpload) -> ApiResult<()>;
    async fn update_note(&self, id: &NoteId, upload: &NoteUpload) -> ApiResult<Note>;
    async fn delete_note(&self, id: &NoteId) -> ApiResult<()>;
    async fn like_note(&self, id: &NoteId) -> ApiResult<()>;
    async fn favorite_note(&self, id: &NoteId) -> ApiResult<()>;
    async fn list_comments(&self, id: &NoteId) -> ApiResult<Vec<Comment>>;
    async fn add_comment(&self, id: &NoteId, content: &str) -> ApiResult<()>;
}

/// Clears the loading flag when dropped, whatever the outcome of the flow.
struct LoadingGuard<'a> {
    state: &'a Mutex<NoteState>,
}

impl<'a> LoadingGuard<'a> {
    fn begin(state: &'a Mutex<NoteState>) -> Self {
        state.lock().unwrap_or_else(PoisonError::into_inner).loading = true;
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}

pub struct NoteStore {
    api: Arc<dyn NotesApi>,
    page_size: u32,
    state: Mutex<NoteState>,
}

impl NoteStore {
    pub fn new(api: Arc<dyn NotesApi>, page_size: u32) -> Self {
        Self {
            api,
            page_size,
            state: Mutex::new(NoteState::default()),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> NoteState {
        self.lock().clone()
    }

    #[must_use]
    pub fn notes(&self) -> Vec<Note> {
        self.lock().notes.clone()
    }

    #[must_use]
    pub fn current_note(&self) -> Option<Note> {
        self.lock().current_note.clone()
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.lock().total_pages
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    #[must_use]
    pub fn comments(&self, id: &NoteId) -> Vec<Comment> {
        self.lock()
            .comments_by_note
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn cached_flags(&self, id: &NoteId) -> Option<ViewerFlags> {
        self.lock().flags_by_note.get(id).copied()
    }

    pub async fn fetch_feed(&self, page: u32) -> ApiResult<()> {
        self.fetch_view(NoteView::Feed, page).await
    }

    pub async fn fetch_my_notes(&self, page: u32) -> ApiResult<()> {
        self.fetch_view(NoteView::Mine, page).await
    }

    pub async fn fetch_favorites(&self, page: u32) -> ApiResult<()> {
        self.fetch_view(NoteView::Favorites, page).await
    }

    /// Loads a listing page into the active collection, then enriches every
    /// entry from the detail endpoint. Enrichment failures are ignored.
    pub async fn fetch_view(&self, view: NoteView, page: u32) -> ApiResult<()> {
        let _loading = LoadingGuard::begin(&self.state);

        let listing = self.api.list_notes(view, page, self.page_size).await?;
        let ids = listing
            .content
            .iter()
            .map(|note| note.id.clone())
            .collect::<Vec<_>>();
        tracing::debug!(
            "Loaded {} notes for {} page {} of {}",
            ids.len(),
            view,
            page,
            listing.total_pages
        );
        {
            let mut state = self.lock();
            state.set_notes(view, listing);
            state.merge_cached_flags();
        }

        join_all(ids.iter().map(|id| self.refresh_flags(id))).await;
        Ok(())
    }

    /// Fetches the authoritative copy of a note, caches its flags, and splices
    /// it into the collection and the detail view. Failures are logged only.
    pub async fn refresh_flags(&self, id: &NoteId) {
        match self.api.get_note(id).await {
            Ok(note) => {
                let mut state = self.lock();
                state.cache_flags(id.clone(), note.flags);
                state.replace_note(note.clone());
                state.refresh_current(note);
            }
            Err(error) => {
                tracing::debug!("Flag refresh for note {} failed: {}", id, error);
            }
        }
    }

    /// Loads a note into the detail view.
    pub async fn fetch_note_by_id(&self, id: &NoteId) -> ApiResult<Note> {
        let _loading = LoadingGuard::begin(&self.state);

        let note = self.api.get_note(id).await?;
        let mut state = self.lock();
        state.set_current(Some(note.clone()));
        state.replace_note(note.clone());
        state.cache_flags(id.clone(), note.flags);
        Ok(note)
    }

    pub async fn toggle_like(&self, id: &NoteId) -> ApiResult<()> {
        let (was_liked, before_count) = {
            let mut state = self.lock();
            let (was_liked, before_count) = state
                .view_of(id)
                .map_or((false, 0), |note| (note.flags.liked, note.like_count));
            let optimistic_count = if was_liked {
                before_count.saturating_sub(1)
            } else {
                before_count.saturating_add(1)
            };
            state.patch_note(id, &NotePatch::like(!was_liked, optimistic_count));
            (was_liked, before_count)
        };

        match self.api.like_note(id).await {
            Ok(()) => {
                self.refresh_flags(id).await;
                Ok(())
            }
            Err(error) => {
                tracing::debug!("Like toggle for note {} failed; rolling back", id);
                self.lock()
                    .patch_note(id, &NotePatch::like(was_liked, before_count));
                Err(error)
            }
        }
    }

    pub async fn toggle_favorite(&self, id: &NoteId) -> ApiResult<()> {
        let was_favorited = {
            let mut state = self.lock();
            let was_favorited = state
                .view_of(id)
                .is_some_and(|note| note.flags.favorited);
            state.patch_note(id, &NotePatch::favorite(!was_favorited));
            was_favorited
        };

        match self.api.favorite_note(id).await {
            Ok(()) => {
                self.refresh_flags(id).await;
                Ok(())
            }
            Err(error) => {
                tracing::debug!("Favorite toggle for note {} failed; rolling back", id);
                self.lock()
                    .patch_note(id, &NotePatch::favorite(was_favorited));
                Err(error)
            }
        }
    }

    /// Creates a note, then reloads page 0 of "my notes".
    pub async fn create_note(&self, draft: NoteDraft) -> ApiResult<()> {
        self.api.create_note(&draft.into_upload()).await?;
        if let Err(error) = self.fetch_my_notes(0).await {
            tracing::warn!("Created note but failed to reload my notes: {}", error);
        }
        Ok(())
    }

    /// Updates a note and splices the server's copy into the collection and
    /// the detail view.
    pub async fn update_note(&self, id: &NoteId, draft: NoteDraft) -> ApiResult<Note> {
        let note = self.api.update_note(id, &draft.into_upload()).await?;
        let mut state = self.lock();
        state.replace_note(note.clone());
        state.set_current(Some(note.clone()));
        Ok(note)
    }

    pub async fn delete_note(&self, id: &NoteId) -> ApiResult<()> {
        self.api.delete_note(id).await?;
        self.lock().remove_note(id);
        Ok(())
    }

    /// Replaces the cached comment list for `id`.
    pub async fn fetch_comments(&self, id: &NoteId) -> ApiResult<Vec<Comment>> {
        let comments = self.api.list_comments(id).await?;
        self.lock().set_comments(id.clone(), comments.clone());
        Ok(comments)
    }

    /// Posts a comment, then reloads the comment list and the note's detail.
    pub async fn add_comment(&self, id: &NoteId, content: &str) -> ApiResult<()> {
        self.api.add_comment(id, content).await?;
        self.fetch_comments(id).await?;
        self.refresh_flags(id).await;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, NoteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
