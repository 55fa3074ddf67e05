//! Note store state and the synchronous mutations applied to it.

use std::collections::HashMap;

use crate::models::{Comment, Note, NoteId, NotePatch, Page, ViewerFlags};

use super::NoteView;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteState {
    /// The active collection; every listing overwrites it.
    pub notes: Vec<Note>,
    /// Which listing populated `notes`.
    pub view: Option<NoteView>,
    pub total_pages: u32,
    /// Detail view, independent of the active collection.
    pub current_note: Option<Note>,
    pub loading: bool,
    pub comments_by_note: HashMap<NoteId, Vec<Comment>>,
    pub flags_by_note: HashMap<NoteId, ViewerFlags>,
}

impl NoteState {
    pub(crate) fn set_notes(&mut self, view: NoteView, page: Page<Note>) {
        self.notes = page.content;
        self.total_pages = page.total_pages;
        self.view = Some(view);
    }

    /// Overlays cached viewer flags onto the active collection.
    pub(crate) fn merge_cached_flags(&mut self) {
        for note in &mut self.notes {
            if let Some(flags) = self.flags_by_note.get(&note.id) {
                note.flags = *flags;
            }
        }
    }

    pub(crate) fn cache_flags(&mut self, id: NoteId, flags: ViewerFlags) {
        self.flags_by_note.insert(id, flags);
    }

    /// Replaces the collection entry with the same id, if there is one.
    pub(crate) fn replace_note(&mut self, note: Note) {
        let Some(index) = self.notes.iter().position(|entry| entry.id == note.id) else {
            return;
        };
        let id = note.id.clone();
        self.notes[index] = note;
        let mut position = 0;
        self.notes.retain(|entry| {
            let keep = position == index || entry.id != id;
            position += 1;
            keep
        });
    }

    /// Refreshes the detail view when it shows the same note.
    pub(crate) fn refresh_current(&mut self, note: Note) {
        if self
            .current_note
            .as_ref()
            .is_some_and(|current| current.id == note.id)
        {
            self.current_note = Some(note);
        }
    }

    pub(crate) fn set_current(&mut self, note: Option<Note>) {
        self.current_note = note;
    }

    /// Applies `patch` to the collection entry and the detail view for `id`.
    pub(crate) fn patch_note(&mut self, id: &NoteId, patch: &NotePatch) {
        if let Some(entry) = self.notes.iter_mut().find(|entry| &entry.id == id) {
            entry.apply(patch);
        }
        if let Some(current) = self.current_note.as_mut().filter(|current| &current.id == id) {
            current.apply(patch);
        }
    }

    pub(crate) fn remove_note(&mut self, id: &NoteId) {
        self.notes.retain(|entry| &entry.id != id);
        if self
            .current_note
            .as_ref()
            .is_some_and(|current| &current.id == id)
        {
            self.current_note = None;
        }
    }

    pub(crate) fn set_comments(&mut self, id: NoteId, comments: Vec<Comment>) {
        self.comments_by_note.insert(id, comments);
    }

    /// The freshest local copy of a note: the detail view when it matches,
    /// otherwise the collection entry.
    #[must_use]
    pub fn view_of(&self, id: &NoteId) -> Option<&Note> {
        self.current_note
            .as_ref()
            .filter(|current| &current.id == id)
            .or_else(|| self.notes.iter().find(|entry| &entry.id == id))
    }
}
