use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::models::{comments_from_value, Comment, Note, NoteId, Page};
use crate::notes::{NoteUpload, NoteView, NotesApi};

use super::{encode_segment, file_part, read_json, ApiClient, ApiError, ApiResult};

impl ApiClient {
    fn note_form(upload: &NoteUpload) -> ApiResult<Form> {
        let note = Part::text(serde_json::to_string(&upload.payload)?)
            .mime_str("application/json")?;
        let mut form = Form::new().part("note", note);
        if let Some(file) = &upload.file {
            form = form.part("file", file_part(file)?);
        }
        Ok(form)
    }
}

fn note_route(id: &NoteId) -> String {
    format!("/notes/{}", encode_segment(id.as_str()))
}

fn note_from_value(value: serde_json::Value) -> ApiResult<Note> {
    let serde_json::Value::Object(record) = value else {
        return Err(ApiError::UnexpectedResponse(
            "note response was not a JSON object".to_string(),
        ));
    };
    Note::from_record(record).map_err(ApiError::UnexpectedResponse)
}

#[async_trait]
impl NotesApi for ApiClient {
    async fn list_notes(&self, view: NoteView, page: u32, size: u32) -> ApiResult<Page<Note>> {
        let request = self
            .request(Method::GET, view.route())
            .query(&[("page", page), ("size", size)]);
        let response = self.send(request).await?;
        Ok(Page::from_value(read_json(response).await?))
    }

    async fn get_note(&self, id: &NoteId) -> ApiResult<Note> {
        note_from_value(self.get_value(&note_route(id)).await?)
    }

    async fn create_note(&self, upload: &NoteUpload) -> ApiResult<()> {
        let request = self
            .request(Method::POST, "/notes")
            .multipart(Self::note_form(upload)?);
        self.send(request).await?;
        Ok(())
    }

    async fn update_note(&self, id: &NoteId, upload: &NoteUpload) -> ApiResult<Note> {
        let request = self
            .request(Method::PUT, &note_route(id))
            .multipart(Self::note_form(upload)?);
        let response = self.send(request).await?;
        note_from_value(read_json(response).await?)
    }

    async fn delete_note(&self, id: &NoteId) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, &note_route(id)))
            .await?;
        Ok(())
    }

    async fn like_note(&self, id: &NoteId) -> ApiResult<()> {
        self.post_empty(&format!("{}/like", note_route(id))).await
    }

    async fn favorite_note(&self, id: &NoteId) -> ApiResult<()> {
        self.post_empty(&format!("{}/favorite", note_route(id)))
            .await
    }

    async fn list_comments(&self, id: &NoteId) -> ApiResult<Vec<Comment>> {
        let value = self
            .get_value(&format!("{}/comments", note_route(id)))
            .await?;
        Ok(comments_from_value(value))
    }

    async fn add_comment(&self, id: &NoteId, content: &str) -> ApiResult<()> {
        let request = self
            .request(Method::POST, &format!("{}/comment", note_route(id)))
            .json(&serde_json::json!({ "content": content }));
        self.send(request).await?;
        Ok(())
    }
}
