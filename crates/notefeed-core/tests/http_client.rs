//! HTTP adapter tests against a mock backend.
//!
//! These verify the headers every request carries, the multipart note upload,
//! and the global teardown that follows a 401.

use std::sync::Arc;

use notefeed_core::auth::{AuthError, Credentials};
use notefeed_core::http::ApiError;
use notefeed_core::models::NoteId;
use notefeed_core::notes::NoteDraft;
use notefeed_core::router::Route;
use notefeed_core::session::{MemoryPersistence, SessionPersistence, SessionPredicates, TOKEN_KEY};
use notefeed_core::toast::ToastKind;
use notefeed_core::{App, ClientConfig};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn app_for(server: &MockServer, token: Option<&str>) -> App {
    let storage = Arc::new(MemoryPersistence::new());
    if let Some(token) = token {
        storage.set(TOKEN_KEY, token).unwrap();
    }
    let config = ClientConfig::new(format!("{}/api/", server.uri())).unwrap();
    App::new(config, storage).unwrap()
}

#[tokio::test]
async fn listing_carries_bearer_and_bypass_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/notes/feed"))
        .and(query_param("page", "2"))
        .and(query_param("size", "10"))
        .and(header("authorization", "Bearer tok-1"))
        .and(header("ngrok-skip-browser-warning", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "id": 7, "title": "hello", "likeCount": 3, "liked": false }],
            "totalPages": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/notes/7"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7, "title": "hello", "likeCount": 3, "isLiked": true, "favorited": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server, Some("tok-1")).await;
    app.notes.fetch_feed(2).await.unwrap();

    let notes = app.notes.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, NoteId::from(7));
    assert!(notes[0].flags.liked);
    assert!(notes[0].flags.favorited);
    assert_eq!(app.notes.total_pages(), 4);
    assert!(!app.notes.is_loading());
}

#[tokio::test]
async fn create_sends_multipart_note_part_and_reloads_mine() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/notes"))
        .and(body_string_contains("name=\"note\""))
        .and(body_string_contains("\"isPublic\":true"))
        .and(body_string_contains("name=\"file\""))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/notes/my"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [], "totalPages": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server, Some("tok")).await;
    let draft = NoteDraft::new("title", "body")
        .with_public(true)
        .with_file(notefeed_core::models::Attachment::new(
            "photo.png",
            "image/png",
            b"not-really-a-png".to_vec(),
        ));
    app.notes.create_note(draft).await.unwrap();
}

#[tokio::test]
async fn comment_is_posted_as_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/notes/5/comment"))
        .and(body_json(json!({ "content": "nice" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/notes/5/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "id": 1, "content": "nice", "user": { "username": "ann" } }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/notes/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 5 })))
        .mount(&server)
        .await;

    let app = app_for(&server, Some("tok")).await;
    let id = NoteId::from(5);
    app.notes.add_comment(&id, "nice").await.unwrap();

    let comments = app.notes.comments(&id);
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author_name(), Some("ann"));
}

#[tokio::test]
async fn unauthorized_response_tears_down_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/notes/favorites"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let app = app_for(&server, Some("stale")).await;
    assert!(app.session.is_authenticated());

    let error = app.notes.fetch_favorites(0).await.unwrap_err();
    assert!(matches!(error, ApiError::Unauthorized { .. }));

    assert!(!app.session.is_authenticated());
    assert!(app.headers.authorization().is_none());
    assert_eq!(app.navigator.current(), Some(Route::Login));
    let toast = app.toasts.current().unwrap();
    assert_eq!(toast.message, "Session expired. Please login again.");
    assert_eq!(toast.kind, ToastKind::Error);
    assert!(!app.notes.is_loading());
}

#[tokio::test]
async fn login_stores_token_for_later_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "ann", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "fresh",
            "user": { "id": 1, "username": "ann", "role": "USER" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/notes/9"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server, None).await;
    app.auth
        .login(&Credentials::new("ann", "pw"))
        .await
        .unwrap();
    assert_eq!(app.navigator.current(), Some(Route::Home));

    app.notes.delete_note(&NoteId::from(9)).await.unwrap();
}

#[tokio::test]
async fn rejected_login_surfaces_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Bad credentials" })),
        )
        .mount(&server)
        .await;

    let app = app_for(&server, None).await;
    let error = app
        .auth
        .login(&Credentials::new("ann", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(error, AuthError::Rejected { .. }));
    assert_eq!(error.to_string(), "Bad credentials");
    assert!(!app.session.is_authenticated());
}

#[tokio::test]
async fn listing_keeps_notes_with_null_owner_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/notes/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "id": 1, "title": "a", "user": { "id": 9, "username": "ann", "role": null } },
                { "id": 2, "title": "b", "user": { "id": 10, "username": null } }
            ],
            "totalPages": 3
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/notes/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "title": "a", "liked": true, "user": { "username": "ann", "role": null }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/notes/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 2, "title": "b" })))
        .mount(&server)
        .await;

    let app = app_for(&server, Some("tok")).await;
    app.notes.fetch_feed(0).await.unwrap();

    let notes = app.notes.notes();
    assert_eq!(notes.len(), 2);
    assert_eq!(app.notes.total_pages(), 3);
    assert!(notes[0].flags.liked);
    assert_eq!(notes[0].owner_name(), Some("ann"));
}

#[tokio::test]
async fn odd_comment_entries_do_not_fail_add_comment() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/notes/5/comment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/notes/5/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "content": "ok" },
            { "id": 2, "content": null },
            { "id": 3, "content": "late", "createdAt": [2024, 3, 1, 10, 15, 30] }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/notes/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 5 })))
        .mount(&server)
        .await;

    let app = app_for(&server, Some("tok")).await;
    let id = NoteId::from(5);
    app.notes.add_comment(&id, "late").await.unwrap();

    let comments = app.notes.comments(&id);
    assert_eq!(comments.len(), 3);
    assert!(comments[1].content.is_empty());
    assert!(comments[2].created_time().is_some());
}

#[tokio::test]
async fn bearer_follows_the_default_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/notes/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [], "totalPages": 0
        })))
        .mount(&server)
        .await;

    let app = app_for(&server, Some("tok")).await;
    app.auth.logout().unwrap();
    app.notes.fetch_feed(0).await.unwrap();

    app.headers.set_bearer("manual");
    app.notes.fetch_feed(0).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[1]
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok()),
        Some("Bearer manual")
    );
}
