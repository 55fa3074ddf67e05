//! HTTP adapter for the notes REST API.
//!
//! Every request carries the configured bypass header and the shared default
//! `Authorization` header, which the auth flows keep in step with the session. A 401 from any endpoint invokes the
//! registered [`SessionExpiry`] hook before the error reaches the caller.

mod auth_api;
mod notes_api;

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::multipart::Part;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{BypassHeader, ClientConfig};
use crate::models::Attachment;
use crate::util::compact_text;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Session expired. Please login again.")]
    Unauthorized { payload: Option<Value> },
    #[error("API error: {message} ({status})")]
    Status {
        status: u16,
        message: String,
        payload: Option<Value>,
    },
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("Invalid API configuration: {0}")]
    InvalidConfiguration(String),
}

impl ApiError {
    /// Builds an error from a non-success response body.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let payload = serde_json::from_str::<Value>(body).ok();
        if status == StatusCode::UNAUTHORIZED {
            return Self::Unauthorized { payload };
        }
        Self::Status {
            status: status.as_u16(),
            message: describe_error_body(status, body),
            payload,
        }
    }

    /// Parsed response body of a rejected request, when it was JSON.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        match self {
            Self::Unauthorized { payload } | Self::Status { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED.as_u16()),
            Self::Status { status, .. } => Some(*status),
            Self::Http(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

fn describe_error_body(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error).or(payload.msg) {
            return message.trim().to_string();
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}

/// Called when the backend rejects the current credentials.
pub trait SessionExpiry: Send + Sync {
    fn session_expired(&self);
}

/// Headers applied to every outbound request unless overridden per request.
#[derive(Debug, Default)]
pub struct DefaultHeaders {
    authorization: RwLock<Option<String>>,
}

impl DefaultHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bearer(&self, token: &str) {
        *self
            .authorization
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(format!("Bearer {token}"));
    }

    pub fn clear_authorization(&self) {
        *self
            .authorization
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Full `Authorization` header value, e.g. `Bearer abc`.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.authorization
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub struct ApiClient {
    base_url: String,
    client: Client,
    bypass_header: Option<BypassHeader>,
    headers: Arc<DefaultHeaders>,
    expiry: Option<Arc<dyn SessionExpiry>>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, headers: Arc<DefaultHeaders>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            base_url: config.api_base_url.clone(),
            client,
            bypass_header: config.bypass_header.clone(),
            headers,
            expiry: None,
        })
    }

    #[must_use]
    pub fn with_expiry_handler(mut self, handler: Arc<dyn SessionExpiry>) -> Self {
        self.expiry = Some(handler);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, route: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, route))
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(bypass) = &self.bypass_header {
            request = request.header(bypass.name.as_str(), bypass.value.as_str());
        }
        if let Some(authorization) = self.headers.authorization() {
            request = request.header(reqwest::header::AUTHORIZATION, authorization);
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} {}", status.as_u16(), response.url().path());
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);
        if matches!(error, ApiError::Unauthorized { .. }) {
            tracing::warn!("Request rejected with 401; tearing down session");
            if let Some(handler) = &self.expiry {
                handler.session_expired();
            }
        }
        Err(error)
    }

    async fn get_value(&self, route: &str) -> ApiResult<Value> {
        let response = self.send(self.request(Method::GET, route)).await?;
        read_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, route: &str) -> ApiResult<T> {
        Ok(serde_json::from_value(self.get_value(route).await?)?)
    }

    async fn post_empty(&self, route: &str) -> ApiResult<()> {
        self.send(self.request(Method::POST, route)).await?;
        Ok(())
    }
}

/// Reads a JSON body; an empty body reads as `null`.
async fn read_json(response: Response) -> ApiResult<Value> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

fn file_part(file: &Attachment) -> ApiResult<Part> {
    Ok(Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.content_type)?)
}

fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
