//! Login, registration and logout flows.
//!
//! Successful flows persist the session, attach the bearer token to the
//! default request headers and navigate to the landing page for the user's
//! role. Rejections carry the server's error payload so callers can show it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::http::{ApiError, ApiResult, DefaultHeaders};
use crate::models::{Attachment, User};
use crate::router::{Navigator, Route};
use crate::session::{SessionError, SessionState};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    Rejected {
        message: String,
        payload: Option<Value>,
    },
    #[error(transparent)]
    Storage(#[from] SessionError),
}

impl AuthError {
    /// Login surfaces only the `error` field of the response body.
    fn login_rejected(error: &ApiError) -> Self {
        tracing::debug!("Login request failed: {}", error);
        let payload = error.payload().cloned();
        let message = payload
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
            .map_or_else(|| LOGIN_FAILED.to_string(), str::to_string);
        Self::Rejected { message, payload }
    }

    /// Registration surfaces the whole response body.
    fn registration_rejected(error: &ApiError) -> Self {
        tracing::debug!("Registration request failed: {}", error);
        let payload = error.payload().cloned();
        let message = payload
            .as_ref()
            .and_then(|body| match body {
                Value::String(text) => Some(text.as_str()),
                Value::Object(fields) => fields
                    .get("message")
                    .or_else(|| fields.get("error"))
                    .and_then(Value::as_str),
                _ => None,
            })
            .map_or_else(|| REGISTRATION_FAILED.to_string(), str::to_string);
        Self::Rejected { message, payload }
    }

    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        match self {
            Self::Rejected { payload, .. } => payload.as_ref(),
            Self::Storage(_) => None,
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Registration form; the picture is uploaded once the account exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub request: RegisterRequest,
    pub profile_picture: Option<Attachment>,
}

/// Token and user returned by login and registration.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for AuthPayload {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthPayload")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Account endpoints of the remote API.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ApiResult<AuthPayload>;
    async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthPayload>;
    async fn current_user(&self) -> ApiResult<User>;
    async fn upload_profile_picture(&self, file: &Attachment) -> ApiResult<()>;
}

pub struct AuthService {
    api: Arc<dyn AuthApi>,
    session: Arc<SessionState>,
    headers: Arc<DefaultHeaders>,
    navigator: Arc<Navigator<SessionState>>,
}

impl AuthService {
    pub fn new(
        api: Arc<dyn AuthApi>,
        session: Arc<SessionState>,
        headers: Arc<DefaultHeaders>,
        navigator: Arc<Navigator<SessionState>>,
    ) -> Self {
        Self {
            api,
            session,
            headers,
            navigator,
        }
    }

    /// Re-attaches a persisted token to the default headers.
    ///
    /// Returns whether a token was found.
    pub fn init(&self) -> AuthResult<bool> {
        let Some(token) = self.session.stored_token()? else {
            return Ok(false);
        };
        self.headers.set_bearer(&token);
        tracing::debug!("Restored persisted session token");
        Ok(true)
    }

    /// Signs in and navigates to the admin dashboard or home.
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<AuthPayload> {
        let payload = self
            .api
            .login(credentials)
            .await
            .map_err(|error| AuthError::login_rejected(&error))?;
        self.store_session(&payload)?;
        tracing::info!("Signed in as {}", payload.user.username);

        let landing = if payload.user.is_admin() {
            Route::Admin
        } else {
            Route::Home
        };
        self.navigator.push(landing);
        Ok(payload)
    }

    /// Creates an account, signs in with it, and uploads the optional profile
    /// picture before navigating home.
    pub async fn register(&self, form: RegisterForm) -> AuthResult<AuthPayload> {
        let payload = self
            .api
            .register(&form.request)
            .await
            .map_err(|error| AuthError::registration_rejected(&error))?;
        self.store_session(&payload)?;
        tracing::info!("Registered {}", payload.user.username);

        if let Some(picture) = &form.profile_picture {
            self.api
                .upload_profile_picture(picture)
                .await
                .map_err(|error| AuthError::registration_rejected(&error))?;
            let user = self
                .api
                .current_user()
                .await
                .map_err(|error| AuthError::registration_rejected(&error))?;
            self.session.set_auth(payload.token.clone(), user)?;
        }

        self.navigator.push(Route::Home);
        Ok(payload)
    }

    /// Forgets the session and navigates to login.
    ///
    /// In-memory state and headers are cleared even when storage fails.
    pub fn logout(&self) -> AuthResult<()> {
        let cleared = self.session.clear();
        self.headers.clear_authorization();
        tracing::info!("Signed out");
        self.navigator.push(Route::Login);
        cleared.map_err(AuthError::from)
    }

    /// Fetches the signed-in user and persists it.
    pub async fn refresh_user(&self) -> AuthResult<User> {
        let user = self.api.current_user().await.map_err(|error| {
            let payload = error.payload().cloned();
            AuthError::Rejected {
                message: error.to_string(),
                payload,
            }
        })?;
        self.session.update_user(user.clone())?;
        Ok(user)
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    fn store_session(&self, payload: &AuthPayload) -> AuthResult<()> {
        self.session
            .set_auth(payload.token.clone(), payload.user.clone())?;
        self.headers.set_bearer(&payload.token);
        Ok(())
    }
}
