//! Wiring of the client stores around one shared session.

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::ClientConfig;
use crate::http::{ApiClient, DefaultHeaders, SessionExpiry};
use crate::notes::NoteStore;
use crate::router::{Navigator, Route};
use crate::session::{SessionPersistence, SessionState};
use crate::toast::ToastStore;
use crate::{Error, Result};

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

/// Global teardown run when the backend answers 401.
pub struct ExpiryHandler {
    session: Arc<SessionState>,
    headers: Arc<DefaultHeaders>,
    navigator: Arc<Navigator<SessionState>>,
    toasts: ToastStore,
}

impl SessionExpiry for ExpiryHandler {
    fn session_expired(&self) {
        if let Err(error) = self.session.clear() {
            tracing::warn!("Failed to clear persisted session: {}", error);
        }
        self.headers.clear_authorization();
        self.navigator.push(Route::Login);
        self.toasts.error(SESSION_EXPIRED_MESSAGE);
    }
}

/// A fully wired client: session, navigation, notifications and stores.
pub struct App {
    pub config: ClientConfig,
    pub session: Arc<SessionState>,
    pub headers: Arc<DefaultHeaders>,
    pub navigator: Arc<Navigator<SessionState>>,
    pub toasts: ToastStore,
    pub api: Arc<ApiClient>,
    pub auth: AuthService,
    pub notes: NoteStore,
}

impl App {
    /// Restores the persisted session, builds the stores and re-attaches any
    /// persisted token to the default headers.
    pub fn new(config: ClientConfig, storage: Arc<dyn SessionPersistence>) -> Result<Self> {
        let config = config.validated().map_err(Error::Config)?;
        let session = Arc::new(SessionState::restore(storage)?);
        let headers = Arc::new(DefaultHeaders::new());
        let navigator = Arc::new(Navigator::new(Arc::clone(&session)));
        let toasts = ToastStore::new(config.toast_ttl());

        let expiry = Arc::new(ExpiryHandler {
            session: Arc::clone(&session),
            headers: Arc::clone(&headers),
            navigator: Arc::clone(&navigator),
            toasts: toasts.clone(),
        });
        let api = Arc::new(
            ApiClient::new(&config, Arc::clone(&headers))?
                .with_expiry_handler(expiry),
        );

        let auth = AuthService::new(
            api.clone(),
            Arc::clone(&session),
            Arc::clone(&headers),
            Arc::clone(&navigator),
        );
        auth.init()?;
        let notes = NoteStore::new(api.clone(), config.page_size);

        tracing::debug!("Client ready for {}", config.api_base_url);
        Ok(Self {
            config,
            session,
            headers,
            navigator,
            toasts,
            api,
            auth,
            notes,
        })
    }
}
