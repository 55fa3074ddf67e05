//! Session state: the bearer token and signed-in user.
//!
//! Both values are persisted under fixed keys in a durable key-value store so a
//! restarted client resumes the previous login.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use thiserror::Error;

use crate::models::User;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Secure storage error: {0}")]
    Storage(String),
    #[error("Failed to serialize session: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Durable key-value storage for session values.
pub trait SessionPersistence: Send + Sync {
    fn get(&self, key: &str) -> SessionResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> SessionResult<()>;
    fn remove(&self, key: &str) -> SessionResult<()>;
}

/// Process-local storage, used by tests and ephemeral clients.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionPersistence for MemoryPersistence {
    fn get(&self, key: &str) -> SessionResult<Option<String>> {
        let guard = self
            .entries
            .lock()
            .map_err(|error| SessionError::Storage(error.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|error| SessionError::Storage(error.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> SessionResult<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|error| SessionError::Storage(error.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Predicates the navigation guard evaluates.
pub trait SessionPredicates {
    fn is_authenticated(&self) -> bool;
    fn is_admin(&self) -> bool;
}

/// Shared, persisted session state.
pub struct SessionState {
    storage: Arc<dyn SessionPersistence>,
    current: RwLock<Option<Session>>,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SessionState")
            .field("current", &self.session())
            .finish_non_exhaustive()
    }
}

impl SessionState {
    /// Loads whatever session the storage holds.
    ///
    /// A stored user that no longer parses is dropped; the token is kept.
    pub fn restore(storage: Arc<dyn SessionPersistence>) -> SessionResult<Self> {
        let token = storage.get(TOKEN_KEY)?;
        let user = match storage.get(USER_KEY)? {
            Some(raw) => serde_json::from_str::<User>(&raw)
                .map_err(|error| {
                    tracing::warn!("Ignoring unreadable stored user: {}", error);
                })
                .ok(),
            None => None,
        };
        let current = token.map(|token| Session { token, user });

        Ok(Self {
            storage,
            current: RwLock::new(current),
        })
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.read().clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|session| session.token.clone())
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.read().as_ref().and_then(|session| session.user.clone())
    }

    /// Token currently held by durable storage, bypassing the in-memory copy.
    pub fn stored_token(&self) -> SessionResult<Option<String>> {
        self.storage.get(TOKEN_KEY)
    }

    pub fn set_auth(&self, token: impl Into<String>, user: User) -> SessionResult<()> {
        let token = token.into();
        self.storage.set(TOKEN_KEY, &token)?;
        self.storage.set(USER_KEY, &serde_json::to_string(&user)?)?;
        *self.write() = Some(Session {
            token,
            user: Some(user),
        });
        Ok(())
    }

    /// Replaces the stored user without touching the token.
    pub fn update_user(&self, user: User) -> SessionResult<()> {
        self.storage.set(USER_KEY, &serde_json::to_string(&user)?)?;
        if let Some(session) = self.write().as_mut() {
            session.user = Some(user);
        }
        Ok(())
    }

    /// Forgets the session in memory and in storage.
    ///
    /// Memory is cleared even when storage fails.
    pub fn clear(&self) -> SessionResult<()> {
        *self.write() = None;
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionPredicates for SessionState {
    fn is_authenticated(&self) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|session| !session.token.is_empty())
    }

    fn is_admin(&self) -> bool {
        self.read()
            .as_ref()
            .and_then(|session| session.user.as_ref())
            .is_some_and(User::is_admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn state() -> (Arc<MemoryPersistence>, SessionState) {
        let storage = Arc::new(MemoryPersistence::new());
        let state = SessionState::restore(storage.clone()).unwrap();
        (storage, state)
    }

    #[test]
    fn set_auth_persists_token_and_user() {
        let (storage, state) = state();
        state
            .set_auth("secret", User::new("ann", Role::Admin))
            .unwrap();

        assert!(state.is_authenticated());
        assert!(state.is_admin());
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("secret"));
        assert!(storage.get(USER_KEY).unwrap().unwrap().contains("ADMIN"));
    }

    #[test]
    fn restore_reads_persisted_values() {
        let storage = Arc::new(MemoryPersistence::new());
        storage.set(TOKEN_KEY, "persisted").unwrap();
        storage
            .set(USER_KEY, r#"{"username":"bob","role":"USER"}"#)
            .unwrap();

        let state = SessionState::restore(storage).unwrap();
        assert_eq!(state.token().as_deref(), Some("persisted"));
        assert_eq!(state.current_user().unwrap().username, "bob");
        assert!(!state.is_admin());
    }

    #[test]
    fn restore_tolerates_corrupt_user() {
        let storage = Arc::new(MemoryPersistence::new());
        storage.set(TOKEN_KEY, "persisted").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();

        let state = SessionState::restore(storage).unwrap();
        assert!(state.is_authenticated());
        assert!(state.current_user().is_none());
    }

    #[test]
    fn clear_removes_everything() {
        let (storage, state) = state();
        state.set_auth("secret", User::new("ann", Role::User)).unwrap();
        state.clear().unwrap();

        assert!(!state.is_authenticated());
        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
        assert!(storage.get(USER_KEY).unwrap().is_none());
    }

    #[test]
    fn update_user_keeps_token() {
        let (_, state) = state();
        state.set_auth("secret", User::new("ann", Role::User)).unwrap();
        state.update_user(User::new("ann2", Role::User)).unwrap();

        assert_eq!(state.token().as_deref(), Some("secret"));
        assert_eq!(state.current_user().unwrap().username, "ann2");
    }

    #[test]
    fn session_debug_redacts_token() {
        let session = Session {
            token: "secret-token".to_string(),
            user: None,
        };
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
