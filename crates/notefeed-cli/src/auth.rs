//! CLI session persistence in the OS keychain, one entry per profile and key.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use notefeed_core::session::{SessionError, SessionPersistence, SessionResult};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "notefeed-cli";

#[derive(Debug, Clone)]
pub struct KeyringPersistence {
    profile: String,
}

impl KeyringPersistence {
    pub fn new(profile_name: &str) -> Self {
        Self {
            profile: profile_name.to_string(),
        }
    }

    fn username(&self, key: &str) -> String {
        format!("{}:{key}", self.profile)
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self, key: &str) -> SessionResult<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username(key))
            .map_err(|error| SessionError::Storage(error.to_string()))
    }
}

impl SessionPersistence for KeyringPersistence {
    #[cfg(not(test))]
    fn get(&self, key: &str) -> SessionResult<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(SessionError::Storage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn get(&self, key: &str) -> SessionResult<Option<String>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| SessionError::Storage(error.to_string()))?;
        Ok(guard.get(&self.username(key)).cloned())
    }

    #[cfg(not(test))]
    fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|error| SessionError::Storage(error.to_string()))
    }

    #[cfg(test)]
    fn set(&self, key: &str, value: &str) -> SessionResult<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| SessionError::Storage(error.to_string()))?;
        guard.insert(self.username(key), value.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn remove(&self, key: &str) -> SessionResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(SessionError::Storage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn remove(&self, key: &str) -> SessionResult<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| SessionError::Storage(error.to_string()))?;
        guard.remove(&self.username(key));
        Ok(())
    }
}
