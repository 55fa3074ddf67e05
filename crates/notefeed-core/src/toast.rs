//! Single-slot transient notifications.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

#[derive(Default)]
struct Slot {
    toast: Option<Toast>,
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

/// Holds at most one toast and clears it after a fixed delay.
///
/// Showing a toast replaces the current one and restarts the delay; the
/// previous expiry is cancelled so it cannot clear the newer toast.
#[derive(Clone)]
pub struct ToastStore {
    ttl: Duration,
    slot: Arc<Mutex<Slot>>,
}

impl ToastStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn show(&self, message: impl Into<String>, kind: ToastKind) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = slot.expiry.take() {
            previous.abort();
        }
        slot.generation = slot.generation.wrapping_add(1);
        slot.toast = Some(Toast {
            message: message.into(),
            kind,
        });

        let generation = slot.generation;
        let shared = Arc::clone(&self.slot);
        let ttl = self.ttl;
        slot.expiry = match tokio::runtime::Handle::try_current() {
            Ok(handle) => Some(handle.spawn(async move {
                tokio::time::sleep(ttl).await;
                let mut slot = shared.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.generation == generation {
                    slot.toast = None;
                    slot.expiry = None;
                }
            })),
            Err(_) => {
                tracing::debug!("No async runtime; toast will persist until replaced");
                None
            }
        };
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Info);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Error);
    }

    #[must_use]
    pub fn current(&self) -> Option<Toast> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .toast
            .clone()
    }

    pub fn dismiss(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(expiry) = slot.expiry.take() {
            expiry.abort();
        }
        slot.generation = slot.generation.wrapping_add(1);
        slot.toast = None;
    }
}
