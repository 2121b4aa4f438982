//! User-facing notifications.
//!
//! Cart failures are shown to the user as short messages. The cart only
//! hands them to a [`Notifier`]; how they reach the user is up to the caller.

use std::sync::{Arc, Mutex, PoisonError};

/// Fire-and-forget sink for error messages meant for the user.
pub trait Notifier: Send + Sync {
    /// Show an error message.
    fn error(&self, message: &str);
}

impl<T: Notifier> Notifier for Arc<T> {
    fn error(&self, message: &str) {
        (**self).error(message);
    }
}

/// Reports messages as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(notification = %message, "Cart notification");
    }
}

/// Keeps every message in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return all messages received so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for MemoryNotifier {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
