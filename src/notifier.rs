//! Publish/subscribe primitive for language-change events.

use std::sync::{
    Mutex,
    MutexGuard,
    PoisonError,
};

use tokio::sync::watch;

use crate::types::LanguageChangeEvent;

/// Broadcasts a [`LanguageChangeEvent`] to every subscriber whenever the
/// active language finishes changing.
///
/// Built on a watch channel, so a subscriber attached after a change has
/// already happened immediately observes the most recent event
/// (replay-last-1) instead of racing initialization. Subscribers are
/// independent; closing the notifier terminates all of them.
#[derive(Debug)]
pub struct LanguageChangeNotifier {
    sender: Mutex<Option<watch::Sender<Option<LanguageChangeEvent>>>>,
    receiver: watch::Receiver<Option<LanguageChangeEvent>>,
}

impl LanguageChangeNotifier {
    /// Creates a notifier with no event published yet.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(None);
        Self { sender: Mutex::new(Some(sender)), receiver }
    }

    /// A new independent subscription.
    ///
    /// The subscription's current value holds the most recent event, or
    /// `None` when no language change has completed yet.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<LanguageChangeEvent>> {
        self.receiver.clone()
    }

    /// Publishes `event` to all current subscribers. No-op once closed.
    pub(crate) fn emit(&self, event: LanguageChangeEvent) {
        if let Some(sender) = self.lock_sender().as_ref() {
            tracing::debug!(lang = %event.lang, "Emitting language change");
            sender.send_replace(Some(event));
        }
    }

    /// Stops emitting and terminates every outstanding subscription.
    pub(crate) fn close(&self) {
        self.lock_sender().take();
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock_sender().is_none()
    }

    fn lock_sender(&self) -> MutexGuard<'_, Option<watch::Sender<Option<LanguageChangeEvent>>>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LanguageChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
