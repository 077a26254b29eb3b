//! Cooperative stop signal
//!
//! The mechanism has two halves, a `Broadcaster` and any number of `Watcher`
//! instances. The `Broadcaster` fires exactly once, either by calling
//! [`Broadcaster::signal`] or by being dropped. Every `Watcher` then observes
//! the stop, both by awaiting [`Watcher::recv`] and by polling
//! [`Watcher::is_signaled`] at safe points.

use tokio::sync::watch;
use tracing::debug;

/// Construct a `Watcher` and `Broadcaster` pair.
#[must_use]
pub fn signal() -> (Watcher, Broadcaster) {
    let (sender, receiver) = watch::channel(false);
    (Watcher { receiver }, Broadcaster { sender })
}

#[derive(Debug)]
/// Fires the stop signal for every `Watcher`.
pub struct Broadcaster {
    sender: watch::Sender<bool>,
}

impl Broadcaster {
    /// Send the stop signal. Does not wait for watchers to react.
    pub fn signal(self) {
        debug!(watchers = self.sender.receiver_count(), "signaling stop");
        // No watchers left is not an error, there is nobody to stop.
        let _ = self.sender.send(true);
    }
}

#[derive(Debug, Clone)]
/// Observes the stop signal.
pub struct Watcher {
    receiver: watch::Receiver<bool>,
}

impl Watcher {
    /// Wait for the stop signal. Returns immediately once it has been sent.
    pub async fn recv(&mut self) {
        // An `Err` means the `Broadcaster` is gone, which is a stop as well.
        let _ = self.receiver.wait_for(|stopped| *stopped).await;
    }

    /// Check for the stop signal without blocking.
    #[must_use]
    pub fn is_signaled(&self) -> bool {
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }
}
