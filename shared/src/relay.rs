//! Fan-out event streaming over unbounded channels.
//!
//! A [`Relay`] is held by whoever emits an event (a provider announcing that
//! its variables changed); every interested party subscribes and receives
//! each event on its own stream.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use std::sync::{Arc, Mutex, PoisonError};

/// Event relay delivering each sent value to every live subscriber.
///
/// # Event-Source Naming Convention
///
/// Relays follow the `{source}_{event}_relay` pattern, e.g.
/// `variables_changed_relay`.
///
/// # Examples
///
/// ```rust
/// use futures::StreamExt;
/// use shared::relay;
///
/// # futures::executor::block_on(async {
/// let variables_changed_relay = relay::<()>();
/// let mut changes = variables_changed_relay.subscribe();
///
/// variables_changed_relay.send(());
/// assert_eq!(changes.next().await, Some(()));
/// # });
/// ```
#[derive(Debug)]
pub struct Relay<T>
where
    T: Clone + Send + 'static,
{
    subscribers: Arc<Mutex<Vec<UnboundedSender<T>>>>,
}

impl<T> Clone for Relay<T>
where
    T: Clone + Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

/// Error type for Relay operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Every subscriber has been dropped
    NoSubscribers,
}

impl<T> Relay<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Open a new stream that receives every event sent after this call.
    pub fn subscribe(&self) -> UnboundedReceiver<T> {
        let (sender, receiver) = unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender);
        receiver
    }

    /// Send an event to all subscribers.
    ///
    /// Subscribers whose receiver was dropped are pruned. If nobody is
    /// listening the event is silently discarded; use `try_send()` to find out.
    pub fn send(&self, value: T) {
        let _ = self.try_send(value);
    }

    /// Send an event, reporting when there was nobody left to receive it.
    pub fn try_send(&self, value: T) -> Result<(), RelayError> {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|sender| sender.unbounded_send(value.clone()).is_ok());
        if subscribers.is_empty() {
            Err(RelayError::NoSubscribers)
        } else {
            Ok(())
        }
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|sender| !sender.is_closed());
        subscribers.len()
    }
}

impl<T> Default for Relay<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a new Relay with no subscribers yet.
pub fn relay<T>() -> Relay<T>
where
    T: Clone + Send + 'static,
{
    Relay::new()
}
