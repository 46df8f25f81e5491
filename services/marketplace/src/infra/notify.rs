use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};

use phonemart_domain::id::UserId;

use crate::domain::types::Notification;

/// In-process fan-out of notifications to connected clients.
///
/// Delivery is at-most-once: events published while nobody listens are dropped, and a
/// receiver that falls more than `capacity` events behind skips the ones it missed.
#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Arc<Notification>>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Returns the number of connections the event was handed to.
    pub fn publish(&self, notification: Notification) -> usize {
        let event = notification.event.name();
        match self.tx.send(Arc::new(notification)) {
            Ok(receivers) => {
                tracing::debug!(event, receivers, "notification published");
                receivers
            }
            Err(_) => {
                tracing::debug!(event, "notification dropped, no listeners");
                0
            }
        }
    }

    pub fn subscribe(&self, user: UserId) -> Subscription {
        Subscription {
            user,
            rx: self.tx.subscribe(),
        }
    }
}

/// One connection's view of the hub: its own events plus broadcasts.
pub struct Subscription {
    user: UserId,
    rx: broadcast::Receiver<Arc<Notification>>,
}

impl Subscription {
    /// Next notification addressed to this user; `None` once the hub is gone.
    pub async fn next(&mut self) -> Option<Arc<Notification>> {
        loop {
            match self.rx.recv().await {
                Ok(notification) if notification.is_for(self.user) => return Some(notification),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id = %self.user, skipped, "notification receiver lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
