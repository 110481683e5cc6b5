//! Notification publishers
//!
//! The services talk to a [`NotificationPublisher`] trait object; the
//! concrete sink is chosen at startup. Publishing never blocks the request
//! path beyond a channel send and never fails the surrounding operation.

use std::sync::Mutex;

use redis::AsyncCommands;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::Notification;

/// Fire-and-forget sink for notifications.
pub trait NotificationPublisher: Send + Sync {
    /// Hand a notification to the sink. Must not block and must not fail;
    /// delivery problems are the sink's own concern.
    fn publish(&self, notification: Notification);
}

/// Publishes notifications on a Redis pub/sub channel.
///
/// `publish` enqueues on an unbounded channel; a background task owns the
/// Redis connection and drains the queue. A broken connection is dropped and
/// re-established on the next message; notifications that cannot be
/// delivered are logged and lost (best-effort, at-least-once for whatever
/// reaches the broker).
pub struct RedisPublisher {
    tx: mpsc::UnboundedSender<Notification>,
}

impl RedisPublisher {
    /// Validate the URL, spawn the background dispatch task and return the
    /// handle the services publish through.
    pub fn spawn(redis_url: &str, channel: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(dispatch_loop(client, channel.to_string(), rx));

        Ok(Self { tx })
    }
}

impl NotificationPublisher for RedisPublisher {
    fn publish(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            warn!("Notification dispatch task is gone, dropping notification");
        }
    }
}

async fn dispatch_loop(
    client: redis::Client,
    channel: String,
    mut rx: mpsc::UnboundedReceiver<Notification>,
) {
    let mut conn: Option<redis::aio::MultiplexedConnection> = None;

    while let Some(notification) = rx.recv().await {
        let payload = match serde_json::to_string(&notification) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode notification: {}", e);
                continue;
            }
        };

        if conn.is_none() {
            match client.get_multiplexed_async_connection().await {
                Ok(c) => conn = Some(c),
                Err(e) => {
                    warn!("Redis unavailable, dropping notification: {}", e);
                    continue;
                }
            }
        }

        if let Some(c) = conn.as_mut() {
            match c.publish::<_, _, i64>(&channel, &payload).await {
                Ok(receivers) => {
                    debug!(
                        "Published notification to {} subscriber(s): {}",
                        receivers, payload
                    );
                }
                Err(e) => {
                    warn!("Failed to publish notification: {}", e);
                    conn = None;
                }
            }
        }
    }
}

/// Publisher used when no broker is configured: notifications only show up
/// in the server logs.
#[derive(Debug, Default)]
pub struct TracingPublisher;

impl NotificationPublisher for TracingPublisher {
    fn publish(&self, notification: Notification) {
        info!("Notification (no broker configured): {:?}", notification);
    }
}

/// Publisher that records every notification in memory. Test support.
#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    messages: Mutex<Vec<Notification>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, in order.
    pub fn sent(&self) -> Vec<Notification> {
        self.messages.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

impl NotificationPublisher for InMemoryPublisher {
    fn publish(&self, notification: Notification) {
        self.messages.lock().unwrap().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Operation, Resource};
    use uuid::Uuid;

    #[test]
    fn in_memory_publisher_records_in_order() {
        let publisher = InMemoryPublisher::new();
        let team = Uuid::new_v4();

        publisher.publish(Notification::created(Resource::Team, team));
        publisher.publish(Notification::operation(
            Resource::Team,
            Operation::TeamRenamed,
            team,
        ));

        let sent = publisher.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], Notification::created(Resource::Team, team));

        publisher.clear();
        assert!(publisher.sent().is_empty());
    }
}
