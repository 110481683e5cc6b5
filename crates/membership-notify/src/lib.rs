//! Notification side-channel for the membership-management API
//!
//! After every successful write the API publishes exactly one message on a
//! fixed broker channel so that other subscribers can react to content
//! changes. Delivery is fire-and-forget with at-least-once semantics: a
//! failed dispatch is logged and dropped, never rolled back into the
//! preceding mutation and never surfaced to the HTTP caller.
//!
//! The counting consumer binary (`membership-counter`) subscribes to the
//! same channel and keeps process-local aggregate counts.

pub mod counts;
pub mod message;
pub mod publisher;

pub use counts::ResourceCounts;
pub use message::{ContentAction, Notification, Operation, Resource};
pub use publisher::{InMemoryPublisher, NotificationPublisher, RedisPublisher, TracingPublisher};

/// Broker channel the API publishes to and the counter subscribes on.
pub const DEFAULT_CHANNEL: &str = "membership.notifications";
