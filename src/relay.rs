//! Real-time fan-out of list changes.
//!
//! Route handlers publish [`ListEvent`]s on a per-list channel after the
//! database write commits. Subscribers (the SSE endpoint) receive them through
//! a bounded `tokio::sync::broadcast` queue, so a slow subscriber lags and
//! skips events instead of blocking publishers.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, warn};

use crate::models::Item;

/// Change notifications published on a list channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// An item was created.
    ItemAdded(Item),
    /// An item's completion flag changed.
    ItemUpdated {
        /// Affected item.
        item_id: i32,
        /// New completion state.
        completed: bool,
    },
    /// An item was removed.
    ItemDeleted {
        /// Removed item.
        item_id: i32,
    },
    /// The list itself was removed.
    ListDeleted {
        /// Removed list.
        list_id: i32,
    },
    /// A collaborator lost access to the list.
    AccessRevoked {
        /// User whose grant was removed.
        user_id: i32,
    },
}

impl ListEvent {
    /// Event name carried on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ItemAdded(_) => "item-added",
            Self::ItemUpdated { .. } => "item-updated",
            Self::ItemDeleted { .. } => "item-deleted",
            Self::ListDeleted { .. } => "list-deleted",
            Self::AccessRevoked { .. } => "access-revoked",
        }
    }

    /// Whether a subscriber acting as `user_id` loses sight of the list once
    /// this event is delivered.
    #[must_use]
    pub const fn closes_stream_for(&self, user_id: i32) -> bool {
        match self {
            Self::ListDeleted { .. } => true,
            Self::AccessRevoked { user_id: revoked } => *revoked == user_id,
            Self::ItemAdded(_) | Self::ItemUpdated { .. } | Self::ItemDeleted { .. } => false,
        }
    }

    /// JSON payload delivered with the event.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::ItemAdded(item) => json!(item),
            Self::ItemUpdated { item_id, completed } => {
                json!({ "itemId": item_id, "completed": completed })
            }
            Self::ItemDeleted { item_id } => json!({ "itemId": item_id }),
            Self::ListDeleted { list_id } => json!({ "listId": list_id }),
            Self::AccessRevoked { user_id } => json!({ "userId": user_id }),
        }
    }
}

/// Channel name for a list.
///
/// # Examples
///
/// ```
/// use lista::relay::channel_name;
///
/// assert_eq!(channel_name(7), "list-7");
/// ```
#[must_use]
pub fn channel_name(list_id: i32) -> String { format!("list-{list_id}") }

/// Errors returned by relay adapters.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// No relay is configured for this runtime.
    #[error("relay unavailable")]
    Unavailable,
}

/// Publish/subscribe transport for list events.
#[async_trait]
pub trait Relay: Send + Sync {
    /// Deliver `event` to every current subscriber of `channel`.
    ///
    /// Returns the number of subscribers reached; zero is not an error.
    ///
    /// # Errors
    /// Returns [`RelayError::Unavailable`] if the adapter cannot deliver.
    async fn publish(&self, channel: &str, event: ListEvent) -> Result<usize, RelayError>;

    /// Open a subscription on `channel`.
    ///
    /// # Errors
    /// Returns [`RelayError::Unavailable`] if the adapter cannot subscribe.
    async fn subscribe(&self, channel: &str) -> Result<broadcast::Receiver<ListEvent>, RelayError>;
}

/// In-process relay backed by one broadcast queue per channel.
///
/// Channels whose subscribers have all gone are dropped when the next
/// subscription opens or when a publish finds nobody listening.
pub struct BroadcastRelay {
    capacity: usize,
    channels: RwLock<HashMap<String, broadcast::Sender<ListEvent>>>,
}

impl BroadcastRelay {
    /// Create a relay buffering up to `capacity` events per channel.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Number of channels that currently have a queue.
    pub async fn channel_count(&self) -> usize { self.channels.read().await.len() }

    async fn prune(&self, channel: &str) {
        let mut channels = self.channels.write().await;
        if channels
            .get(channel)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            channels.remove(channel);
            debug!(channel, "dropped idle relay channel");
        }
    }
}

#[async_trait]
impl Relay for BroadcastRelay {
    async fn publish(&self, channel: &str, event: ListEvent) -> Result<usize, RelayError> {
        let sender = self.channels.read().await.get(channel).cloned();
        let Some(sender) = sender else {
            return Ok(0);
        };
        if let Ok(reached) = sender.send(event) {
            Ok(reached)
        } else {
            self.prune(channel).await;
            Ok(0)
        }
    }

    async fn subscribe(&self, channel: &str) -> Result<broadcast::Receiver<ListEvent>, RelayError> {
        let mut channels = self.channels.write().await;
        let before = channels.len();
        channels.retain(|_, tx| tx.receiver_count() > 0);
        if channels.len() < before {
            debug!(dropped = before - channels.len(), "swept idle relay channels");
        }
        let sender = channels
            .entry(channel.to_owned())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Ok(sender.subscribe())
    }
}

/// Relay used when real-time delivery is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRelay;

#[async_trait]
impl Relay for NoopRelay {
    async fn publish(&self, _channel: &str, _event: ListEvent) -> Result<usize, RelayError> {
        Err(RelayError::Unavailable)
    }

    async fn subscribe(&self, _channel: &str) -> Result<broadcast::Receiver<ListEvent>, RelayError> {
        Err(RelayError::Unavailable)
    }
}

/// Publish `event` for `list_id`, logging rather than propagating failures.
pub async fn notify(relay: &Arc<dyn Relay>, list_id: i32, event: ListEvent) {
    let channel = channel_name(list_id);
    let name = event.name();
    match relay.publish(&channel, event).await {
        Ok(reached) => debug!(channel, event = name, reached, "published list event"),
        Err(err) => warn!(channel, event = name, error = %err, "failed to publish list event"),
    }
}
