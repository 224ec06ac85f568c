//! Event bus implementation
//!
//! Publish/subscribe over topic patterns. The in-memory bus fans each event
//! out to every subscription whose pattern matches and to every registered
//! handler, each handler running on its own task.

use crate::types::Event;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

/// Event bus error types.
#[derive(Debug, Error)]
pub enum EventBusError {
    /// Failed to publish event
    #[error("Failed to publish event: {0}")]
    PublishError(String),

    /// Failed to subscribe
    #[error("Failed to subscribe: {0}")]
    SubscribeError(String),

    /// Subscription ID is not known to this bus
    #[error("Unknown subscription: {0}")]
    UnknownSubscription(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Channel closed
    #[error("Channel closed")]
    ChannelClosed,
}

impl From<serde_json::Error> for EventBusError {
    fn from(err: serde_json::Error) -> Self {
        EventBusError::SerializationError(err.to_string())
    }
}

/// Result type for event bus operations.
pub type EventBusResult<T> = Result<T, EventBusError>;

/// Subscription handle for receiving events.
pub struct Subscription {
    /// Subscription ID
    pub id: String,
    /// Topic pattern
    pub topic: String,
    /// Event receiver
    pub receiver: broadcast::Receiver<Event>,
}

impl Subscription {
    /// Receive the next event.
    ///
    /// A receiver that fell behind skips the dropped events and keeps going.
    pub async fn recv(&mut self) -> EventBusResult<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Ok(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "Subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(EventBusError::ChannelClosed),
            }
        }
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }
}

/// Event handler trait for processing events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle an event.
    async fn handle(&self, event: Event) -> EventBusResult<()>;

    /// Get the topics this handler is interested in.
    fn topics(&self) -> Vec<String>;
}

/// Event bus trait for publish/subscribe operations.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an event.
    async fn publish(&self, event: Event) -> EventBusResult<()>;

    /// Subscribe to a topic pattern.
    ///
    /// Topic patterns support wildcards:
    /// - `*` matches any single segment
    /// - `#` matches zero or more segments
    ///
    /// Examples:
    /// - `billing.subscription.*` matches every subscription event from webhooks
    /// - `#.reverted_to_free` matches reverts from any source
    async fn subscribe(&self, topic: &str) -> EventBusResult<Subscription>;

    /// Register an event handler.
    async fn register_handler(&self, handler: Arc<dyn EventHandler>) -> EventBusResult<()>;

    /// Unsubscribe by subscription ID.
    async fn unsubscribe(&self, subscription_id: &str) -> EventBusResult<()>;

    /// Get event bus stats.
    async fn stats(&self) -> EventBusStats;
}

/// Event bus statistics.
#[derive(Debug, Clone, Default)]
pub struct EventBusStats {
    /// Total events published
    pub events_published: u64,
    /// Total deliveries to subscriptions and handlers
    pub events_delivered: u64,
    /// Active subscriptions
    pub active_subscriptions: usize,
    /// Registered handlers
    pub registered_handlers: usize,
}

/// In-memory event bus implementation.
///
/// Suitable for a single process and for tests.
pub struct MemoryEventBus {
    /// Topic pattern -> channel
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<Event>>>>,
    /// Subscription ID -> topic pattern. Locked only while `channels` is
    /// held for writing.
    subscriptions: Arc<RwLock<HashMap<String, String>>>,
    /// Registered handlers
    handlers: Arc<RwLock<Vec<Arc<dyn EventHandler>>>>,
    /// Statistics
    stats: Arc<RwLock<EventBusStats>>,
    /// Default channel capacity
    channel_capacity: usize,
}

impl std::fmt::Debug for MemoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventBus")
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

impl MemoryEventBus {
    /// Create a new in-memory event bus.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create with custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            handlers: Arc::new(RwLock::new(Vec::new())),
            stats: Arc::new(RwLock::new(EventBusStats::default())),
            channel_capacity: capacity.max(1),
        }
    }

    /// Check if a topic matches a pattern.
    pub fn topic_matches(pattern: &str, topic: &str) -> bool {
        let pattern: Vec<&str> = pattern.split('.').collect();
        let topic: Vec<&str> = topic.split('.').collect();
        Self::segments_match(&pattern, &topic)
    }

    fn segments_match(pattern: &[&str], topic: &[&str]) -> bool {
        match pattern.split_first() {
            None => topic.is_empty(),
            Some((&"#", rest)) => (0..=topic.len()).any(|skip| Self::segments_match(rest, &topic[skip..])),
            Some((&"*", rest)) => !topic.is_empty() && Self::segments_match(rest, &topic[1..]),
            Some((segment, rest)) => {
                topic.first() == Some(segment) && Self::segments_match(rest, &topic[1..])
            }
        }
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(&self, event: Event) -> EventBusResult<()> {
        let topic = event.topic();
        let mut delivered = 0u64;

        {
            let channels = self.channels.read().await;
            for (pattern, sender) in channels.iter() {
                if Self::topic_matches(pattern, &topic) {
                    // Err only means every receiver on this pattern is gone
                    if let Ok(receivers) = sender.send(event.clone()) {
                        delivered += receivers as u64;
                    }
                }
            }
        }

        {
            let handlers = self.handlers.read().await;
            for handler in handlers.iter() {
                if handler
                    .topics()
                    .iter()
                    .any(|handler_topic| Self::topic_matches(handler_topic, &topic))
                {
                    let handler = handler.clone();
                    let event = event.clone();
                    delivered += 1;
                    tokio::task::spawn(async move {
                        let event_id = event.id;
                        if let Err(e) = handler.handle(event).await {
                            tracing::error!(event_id = %event_id, error = %e, "Event handler failed");
                        }
                    });
                }
            }
        }

        let mut stats = self.stats.write().await;
        stats.events_published += 1;
        stats.events_delivered += delivered;

        tracing::debug!(topic = %topic, event_id = %event.id, delivered, "Event published");

        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> EventBusResult<Subscription> {
        if topic.trim().is_empty() {
            return Err(EventBusError::SubscribeError("empty topic pattern".to_string()));
        }

        let id = uuid::Uuid::now_v7().to_string();

        let receiver = {
            let mut channels = self.channels.write().await;
            let receiver = match channels.get(topic) {
                Some(sender) => sender.subscribe(),
                None => {
                    let (sender, receiver) = broadcast::channel(self.channel_capacity);
                    channels.insert(topic.to_string(), sender);
                    receiver
                }
            };
            self.subscriptions
                .write()
                .await
                .insert(id.clone(), topic.to_string());
            receiver
        };

        self.stats.write().await.active_subscriptions += 1;

        Ok(Subscription {
            id,
            topic: topic.to_string(),
            receiver,
        })
    }

    async fn register_handler(&self, handler: Arc<dyn EventHandler>) -> EventBusResult<()> {
        self.handlers.write().await.push(handler);
        self.stats.write().await.registered_handlers += 1;
        Ok(())
    }

    async fn unsubscribe(&self, subscription_id: &str) -> EventBusResult<()> {
        {
            let mut channels = self.channels.write().await;
            let mut subscriptions = self.subscriptions.write().await;

            let topic = subscriptions
                .remove(subscription_id)
                .ok_or_else(|| EventBusError::UnknownSubscription(subscription_id.to_string()))?;

            if !subscriptions.values().any(|t| *t == topic) {
                channels.remove(&topic);
            }
        }

        let mut stats = self.stats.write().await;
        stats.active_subscriptions = stats.active_subscriptions.saturating_sub(1);
        Ok(())
    }

    async fn stats(&self) -> EventBusStats {
        self.stats.read().await.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventSource, SubscriptionEvent};
    use folio_plans::PlanTier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn reverted() -> Event {
        SubscriptionEvent::RevertedToFree { previous: PlanTier::Pro }
            .to_event(EventSource::Scheduler)
            .unwrap()
    }

    #[tokio::test]
    async fn test_memory_event_bus_publish_subscribe() {
        let bus = MemoryEventBus::new();
        let mut sub = bus.subscribe("scheduler.subscription.*").await.unwrap();

        bus.publish(reverted()).await.unwrap();

        let received = tokio::time::timeout(Duration::from_millis(100), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.event_type, "subscription.reverted_to_free");
    }

    #[test]
    fn test_topic_matching() {
        // Exact match
        assert!(MemoryEventBus::topic_matches(
            "billing.subscription.upgraded",
            "billing.subscription.upgraded"
        ));

        // Single wildcard
        assert!(MemoryEventBus::topic_matches("billing.subscription.*", "billing.subscription.upgraded"));
        assert!(MemoryEventBus::topic_matches("*.subscription.upgraded", "dashboard.subscription.upgraded"));

        // Multi-segment wildcard
        assert!(MemoryEventBus::topic_matches("billing.#", "billing.subscription.upgraded"));
        assert!(MemoryEventBus::topic_matches("#", "billing.subscription.upgraded"));
        assert!(MemoryEventBus::topic_matches("#.reverted_to_free", "scheduler.subscription.reverted_to_free"));
        assert!(MemoryEventBus::topic_matches("billing.#.upgraded", "billing.subscription.upgraded"));

        // Non-matches
        assert!(!MemoryEventBus::topic_matches("billing.subscription.*", "billing.subscription"));
        assert!(!MemoryEventBus::topic_matches("dashboard.#", "billing.subscription.upgraded"));
        assert!(!MemoryEventBus::topic_matches("*.upgraded", "billing.subscription.upgraded"));
    }

    #[tokio::test]
    async fn test_stats() {
        let bus = MemoryEventBus::new();

        let stats = bus.stats().await;
        assert_eq!(stats.events_published, 0);
        assert_eq!(stats.active_subscriptions, 0);

        let _sub = bus.subscribe("#").await.unwrap();
        assert_eq!(bus.stats().await.active_subscriptions, 1);

        bus.publish(reverted()).await.unwrap();

        let stats = bus.stats().await;
        assert_eq!(stats.events_published, 1);
        assert_eq!(stats.events_delivered, 1);
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let bus = MemoryEventBus::new();
        let sub = bus.subscribe("#").await.unwrap();

        bus.unsubscribe(&sub.id).await.unwrap();
        assert_eq!(bus.stats().await.active_subscriptions, 0);
        assert!(matches!(
            bus.unsubscribe(&sub.id).await,
            Err(EventBusError::UnknownSubscription(_))
        ));

        bus.publish(reverted()).await.unwrap();
        assert_eq!(bus.stats().await.events_delivered, 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_keeps_shared_channel() {
        let bus = MemoryEventBus::new();
        let first = bus.subscribe("scheduler.#").await.unwrap();
        let mut second = bus.subscribe("scheduler.#").await.unwrap();

        bus.unsubscribe(&first.id).await.unwrap();
        bus.publish(reverted()).await.unwrap();
        assert!(second.try_recv().is_some());

        bus.unsubscribe(&second.id).await.unwrap();
        let mut third = bus.subscribe("scheduler.#").await.unwrap();
        bus.publish(reverted()).await.unwrap();
        assert!(third.try_recv().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_resubscribe_during_unsubscribe_receives() {
        let bus = Arc::new(MemoryEventBus::new());

        for _ in 0..200 {
            let old = bus.subscribe("scheduler.#").await.unwrap();

            let leaving = {
                let bus = bus.clone();
                tokio::spawn(async move { bus.unsubscribe(&old.id).await })
            };
            let joining = {
                let bus = bus.clone();
                tokio::spawn(async move { bus.subscribe("scheduler.#").await })
            };

            leaving.await.unwrap().unwrap();
            let mut joined = joining.await.unwrap().unwrap();

            bus.publish(reverted()).await.unwrap();
            assert!(joined.try_recv().is_some());

            bus.unsubscribe(&joined.id).await.unwrap();
        }

        assert_eq!(bus.stats().await.active_subscriptions, 0);
    }

    #[tokio::test]
    async fn test_empty_topic_rejected() {
        let bus = MemoryEventBus::new();
        assert!(matches!(
            bus.subscribe(" ").await,
            Err(EventBusError::SubscribeError(_))
        ));
    }

    struct CountingHandler {
        seen: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _event: Event) -> EventBusResult<()> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn topics(&self) -> Vec<String> {
            vec!["*.subscription.reverted_to_free".to_string(), "#".to_string()]
        }
    }

    #[tokio::test]
    async fn test_handler_runs_once_per_event() {
        let bus = MemoryEventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));
        bus.register_handler(Arc::new(CountingHandler { seen: seen.clone() }))
            .await
            .unwrap();

        bus.publish(reverted()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        let stats = bus.stats().await;
        assert_eq!(stats.registered_handlers, 1);
        assert_eq!(stats.events_delivered, 1);
    }
}
