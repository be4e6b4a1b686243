//! # Notification Bus
//!
//! Publish-subscribe delivery of notifications between modules.
//!
//! ## Features
//!
//! - Subscriptions keyed by notification id
//! - Optional source filter per subscription
//! - Pausable subscriptions
//! - Delivery count returned to the publisher

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use spin::RwLock;

use crate::{FwkId, FwkResult, NotificationId};

// =============================================================================
// Notifications
// =============================================================================

/// Notification delivered to subscribers; carries no payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    /// Notification identifier
    pub id: NotificationId,
    /// Publisher, or [`FwkId::None`] for module-wide notifications
    pub source_id: FwkId,
}

impl Notification {
    /// Create a notification
    pub const fn new(id: NotificationId, source_id: FwkId) -> Self {
        Self { id, source_id }
    }
}

/// Anything that can deliver notifications
pub trait Notifier: Send + Sync {
    /// Deliver a notification, returning the number of subscribers reached
    fn notify(&self, notification: &Notification) -> FwkResult<usize>;
}

// =============================================================================
// Subscriptions
// =============================================================================

/// Notification handler function type
pub type NotificationHandler = Box<dyn Fn(&Notification) + Send + Sync>;

/// Subscription ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

struct Subscription {
    id: SubscriptionId,
    /// Subscriber name (for debugging)
    name: &'static str,
    notification: NotificationId,
    /// Only deliver notifications from this source
    source_filter: Option<FwkId>,
    handler: NotificationHandler,
    active: AtomicBool,
}

impl Subscription {
    fn matches(&self, notification: &Notification) -> bool {
        self.active.load(Ordering::Relaxed)
            && self.notification == notification.id
            && self
                .source_filter
                .map_or(true, |source| source == notification.source_id)
    }
}

// =============================================================================
// Notification Bus
// =============================================================================

/// Notification bus shared by all modules
pub struct NotificationBus {
    subscriptions: RwLock<Vec<Subscription>>,
    delivered: AtomicU64,
}

impl NotificationBus {
    /// Create an empty bus
    pub const fn new() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            delivered: AtomicU64::new(0),
        }
    }

    /// Subscribe to a notification from any source
    pub fn subscribe(
        &self,
        name: &'static str,
        notification: NotificationId,
        handler: NotificationHandler,
    ) -> SubscriptionId {
        self.insert(name, notification, None, handler)
    }

    /// Subscribe to a notification from a single source
    pub fn subscribe_from(
        &self,
        name: &'static str,
        notification: NotificationId,
        source: FwkId,
        handler: NotificationHandler,
    ) -> SubscriptionId {
        self.insert(name, notification, Some(source), handler)
    }

    fn insert(
        &self,
        name: &'static str,
        notification: NotificationId,
        source_filter: Option<FwkId>,
        handler: NotificationHandler,
    ) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscriptions.write().push(Subscription {
            id,
            name,
            notification,
            source_filter,
            handler,
            active: AtomicBool::new(true),
        });

        log::debug!("NotificationBus: '{}' subscribed as {:?}", name, id);
        id
    }

    /// Unsubscribe
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscriptions.write();
        if let Some(pos) = subs.iter().position(|s| s.id == id) {
            let sub = subs.remove(pos);
            log::debug!("NotificationBus: '{}' unsubscribed", sub.name);
            true
        } else {
            false
        }
    }

    /// Stop delivering to a subscription without removing it
    pub fn pause(&self, id: SubscriptionId) {
        if let Some(sub) = self.subscriptions.read().iter().find(|s| s.id == id) {
            sub.active.store(false, Ordering::Relaxed);
        }
    }

    /// Resume delivery to a paused subscription
    pub fn resume(&self, id: SubscriptionId) {
        if let Some(sub) = self.subscriptions.read().iter().find(|s| s.id == id) {
            sub.active.store(true, Ordering::Relaxed);
        }
    }

    /// Number of subscriptions
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Total number of deliveries so far
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

impl Notifier for NotificationBus {
    fn notify(&self, notification: &Notification) -> FwkResult<usize> {
        let subs = self.subscriptions.read();
        let mut count = 0;

        for sub in subs.iter().filter(|s| s.matches(notification)) {
            (sub.handler)(notification);
            count += 1;
        }

        self.delivered.fetch_add(count as u64, Ordering::Relaxed);
        Ok(count)
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("subscriptions", &self.subscription_count())
            .field("delivered", &self.delivered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use core::sync::atomic::AtomicUsize;

    const READY: NotificationId = NotificationId::new(4, 0);
    const OTHER: NotificationId = NotificationId::new(4, 1);

    fn counter_handler(counter: &Arc<AtomicUsize>) -> NotificationHandler {
        let counter = Arc::clone(counter);
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
    }

    #[test]
    fn test_notify_reaches_matching_subscribers() {
        let bus = NotificationBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        bus.subscribe("a", READY, counter_handler(&hits));
        bus.subscribe("b", READY, counter_handler(&hits));
        bus.subscribe("c", OTHER, counter_handler(&hits));

        let count = bus.notify(&Notification::new(READY, FwkId::None)).unwrap();
        assert_eq!(count, 2);
        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_source_filter() {
        let bus = NotificationBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        bus.subscribe_from("a", READY, FwkId::element(4, 1), counter_handler(&hits));

        let from_0 = Notification::new(READY, FwkId::element(4, 0));
        let from_1 = Notification::new(READY, FwkId::element(4, 1));
        assert_eq!(bus.notify(&from_0).unwrap(), 0);
        assert_eq!(bus.notify(&from_1).unwrap(), 1);
    }

    #[test]
    fn test_pause_and_unsubscribe() {
        let bus = NotificationBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let id = bus.subscribe("a", READY, counter_handler(&hits));
        let n = Notification::new(READY, FwkId::None);

        bus.pause(id);
        assert_eq!(bus.notify(&n).unwrap(), 0);
        bus.resume(id);
        assert_eq!(bus.notify(&n).unwrap(), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscription_count(), 0);
    }
}
