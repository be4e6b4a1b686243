//! # Framework IPC
//!
//! Communication between firmware modules.
//!
//! ## Components
//!
//! - **Event queue**: bounded FIFO of light events, safe to post from
//!   interrupt context
//! - **Notification bus**: broadcast of notifications to subscribed modules
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scp_core::ipc::{EventQueue, EventSink, LightEvent, NotificationBus, Notification};
//!
//! // Interrupt context: defer the work
//! queue.put_event(LightEvent::new(event_id, source, target))?;
//!
//! // Main loop: process deferred events, raise notifications
//! while let Some(event) = queue.pop() {
//!     module.process_event(&event)?;
//! }
//!
//! // Subscribe to a notification
//! bus.subscribe("consumer", notification_id, Box::new(|n| { /* ... */ }));
//! ```

pub mod event_queue;
pub mod notification;

pub use event_queue::{EventQueue, EventSink, LightEvent, DEFAULT_EVENT_QUEUE_DEPTH};
pub use notification::{
    Notification, NotificationBus, NotificationHandler, Notifier, SubscriptionId,
};
