//! # SCP Framework Core
//!
//! The framework layer every firmware module is written against. It is kept
//! deliberately small: modules receive their configuration, talk to each
//! other through identifiers and light events, and publish notifications to
//! whoever subscribed.
//!
//! ## Components
//!
//! - **Status**: [`FwkError`] and [`FwkResult`], shared by every module
//! - **Identifiers**: [`FwkId`] for modules, elements and sub-elements, plus
//!   typed event, notification and API identifiers
//! - **IPC**: a bounded light-event queue and a notification bus
//! - **Interrupts**: routing of interrupt lines to registered handlers
//! - **Module lifecycle**: the [`module::FwkModule`] trait
//!
//! ## Execution Model
//!
//! Firmware runs a single cooperative thread. Interrupt handlers only post
//! light events; the events are processed later from the main loop, which is
//! where notifications are raised.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

pub mod error;
pub mod id;
pub mod interrupts;
pub mod ipc;
pub mod module;

pub use error::{FwkError, FwkResult};
pub use id::{ApiId, EventId, FwkId, IdType, NotificationId};
