//! # SCP Hardware Access Layer
//!
//! Low-level access to memory-mapped peripherals.
//!
//! ## Modules
//!
//! - [`mmio`]: bounds-checked volatile word access to a memory region
//! - [`poll`]: busy-wait helpers with an optional iteration bound
//! - [`mgi`]: the SMCF Monitor Group Instance register block
//!
//! ## Safety
//!
//! Creating a region or a register block from an address is `unsafe`: the
//! caller vouches that the address maps the device (or memory) for as long
//! as the handle lives. Every access after that is safe and checked.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod mgi;
pub mod mmio;
pub mod poll;

pub use mgi::Mgi;
pub use mmio::{VolatileRegion, WordSource};
pub use poll::PollPolicy;
