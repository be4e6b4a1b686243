//! # System Monitoring Control Framework
//!
//! Driver for SMCF monitor groups (MGIs). Each group holds several monitors
//! that are sampled together; a sample record is a short header followed by
//! every monitor's data, written either into the group's own registers or to
//! RAM over DMA.
//!
//! ## Components
//!
//! - [`header`]: the header field selection
//! - [`utils`]: sizing of consecutive records in RAM
//! - [`data`]: layout resolution and the consistent sample read
//! - [`irq`]: interrupt source dispatch
//! - [`driver`]: the framework module exposing the data, control and
//!   interrupt APIs
//!
//! ## Reading samples
//!
//! Hardware rewrites records without any lock. A read checks the record's
//! sample count before and after copying and fails with
//! [`scp_core::FwkError::State`] if the record was not ready or changed under
//! it. Reads are never retried internally.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

pub mod api;
pub mod config;
pub mod data;
pub mod driver;
pub mod header;
pub mod irq;
pub mod utils;

pub use api::{SmcfApi, SmcfApiIdx, SmcfControlApi, SmcfDataApi, SmcfInterruptApi};
pub use config::{DataConfig, DataLocation, RamRegion, SmcfElementConfig};
pub use data::{DataLayout, SampleLayout};
pub use driver::{
    ElementState, Smcf, EVENT_IDX_NEW_DATA_SAMPLE, NOTIFICATION_IDX_NEW_DATA_SAMPLE_READY,
};
pub use header::HeaderFormat;
pub use utils::next_record_offset;
