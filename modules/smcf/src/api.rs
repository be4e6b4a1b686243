//! # SMCF APIs
//!
//! Other modules bind to one of three APIs:
//!
//! | Index | API         | Used by                                         |
//! |-------|-------------|-------------------------------------------------|
//! | 0     | Data        | consumers of monitor samples                    |
//! | 1     | Control     | platform code configuring monitors              |
//! | 2     | Interrupt   | owners of a shared line, forwarding interrupts  |
//!
//! Monitor groups are addressed by element id, monitors by sub-element id.

use alloc::sync::Arc;
use core::fmt;

use scp_core::{FwkId, FwkResult};
use scp_hal::mgi::MgiErrorCode;

/// API indices accepted by bind requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SmcfApiIdx {
    /// [`SmcfDataApi`]
    Data = 0,
    /// [`SmcfControlApi`]
    Control = 1,
    /// [`SmcfInterruptApi`]
    Interrupt = 2,
}

impl SmcfApiIdx {
    /// Number of APIs
    pub const COUNT: u8 = 3;

    /// API at `idx`
    pub const fn from_raw(idx: u8) -> Option<Self> {
        match idx {
            0 => Some(SmcfApiIdx::Data),
            1 => Some(SmcfApiIdx::Control),
            2 => Some(SmcfApiIdx::Interrupt),
            _ => None,
        }
    }
}

/// Sampling and sample retrieval
pub trait SmcfDataApi: Send + Sync {
    /// Start sampling on monitor group `group`; does not wait for a sample
    fn start_data_sampling(&self, group: FwkId) -> FwkResult<()>;

    /// Copy the latest sample of `monitor` into `data`, and its tag into
    /// `tag` unless `tag` is empty
    ///
    /// The read is attempted once. [`scp_core::FwkError::State`] means the
    /// sample was not ready or was overwritten while being copied; the
    /// buffers must then be ignored and the call may be retried.
    fn get_data(&self, monitor: FwkId, data: &mut [u32], tag: &mut [u32]) -> FwkResult<()>;
}

/// Monitor configuration
pub trait SmcfControlApi: Send + Sync {
    /// Write `value` to mode register `mode_index` of `monitor`
    fn config_mode(&self, monitor: FwkId, value: u32, mode_index: u32) -> FwkResult<()>;

    /// Hardware group id of `group`
    fn get_group_id(&self, group: FwkId) -> FwkResult<u32>;

    /// Request `monitor` to be enabled
    fn mli_enable(&self, monitor: FwkId) -> FwkResult<()>;

    /// Request `monitor` to be disabled
    fn mli_disable(&self, monitor: FwkId) -> FwkResult<()>;

    /// Enable `monitor` and wait until the hardware applied it
    fn mli_enable_blocking(&self, monitor: FwkId) -> FwkResult<()>;

    /// Disable `monitor` and wait until the hardware applied it
    fn mli_disable_blocking(&self, monitor: FwkId) -> FwkResult<()>;

    /// Last error the group reported for `monitor`, if any
    fn monitor_error(&self, monitor: FwkId) -> FwkResult<Option<MgiErrorCode>>;
}

/// Interrupt forwarding for groups without a dedicated line
pub trait SmcfInterruptApi: Send + Sync {
    /// Service pending interrupt sources of `group`
    fn handle_interrupt(&self, group: FwkId) -> FwkResult<()>;
}

/// Handle returned by a bind request
#[derive(Clone)]
pub enum SmcfApi {
    /// Data API
    Data(Arc<dyn SmcfDataApi>),
    /// Control API
    Control(Arc<dyn SmcfControlApi>),
    /// Interrupt API
    Interrupt(Arc<dyn SmcfInterruptApi>),
}

impl SmcfApi {
    /// Which API this is
    pub const fn idx(&self) -> SmcfApiIdx {
        match self {
            SmcfApi::Data(_) => SmcfApiIdx::Data,
            SmcfApi::Control(_) => SmcfApiIdx::Control,
            SmcfApi::Interrupt(_) => SmcfApiIdx::Interrupt,
        }
    }

    /// The data API, if this is it
    pub fn into_data(self) -> Option<Arc<dyn SmcfDataApi>> {
        match self {
            SmcfApi::Data(api) => Some(api),
            _ => None,
        }
    }

    /// The control API, if this is it
    pub fn into_control(self) -> Option<Arc<dyn SmcfControlApi>> {
        match self {
            SmcfApi::Control(api) => Some(api),
            _ => None,
        }
    }

    /// The interrupt API, if this is it
    pub fn into_interrupt(self) -> Option<Arc<dyn SmcfInterruptApi>> {
        match self {
            SmcfApi::Interrupt(api) => Some(api),
            _ => None,
        }
    }
}

impl fmt::Debug for SmcfApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SmcfApi").field(&self.idx()).finish()
    }
}
