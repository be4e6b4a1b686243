//! # Framework Status Codes
//!
//! Every fallible framework or module operation returns [`FwkResult`]. The
//! error kinds mirror the status codes platform code already expects, so a
//! failure means the same thing whichever module reports it.
//!
//! | Kind      | Retry | Meaning                                           |
//! |-----------|-------|---------------------------------------------------|
//! | `Param`   | No    | Invalid id, pointer or argument                   |
//! | `Range`   | No    | Index or value outside a hardware-reported bound  |
//! | `Support` | No    | Capability absent from the hardware               |
//! | `Align`   | No    | Address fails the required alignment              |
//! | `NoMem`   | No    | Caller buffer or region too small                 |
//! | `State`   | Yes   | Resource not ready or changed under the reader    |
//! | `Data`    | No    | Value does not fit the hardware bit width         |
//! | `Timeout` | Yes   | Bounded polling gave up                           |
//! | `Access`  | No    | Request not allowed for this caller or target     |
//! | `Busy`    | Yes   | Queue or resource temporarily full                |
//! | `Init`    | No    | Resource used before successful initialization    |

use core::fmt;

/// Result type for framework operations
pub type FwkResult<T> = Result<T, FwkError>;

/// Framework error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FwkError {
    /// Invalid parameter
    Param,
    /// Index or value out of range
    Range,
    /// Capability not supported
    Support,
    /// Address misaligned
    Align,
    /// Not enough memory
    NoMem,
    /// Invalid state for the operation
    State,
    /// Value does not fit the target field
    Data,
    /// Polling bound expired
    Timeout,
    /// Access denied
    Access,
    /// Resource busy
    Busy,
    /// Not initialized
    Init,
}

impl FwkError {
    /// Whether a caller may reasonably retry the same request
    pub const fn is_transient(self) -> bool {
        matches!(self, FwkError::State | FwkError::Timeout | FwkError::Busy)
    }

    /// Short human-readable description
    pub const fn description(self) -> &'static str {
        match self {
            FwkError::Param => "invalid parameter",
            FwkError::Range => "out of range",
            FwkError::Support => "not supported",
            FwkError::Align => "misaligned address",
            FwkError::NoMem => "not enough memory",
            FwkError::State => "invalid state",
            FwkError::Data => "value does not fit",
            FwkError::Timeout => "timed out",
            FwkError::Access => "access denied",
            FwkError::Busy => "busy",
            FwkError::Init => "not initialized",
        }
    }
}

impl fmt::Display for FwkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
