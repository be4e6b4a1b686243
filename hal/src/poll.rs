//! # Polling
//!
//! Hardware requests (monitor enable, mode update) are applied
//! asynchronously; software observes completion by polling a status bit.

use scp_core::{FwkError, FwkResult};

/// How long to keep polling a status condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPolicy {
    /// Spin until the condition holds, however long that takes
    #[default]
    Unbounded,
    /// Give up after this many unsuccessful polls
    Bounded(u32),
}

impl PollPolicy {
    /// Spin until `done` returns true
    ///
    /// Returns [`FwkError::Timeout`] once a bounded policy runs out of
    /// attempts. An unbounded policy never returns an error.
    pub fn wait_until<F>(self, mut done: F) -> FwkResult<()>
    where
        F: FnMut() -> bool,
    {
        match self {
            PollPolicy::Unbounded => {
                while !done() {
                    core::hint::spin_loop();
                }
                Ok(())
            },
            PollPolicy::Bounded(attempts) => {
                for _ in 0..attempts {
                    if done() {
                        return Ok(());
                    }
                    core::hint::spin_loop();
                }
                if done() {
                    Ok(())
                } else {
                    Err(FwkError::Timeout)
                }
            },
        }
    }

    /// Whether this policy can give up
    pub const fn is_bounded(self) -> bool {
        matches!(self, PollPolicy::Bounded(_))
    }
}
