//! # Interrupt Routing
//!
//! Drivers own the interrupt lines of their peripherals. At initialization a
//! driver registers a handler for its line; the platform's interrupt entry
//! point then calls [`IrqRouter::dispatch`] with the line that fired.

pub mod router;

pub use router::IrqRouter;

use alloc::sync::Arc;

use crate::FwkResult;

/// Interrupt line number
pub type IrqLine = u32;

/// Handler bound to an interrupt line
pub trait IrqHandler: Send + Sync {
    /// Service the interrupt; runs in interrupt context
    fn handle_irq(&self, line: IrqLine);
}

/// Registration and control of interrupt lines
pub trait IsrRegistry: Send + Sync {
    /// Bind a handler to a line, replacing any previous handler
    fn set_isr(&self, line: IrqLine, handler: Arc<dyn IrqHandler>) -> FwkResult<()>;

    /// Allow the line to be delivered
    fn enable(&self, line: IrqLine) -> FwkResult<()>;

    /// Stop delivering the line
    fn disable(&self, line: IrqLine) -> FwkResult<()>;

    /// Unbind the line's handler
    ///
    /// Fails with [`FwkError::Param`](crate::FwkError::Param) if no
    /// handler is bound.
    fn clear_isr(&self, line: IrqLine) -> FwkResult<()>;
}
