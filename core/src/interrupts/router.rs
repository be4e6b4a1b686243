//! # Interrupt Router
//!
//! Routes interrupt lines to the handlers drivers registered for them.
//!
//! [`IrqRouter::dispatch`] runs in interrupt context and never waits for
//! the route table. An interrupt that arrives while a line is being bound
//! or unbound is refused with [`FwkError::Busy`] and stays pending at the
//! interrupt controller.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;

use spin::RwLock;

use super::{IrqHandler, IrqLine, IsrRegistry};
use crate::{FwkError, FwkResult};

struct Route {
    handler: Arc<dyn IrqHandler>,
    enabled: bool,
}

/// Interrupt router
pub struct IrqRouter {
    routes: RwLock<BTreeMap<IrqLine, Route>>,
}

impl IrqRouter {
    /// Create a router with no lines bound
    pub const fn new() -> Self {
        Self {
            routes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Deliver an interrupt to the handler bound to `line`
    ///
    /// Fails with [`FwkError::Param`] for an unbound line,
    /// [`FwkError::State`] for a disabled one and [`FwkError::Busy`] while
    /// the route table is being updated.
    pub fn dispatch(&self, line: IrqLine) -> FwkResult<()> {
        let handler = {
            let routes = self.routes.try_read().ok_or(FwkError::Busy)?;
            let route = routes.get(&line).ok_or(FwkError::Param)?;
            if !route.enabled {
                return Err(FwkError::State);
            }
            Arc::clone(&route.handler)
        };

        handler.handle_irq(line);
        Ok(())
    }

    /// Whether a handler is bound to `line`
    pub fn is_bound(&self, line: IrqLine) -> bool {
        self.routes.read().contains_key(&line)
    }

    /// Whether `line` is bound and enabled
    pub fn is_enabled(&self, line: IrqLine) -> bool {
        self.routes.read().get(&line).is_some_and(|r| r.enabled)
    }

    fn set_enabled(&self, line: IrqLine, enabled: bool) -> FwkResult<()> {
        let mut routes = self.routes.write();
        let route = routes.get_mut(&line).ok_or(FwkError::Param)?;
        route.enabled = enabled;
        Ok(())
    }
}

impl IsrRegistry for IrqRouter {
    fn set_isr(&self, line: IrqLine, handler: Arc<dyn IrqHandler>) -> FwkResult<()> {
        let previous = self.routes.write().insert(
            line,
            Route {
                handler,
                enabled: false,
            },
        );
        if previous.is_some() {
            log::warn!("IrqRouter: replaced handler for line {}", line);
        }
        Ok(())
    }

    fn enable(&self, line: IrqLine) -> FwkResult<()> {
        self.set_enabled(line, true)
    }

    fn disable(&self, line: IrqLine) -> FwkResult<()> {
        self.set_enabled(line, false)
    }

    fn clear_isr(&self, line: IrqLine) -> FwkResult<()> {
        self.routes
            .write()
            .remove(&line)
            .map(|_| ())
            .ok_or(FwkError::Param)
    }
}

impl Default for IrqRouter {
    fn default() -> Self {
        Self::new()
    }
}
