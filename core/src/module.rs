//! # Module Lifecycle
//!
//! The framework brings modules up in a fixed order:
//!
//! 1. [`FwkModule::init`] once per module, with the number of elements the
//!    platform declares
//! 2. [`FwkModule::element_init`] once per element, with its configuration
//! 3. [`FwkModule::bind`], where modules acquire the APIs of other modules
//!    through [`FwkModule::process_bind_request`]
//! 4. [`FwkModule::start`], after which events flow through
//!    [`FwkModule::process_event`]
//!
//! Methods take `&self`: a module is shared between its interrupt handler
//! and the main loop, so any mutable state lives behind its own locks.

use crate::ipc::LightEvent;
use crate::{ApiId, FwkId, FwkResult};

/// A firmware module driven by the framework
pub trait FwkModule: Send + Sync {
    /// Per-element platform configuration
    type ElementConfig;

    /// Handle returned to modules binding to one of this module's APIs
    type Api;

    /// Module name, for logs
    fn name(&self) -> &'static str;

    /// Prepare storage for `element_count` elements
    fn init(&self, element_count: usize) -> FwkResult<()>;

    /// Initialize one element
    fn element_init(
        &self,
        element_id: FwkId,
        sub_element_count: usize,
        config: &Self::ElementConfig,
    ) -> FwkResult<()>;

    /// Acquire APIs from other modules
    fn bind(&self, _id: FwkId, _round: u32) -> FwkResult<()> {
        Ok(())
    }

    /// Hand out one of this module's APIs
    fn process_bind_request(
        &self,
        source_id: FwkId,
        target_id: FwkId,
        api_id: ApiId,
    ) -> FwkResult<Self::Api>;

    /// Final start-up step once every module is bound
    fn start(&self, _id: FwkId) -> FwkResult<()> {
        Ok(())
    }

    /// Process an event previously posted to the event queue
    fn process_event(&self, event: &LightEvent) -> FwkResult<()>;
}
