//! # SMCF Module
//!
//! One element per monitor group, one sub-element per monitor.
//!
//! ## Element lifecycle
//!
//! ```text
//! Uninitialized ──element_init──► Configured ──start_data_sampling──► Sampling
//! ```
//!
//! `element_init` validates the sampling settings and plans the record
//! layout before it writes anything. It then programs the layout and the
//! sample type, enables every monitor and hooks up the interrupt line. The
//! element is published before its line is enabled. A failed
//! `element_init` leaves the element uninitialized with no handler bound.
//!
//! ## New samples
//!
//! The interrupt handler only posts a light event. The event comes back
//! through [`FwkModule::process_event`] on the main loop, where the
//! "new data sample ready" notification is raised. Subscribers then call
//! [`SmcfDataApi::get_data`].

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use spin::{Mutex, RwLock};

use scp_core::interrupts::{IrqHandler, IrqLine, IsrRegistry};
use scp_core::ipc::{EventSink, LightEvent};
#[cfg(feature = "notification")]
use scp_core::ipc::{Notification, Notifier};
use scp_core::module::FwkModule;
use scp_core::{ApiId, EventId, FwkError, FwkId, FwkResult, IdType, NotificationId};
use scp_hal::mgi::{regs, Feat0, Mgi, MgiErrorCode};

use crate::api::{SmcfApi, SmcfApiIdx, SmcfControlApi, SmcfDataApi, SmcfInterruptApi};
use crate::config::SmcfElementConfig;
use crate::data::{self, DataLayout};
use crate::header::HeaderFormat;
use crate::irq::{self, IrqAction};

/// Index of the internal "new data sample" event
pub const EVENT_IDX_NEW_DATA_SAMPLE: u32 = 0;

/// Index of the "new data sample ready" notification
pub const NOTIFICATION_IDX_NEW_DATA_SAMPLE_READY: u32 = 0;

/// State of a monitor group element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// Not initialized, or initialization failed
    Uninitialized,
    /// Layout resolved and monitors enabled
    Configured,
    /// Sampling started
    Sampling,
}

// =============================================================================
// Element Context
// =============================================================================

struct ElementCtx {
    id: FwkId,
    mgi: Mgi,
    monitor_count: u32,
    layout: DataLayout,
    config: SmcfElementConfig,
    /// Serializes the three-step mode programming sequence
    mode_lock: Mutex<()>,
    sampling: AtomicBool,
}

impl ElementCtx {
    fn monitor_index(&self, monitor: FwkId) -> FwkResult<u32> {
        let index = monitor.sub_element_idx().ok_or(FwkError::Param)?;
        if index >= self.monitor_count {
            return Err(FwkError::Param);
        }
        Ok(index)
    }

    fn state(&self) -> ElementState {
        if self.sampling.load(Ordering::Acquire) {
            ElementState::Sampling
        } else {
            ElementState::Configured
        }
    }

    /// Scan the group's interrupt sources, posting a light event on sample
    /// completion
    fn service_interrupts(&self, module_idx: u32, events: &dyn EventSink) -> FwkResult<()> {
        irq::service(&self.mgi, |action| {
            if action == IrqAction::SampleComplete {
                let event = LightEvent::new(
                    EventId::new(module_idx, EVENT_IDX_NEW_DATA_SAMPLE),
                    self.id,
                    self.id,
                );
                if events.put_event(event).is_err() {
                    log::trace!("[SMCF] Send data sample event failed!");
                }
            }
        })?;
        Ok(())
    }
}

struct ElementIrqHandler {
    ctx: Arc<ElementCtx>,
    module_idx: u32,
    events: Arc<dyn EventSink>,
}

impl IrqHandler for ElementIrqHandler {
    fn handle_irq(&self, line: IrqLine) {
        if let Err(err) = self.ctx.service_interrupts(self.module_idx, &*self.events) {
            log::error!("[SMCF] Interrupt {} on {} failed: {}", line, self.ctx.id, err);
        }
    }
}

// =============================================================================
// Module
// =============================================================================

struct SmcfCtx {
    module_idx: u32,
    elements: RwLock<Vec<Option<Arc<ElementCtx>>>>,
    events: Arc<dyn EventSink>,
    isr: Arc<dyn IsrRegistry>,
    #[cfg(feature = "notification")]
    notifier: Option<Arc<dyn Notifier>>,
}

impl SmcfCtx {
    fn element(&self, id: FwkId) -> FwkResult<Arc<ElementCtx>> {
        if id.module_idx() != Some(self.module_idx) {
            return Err(FwkError::Param);
        }
        let idx = id.element_idx().ok_or(FwkError::Param)? as usize;
        let elements = self.elements.read();
        match elements.get(idx) {
            Some(Some(ctx)) => Ok(Arc::clone(ctx)),
            Some(None) => Err(FwkError::Init),
            None => Err(FwkError::Param),
        }
    }

    /// Element owning `monitor`, and the monitor's index within it
    fn monitor(&self, monitor: FwkId) -> FwkResult<(Arc<ElementCtx>, u32)> {
        if !monitor.is_type(IdType::SubElement) {
            return Err(FwkError::Param);
        }
        let ctx = self.element(monitor)?;
        let index = ctx.monitor_index(monitor)?;
        Ok((ctx, index))
    }

    fn validate_mode(mgi: &Mgi, value: u32, mode_index: u32) -> FwkResult<()> {
        if mode_index >= mgi.mode_register_count() {
            return Err(FwkError::Range);
        }
        let width = mgi.mode_register_width();
        if width != regs::MODE_MAX_WORD_LEN && value > scp_hal::mgi::bit_mask(width) {
            return Err(FwkError::Data);
        }
        Ok(())
    }
}

impl SmcfDataApi for SmcfCtx {
    fn start_data_sampling(&self, group: FwkId) -> FwkResult<()> {
        let ctx = self.element(group)?;
        ctx.mgi.enable_sample();
        ctx.sampling.store(true, Ordering::Release);
        Ok(())
    }

    fn get_data(&self, monitor: FwkId, data: &mut [u32], tag: &mut [u32]) -> FwkResult<()> {
        let (ctx, index) = self.monitor(monitor)?;
        let layout = &ctx.layout.sample;

        if data.is_empty() {
            return Err(FwkError::Param);
        }
        if data.len() < data::data_buffer_words(layout) {
            return Err(FwkError::NoMem);
        }

        let tag = if tag.is_empty() {
            None
        } else {
            if !layout.format.contains(HeaderFormat::TAG_ID) {
                return Err(FwkError::Support);
            }
            if tag.len() < layout.tag_words {
                return Err(FwkError::NoMem);
            }
            Some(tag)
        };

        data::read_sample(layout, &ctx.layout.source, index, data, tag)
    }
}

impl SmcfControlApi for SmcfCtx {
    fn config_mode(&self, monitor: FwkId, value: u32, mode_index: u32) -> FwkResult<()> {
        let (ctx, index) = self.monitor(monitor)?;
        Self::validate_mode(&ctx.mgi, value, mode_index)?;

        {
            let _guard = ctx.mode_lock.lock();
            ctx.mgi.enable_program_mode(index)?;
            let written = ctx.mgi.set_monitor_mode(mode_index, value);
            ctx.mgi.disable_program_mode(index)?;
            written?;
        }

        if ctx.config.poll.is_bounded() {
            ctx.mgi.wait_monitor_mode_updated(ctx.config.poll)?;
        }
        Ok(())
    }

    fn get_group_id(&self, group: FwkId) -> FwkResult<u32> {
        let ctx = self.element(group)?;
        Ok(data::group_id(&ctx.layout.sample, &ctx.layout.source))
    }

    fn mli_enable(&self, monitor: FwkId) -> FwkResult<()> {
        let (ctx, index) = self.monitor(monitor)?;
        ctx.mgi.enable_monitor(index)
    }

    fn mli_disable(&self, monitor: FwkId) -> FwkResult<()> {
        let (ctx, index) = self.monitor(monitor)?;
        ctx.mgi.disable_monitor(index)
    }

    fn mli_enable_blocking(&self, monitor: FwkId) -> FwkResult<()> {
        let (ctx, index) = self.monitor(monitor)?;
        ctx.mgi.enable_monitor_blocking(index, ctx.config.poll)
    }

    fn mli_disable_blocking(&self, monitor: FwkId) -> FwkResult<()> {
        let (ctx, index) = self.monitor(monitor)?;
        ctx.mgi.disable_monitor_blocking(index, ctx.config.poll)
    }

    fn monitor_error(&self, monitor: FwkId) -> FwkResult<Option<MgiErrorCode>> {
        let (ctx, index) = self.monitor(monitor)?;
        Ok(ctx.mgi.monitor_error(index))
    }
}

impl SmcfInterruptApi for SmcfCtx {
    fn handle_interrupt(&self, group: FwkId) -> FwkResult<()> {
        let ctx = self.element(group)?;
        ctx.service_interrupts(self.module_idx, &*self.events)
    }
}

/// System Monitoring Control Framework module
///
/// Cloning gives another handle to the same module.
#[derive(Clone)]
pub struct Smcf {
    ctx: Arc<SmcfCtx>,
}

impl Smcf {
    /// Create the module with index `module_idx`
    ///
    /// Interrupt handlers post to `events` and are registered with `isr`.
    pub fn new(module_idx: u32, events: Arc<dyn EventSink>, isr: Arc<dyn IsrRegistry>) -> Self {
        Self {
            ctx: Arc::new(SmcfCtx {
                module_idx,
                elements: RwLock::new(Vec::new()),
                events,
                isr,
                #[cfg(feature = "notification")]
                notifier: None,
            }),
        }
    }

    /// Raise "new data sample ready" notifications on `notifier`
    ///
    /// Must be called before the module is shared.
    #[cfg(feature = "notification")]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        match Arc::get_mut(&mut self.ctx) {
            Some(ctx) => ctx.notifier = Some(notifier),
            None => log::warn!("[SMCF] Module already shared, notifier ignored"),
        }
        self
    }

    /// Id of this module
    pub fn id(&self) -> FwkId {
        FwkId::module(self.ctx.module_idx)
    }

    /// Id of the internal "new data sample" event
    pub fn new_data_sample_event(&self) -> EventId {
        EventId::new(self.ctx.module_idx, EVENT_IDX_NEW_DATA_SAMPLE)
    }

    /// Id of the "new data sample ready" notification
    pub fn new_data_sample_ready(&self) -> NotificationId {
        NotificationId::new(self.ctx.module_idx, NOTIFICATION_IDX_NEW_DATA_SAMPLE_READY)
    }

    /// Number of element slots
    pub fn element_count(&self) -> usize {
        self.ctx.elements.read().len()
    }

    /// State of element `id`
    pub fn element_state(&self, id: FwkId) -> ElementState {
        match self.ctx.element(id) {
            Ok(ctx) => ctx.state(),
            Err(_) => ElementState::Uninitialized,
        }
    }

    /// Resolved layout of element `id`
    pub fn layout(&self, id: FwkId) -> FwkResult<DataLayout> {
        Ok(self.ctx.element(id)?.layout)
    }

    /// Data API
    pub fn data_api(&self) -> Arc<dyn SmcfDataApi> {
        Arc::clone(&self.ctx) as Arc<dyn SmcfDataApi>
    }

    /// Control API
    pub fn control_api(&self) -> Arc<dyn SmcfControlApi> {
        Arc::clone(&self.ctx) as Arc<dyn SmcfControlApi>
    }

    /// Interrupt API, for elements whose interrupts arrive through another
    /// module
    pub fn interrupt_api(&self) -> Arc<dyn SmcfInterruptApi> {
        Arc::clone(&self.ctx) as Arc<dyn SmcfInterruptApi>
    }

    fn check_element_id(&self, id: FwkId) -> FwkResult<usize> {
        if !id.is_type(IdType::Element) || id.module_idx() != Some(self.ctx.module_idx) {
            return Err(FwkError::Param);
        }
        let idx = id.element_idx().ok_or(FwkError::Param)? as usize;
        if idx >= self.element_count() {
            return Err(FwkError::Param);
        }
        Ok(idx)
    }

    /// Reject sampling settings the group cannot take
    fn check_sampling(mgi: &Mgi, config: &SmcfElementConfig) -> FwkResult<()> {
        if !mgi.is_sample_type_supported(config.sample_type) {
            return Err(FwkError::Support);
        }
        if config.sample_period.is_some() && !mgi.features().contains(Feat0::PER_TIMER) {
            return Err(FwkError::Support);
        }
        if config.sample_delay.is_some_and(|delay| delay > mgi.sample_delay_max()) {
            return Err(FwkError::Range);
        }
        Ok(())
    }

    fn program_sampling(mgi: &Mgi, config: &SmcfElementConfig) -> FwkResult<()> {
        mgi.set_sample_type(config.sample_type)?;
        if let Some(period) = config.sample_period {
            mgi.set_sample_period(period)?;
        }
        if let Some(delay) = config.sample_delay {
            mgi.set_sample_delay(delay)?;
        }
        Ok(())
    }

    /// Store the element in slot `idx` and bring up its interrupt line
    ///
    /// The line is enabled only once the element can be looked up. If the
    /// line cannot be enabled the slot is emptied, the sources are masked
    /// again and the handler is unbound.
    fn publish(&self, idx: usize, ctx: Arc<ElementCtx>) -> FwkResult<()> {
        let Some(line) = ctx.config.irq else {
            self.ctx.elements.write()[idx] = Some(ctx);
            return Ok(());
        };

        let handler = Arc::new(ElementIrqHandler {
            ctx: Arc::clone(&ctx),
            module_idx: self.ctx.module_idx,
            events: Arc::clone(&self.ctx.events),
        });
        self.ctx.isr.set_isr(line, handler)?;
        irq::unmask_mapped(&ctx.mgi);

        let mgi = ctx.mgi;
        self.ctx.elements.write()[idx] = Some(ctx);

        if let Err(err) = self.ctx.isr.enable(line) {
            self.ctx.elements.write()[idx] = None;
            irq::mask_mapped(&mgi);
            if let Err(clear_err) = self.ctx.isr.clear_isr(line) {
                log::error!("[SMCF] Unbinding interrupt {} failed: {}", line, clear_err);
            }
            return Err(err);
        }
        Ok(())
    }
}

impl FwkModule for Smcf {
    type ElementConfig = SmcfElementConfig;
    type Api = SmcfApi;

    fn name(&self) -> &'static str {
        "SMCF"
    }

    fn init(&self, element_count: usize) -> FwkResult<()> {
        let mut elements = self.ctx.elements.write();
        elements.clear();
        elements.resize(element_count, None);
        Ok(())
    }

    fn element_init(
        &self,
        element_id: FwkId,
        sub_element_count: usize,
        config: &SmcfElementConfig,
    ) -> FwkResult<()> {
        let idx = self.check_element_id(element_id)?;

        // SAFETY: the configuration constructor's contract
        let mgi = unsafe { Mgi::new(config.reg_base())? };

        let monitor_count = mgi.monitor_count();
        if sub_element_count != monitor_count as usize {
            log::warn!(
                "[SMCF] {} declares {} monitors, hardware has {}",
                element_id,
                sub_element_count,
                monitor_count
            );
            return Err(FwkError::Param);
        }

        Self::check_sampling(&mgi, config)?;
        let plan = data::plan(&mgi, &config.data)?;

        // Nothing below fails on a configuration the checks above accepted
        let layout = data::commit(&mgi, plan)?;
        Self::program_sampling(&mgi, config)?;
        mgi.enable_all_monitors()?;

        let ctx = Arc::new(ElementCtx {
            id: element_id,
            mgi,
            monitor_count,
            layout,
            config: *config,
            mode_lock: Mutex::new(()),
            sampling: AtomicBool::new(false),
        });

        self.publish(idx, ctx)?;

        log::debug!("[SMCF] {} initialized with {} monitors", element_id, monitor_count);
        Ok(())
    }

    fn process_bind_request(
        &self,
        _source_id: FwkId,
        target_id: FwkId,
        api_id: ApiId,
    ) -> FwkResult<SmcfApi> {
        if api_id.module != self.ctx.module_idx {
            return Err(FwkError::Param);
        }
        let idx = u8::try_from(api_id.idx)
            .ok()
            .and_then(SmcfApiIdx::from_raw)
            .ok_or(FwkError::Range)?;

        match idx {
            SmcfApiIdx::Data => Ok(SmcfApi::Data(self.data_api())),
            SmcfApiIdx::Control => Ok(SmcfApi::Control(self.control_api())),
            SmcfApiIdx::Interrupt => {
                if !target_id.is_type(IdType::Element) {
                    return Err(FwkError::Access);
                }
                let ctx = self.ctx.element(target_id)?;
                irq::unmask_mapped(&ctx.mgi);
                Ok(SmcfApi::Interrupt(self.interrupt_api()))
            },
        }
    }

    fn process_event(&self, event: &LightEvent) -> FwkResult<()> {
        let ctx = self.ctx.element(event.target_id)?;

        if event.id != self.new_data_sample_event() {
            return Err(FwkError::Param);
        }

        log::trace!("[SMCF] New data sample event received");

        #[cfg(feature = "notification")]
        if let Some(notifier) = &self.ctx.notifier {
            let notification = Notification::new(self.new_data_sample_ready(), ctx.id);
            notifier.notify(&notification)?;
        }
        #[cfg(not(feature = "notification"))]
        let _ = ctx;

        Ok(())
    }
}

impl fmt::Debug for Smcf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Smcf")
            .field("module_idx", &self.ctx.module_idx)
            .field("elements", &self.element_count())
            .finish()
    }
}
