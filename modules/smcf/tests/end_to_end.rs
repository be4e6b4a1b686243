//! Monitor group driven through the module APIs, with the hardware played
//! by word arrays in host memory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use scp_core::interrupts::IrqRouter;
use scp_core::ipc::{EventQueue, NotificationBus};
use scp_core::module::FwkModule;
use scp_core::{ApiId, FwkError, FwkId};
use scp_hal::mgi::regs::*;
use scp_hal::mgi::{Feat0, IrqSource, SampleIdStatus};
use scp_smcf::{
    DataConfig, DataLocation, ElementState, HeaderFormat, RamRegion, Smcf, SmcfApiIdx,
    SmcfElementConfig,
};

const MODULE: u32 = 3;
const LINE: u32 = 77;

struct Platform {
    regs: Vec<u32>,
    ram: Vec<u32>,
    queue: Arc<EventQueue>,
    router: Arc<IrqRouter>,
    bus: Arc<NotificationBus>,
    smcf: Smcf,
}

impl Platform {
    /// One group of 4 monitors producing one 32-bit value each
    fn new(feat0: Feat0, tag_bits: u32) -> Self {
        let mut regs = vec![0u32; MGI_BLOCK_WORDS];
        regs[word(GRP_ID)] = (3 << GRP_ID_MON_NUM_POS) | 0x11;
        regs[word(DATA_INFO)] = 31 << DATA_INFO_MON_DATA_WIDTH_POS;
        regs[word(FEAT0)] = feat0.bits() | ((tag_bits - 1) << FEAT0_TAG_LEN_POS);

        let queue: Arc<EventQueue> = Arc::new(EventQueue::new());
        let router = Arc::new(IrqRouter::new());
        let bus = Arc::new(NotificationBus::new());
        let smcf =
            Smcf::new(MODULE, queue.clone(), router.clone()).with_notifier(bus.clone());
        smcf.init(1).unwrap();

        Self {
            regs,
            ram: vec![0u32; 16],
            queue,
            router,
            bus,
            smcf,
        }
    }

    fn config(&mut self, format: HeaderFormat, location: DataLocation) -> SmcfElementConfig {
        unsafe {
            SmcfElementConfig::new(
                self.regs.as_mut_ptr() as usize,
                DataConfig::new(format, location),
            )
        }
        .with_irq(LINE)
    }

    fn ram_location(&mut self) -> DataLocation {
        DataLocation::Ram {
            write_addr: 0x8000_0000,
            read: unsafe { RamRegion::new(self.ram.as_mut_ptr() as usize, self.ram.len()) },
        }
    }

    fn set_reg(&mut self, offset: usize, value: u32) {
        unsafe { std::ptr::write_volatile(self.regs.as_mut_ptr().add(word(offset)), value) }
    }

    fn reg(&self, offset: usize) -> u32 {
        unsafe { std::ptr::read_volatile(self.regs.as_ptr().add(word(offset))) }
    }

    fn set_ram(&mut self, index: usize, value: u32) {
        unsafe { std::ptr::write_volatile(self.ram.as_mut_ptr().add(index), value) }
    }

    /// Drain the event queue the way the main loop does
    fn run_events(&self) -> usize {
        let mut processed = 0;
        while let Some(event) = self.queue.pop() {
            self.smcf.process_event(&event).unwrap();
            processed += 1;
        }
        processed
    }
}

fn group() -> FwkId {
    FwkId::element(MODULE, 0)
}

fn monitor(idx: u32) -> FwkId {
    FwkId::sub_element(MODULE, 0, idx)
}

#[test]
fn test_sample_from_group_registers() {
    let mut p = Platform::new(Feat0::empty(), 1);
    let format = HeaderFormat::DATA_VALID_BITS | HeaderFormat::COUNT_ID | HeaderFormat::END_ID;
    let config = p.config(format, DataLocation::Mgi);
    p.smcf.element_init(group(), 4, &config).unwrap();

    let data_api = p
        .smcf
        .process_bind_request(FwkId::module(1), group(), ApiId::new(MODULE, 0))
        .unwrap()
        .into_data()
        .unwrap();
    data_api.start_data_sampling(group()).unwrap();
    assert_eq!(p.smcf.element_state(group()), ElementState::Sampling);

    // Hardware completes a sample with count 7, monitor 2 valid
    p.set_reg(DVLD, 1 << 2);
    p.set_reg(SMPID_START, SampleIdStatus::ValidCount.encode(7));
    p.set_reg(SMPID_END, SampleIdStatus::ValidCount.encode(7));
    for (i, value) in [0x10, 0x20, 0x30, 0x40].into_iter().enumerate() {
        p.set_reg(DATA + 4 * i, value);
    }

    let mut data = [0u32; 1];
    data_api.get_data(monitor(2), &mut data, &mut []).unwrap();
    assert_eq!(data, [0x30]);

    // Monitor 1 has no valid data in this sample
    assert_eq!(data_api.get_data(monitor(1), &mut data, &mut []), Err(FwkError::State));

    // Sample being rewritten: end count lags behind
    p.set_reg(SMPID_START, SampleIdStatus::ValidCount.encode(8));
    assert_eq!(data_api.get_data(monitor(2), &mut data, &mut []), Err(FwkError::State));
}

#[test]
fn test_sample_complete_reaches_subscribers() {
    let mut p = Platform::new(Feat0::empty(), 1);
    let config = p.config(HeaderFormat::COUNT_ID, DataLocation::Mgi);
    p.smcf.element_init(group(), 4, &config).unwrap();

    let received = Arc::new(AtomicUsize::new(0));
    let counter = received.clone();
    p.bus.subscribe_from(
        "consumer",
        p.smcf.new_data_sample_ready(),
        group(),
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        }),
    );

    p.set_reg(IRQ_STAT, IrqSource::SampleComplete.mask() | IrqSource::MonitorMode.mask());
    p.router.dispatch(LINE).unwrap();

    // Nothing is delivered from interrupt context
    assert_eq!(received.load(Ordering::Relaxed), 0);
    assert_eq!(p.reg(IRQ_STAT), 0);

    assert_eq!(p.run_events(), 1);
    assert_eq!(received.load(Ordering::Relaxed), 1);

    // Sources other than sample completion post nothing
    p.set_reg(IRQ_STAT, IrqSource::Error.mask());
    p.router.dispatch(LINE).unwrap();
    assert_eq!(p.run_events(), 0);
    assert_eq!(received.load(Ordering::Relaxed), 1);
}

#[test]
fn test_tagged_sample_from_ram() {
    let mut p = Platform::new(Feat0::DMA_IF | Feat0::TAG_IN, 64);
    let format = HeaderFormat::COUNT_ID | HeaderFormat::TAG_ID | HeaderFormat::END_ID;
    let location = p.ram_location();
    let config = p.config(format, location);
    p.smcf.element_init(group(), 4, &config).unwrap();

    let layout = p.smcf.layout(group()).unwrap().sample;
    assert_eq!(layout.offsets.data, 8);
    assert_eq!(p.reg(WREN) & WREN_DMA_IF, WREN_DMA_IF);

    // start count | end count | tag length | tag x2 | end tag length | end tag x2 | data
    p.set_ram(0, SampleIdStatus::ValidCount.encode(3));
    p.set_ram(1, SampleIdStatus::ValidCount.encode(3));
    p.set_ram(2, SampleIdStatus::ValidTagLength.encode(2));
    p.set_ram(3, 0xCAFE);
    p.set_ram(4, 0xF00D);
    for i in 0..4 {
        p.set_ram(8 + i, 100 + i as u32);
    }

    let data_api = p.smcf.data_api();
    let mut data = [0u32; 1];
    let mut tag = [0u32; 2];
    data_api.get_data(monitor(3), &mut data, &mut tag).unwrap();
    assert_eq!(data, [103]);
    assert_eq!(tag, [0xCAFE, 0xF00D]);

    let mut short_tag = [0u32; 1];
    assert_eq!(
        data_api.get_data(monitor(3), &mut data, &mut short_tag),
        Err(FwkError::NoMem)
    );
}

#[test]
fn test_forwarded_interrupts() {
    let mut p = Platform::new(Feat0::empty(), 1);
    let mut config = p.config(HeaderFormat::empty(), DataLocation::Mgi);
    config.irq = None;
    p.smcf.element_init(group(), 4, &config).unwrap();
    assert!(!p.router.is_bound(LINE));

    let api = p
        .smcf
        .process_bind_request(FwkId::module(9), group(), ApiId::new(MODULE, 2))
        .unwrap();
    assert_eq!(api.idx(), SmcfApiIdx::Interrupt);
    let api = api.into_interrupt().unwrap();

    p.set_reg(IRQ_STAT, IrqSource::SampleComplete.mask());
    api.handle_interrupt(group()).unwrap();
    assert_eq!(p.run_events(), 1);
    assert_eq!(p.bus.delivered(), 0);

    assert_eq!(api.handle_interrupt(FwkId::element(MODULE, 1)), Err(FwkError::Param));
}

#[test]
fn test_monitor_control() {
    let mut p = Platform::new(Feat0::empty(), 1);
    let config = p.config(HeaderFormat::GROUP_ID, DataLocation::Mgi);
    p.smcf.element_init(group(), 4, &config).unwrap();
    assert_eq!(p.reg(MON_REQ), 0xF);

    let control = p.smcf.control_api();
    assert_eq!(control.get_group_id(group()), Ok(0x11));

    control.mli_disable(monitor(0)).unwrap();
    assert_eq!(p.reg(MON_REQ), 0xE);
    assert_eq!(control.mli_disable(monitor(4)), Err(FwkError::Param));
    assert_eq!(p.reg(MON_REQ), 0xE);

    // One mode register, 32 bits wide
    p.set_reg(FEAT1, 31 << FEAT1_MODE_LEN_POS);
    control.config_mode(monitor(1), 0xDEAD_BEEF, 0).unwrap();
    assert_eq!(p.reg(mode_req(0)), 0xDEAD_BEEF);
    assert_eq!(control.config_mode(monitor(1), 1, 1), Err(FwkError::Range));
}
