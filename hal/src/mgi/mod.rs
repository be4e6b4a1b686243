//! # SMCF Monitor Group Instance (MGI)
//!
//! An MGI is one hardware block grouping up to 32 monitors (counters,
//! sensors) that are sampled together. Software enables monitors,
//! programs their modes, chooses what starts a sample, and reads the
//! results either from the block's own data array or from RAM the block
//! writes into over DMA.
//!
//! ## Asynchronous requests
//!
//! Monitor enable and mode requests are only requests: the hardware applies
//! them later and reflects the result in a status register. The `_blocking`
//! variants poll that status under a [`PollPolicy`].
//!
//! ## Mode programming
//!
//! A mode write must be bracketed by the broadcast bit of the target
//! monitor:
//!
//! ```text
//! Idle --enable_program_mode--> Broadcasting --set_monitor_mode--> Broadcasting
//!      <--disable_program_mode--
//! ```
//!
//! The caller sequences the three steps and must not interleave another mode
//! write to the same monitor.

pub mod regs;
pub mod types;

pub use types::{
    sample_id_value, Feat0, IrqSource, MgiErrorCode, SampleIdStatus, SampleType, WrCfg,
};

use scp_core::{FwkError, FwkResult};

use crate::mmio::VolatileRegion;
use crate::poll::PollPolicy;
use regs::*;

/// Mask of the low `bits` bits
#[inline]
pub const fn bit_mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Handle to one MGI register block
#[derive(Debug, Clone, Copy)]
pub struct Mgi {
    regs: VolatileRegion,
}

impl Mgi {
    /// Create a handle to the register block at `base`
    ///
    /// # Safety
    ///
    /// `base` must map a complete MGI register block ([`MGI_BLOCK_SIZE`]
    /// bytes) for as long as the handle, or any copy of it, is used.
    pub unsafe fn new(base: usize) -> FwkResult<Self> {
        // SAFETY: forwarded from the caller
        let regs = unsafe { VolatileRegion::new(base, MGI_BLOCK_WORDS)? };
        Ok(Self { regs })
    }

    /// The whole register block as a word region
    pub fn block(&self) -> VolatileRegion {
        self.regs
    }

    /// Base address of the block
    pub fn base_addr(&self) -> usize {
        self.regs.base_addr()
    }

    // ========================================================================
    // Register Access Helpers
    // ========================================================================

    #[inline]
    fn read_reg(&self, offset: usize) -> u32 {
        debug_assert!(offset < MGI_BLOCK_SIZE);
        // SAFETY: register offsets are checked against the block size at
        // compile time and the region spans the whole block
        unsafe { self.regs.read_unchecked(word(offset)) }
    }

    #[inline]
    fn write_reg(&self, offset: usize, value: u32) {
        debug_assert!(offset < MGI_BLOCK_SIZE);
        // SAFETY: as for read_reg
        unsafe { self.regs.write_unchecked(word(offset), value) }
    }

    #[inline]
    fn set_bits(&self, offset: usize, bits: u32) {
        self.write_reg(offset, self.read_reg(offset) | bits);
    }

    #[inline]
    fn clear_bits(&self, offset: usize, bits: u32) {
        self.write_reg(offset, self.read_reg(offset) & !bits);
    }

    #[inline]
    fn field(&self, offset: usize, mask: u32, pos: u32) -> u32 {
        (self.read_reg(offset) & mask) >> pos
    }

    // ========================================================================
    // Identification
    // ========================================================================

    /// Group id (GRP_ID[10:0])
    pub fn group_id(&self) -> u32 {
        self.read_reg(GRP_ID) & GRP_ID_GRP_ID
    }

    /// Number of monitors in the group (1 to 32)
    pub fn monitor_count(&self) -> u32 {
        self.field(GRP_ID, GRP_ID_MON_NUM, GRP_ID_MON_NUM_POS) + 1
    }

    /// Implementation identification register
    pub fn iidr(&self) -> u32 {
        self.read_reg(IIDR)
    }

    /// Architecture identification register
    pub fn aidr(&self) -> u32 {
        self.read_reg(AIDR)
    }

    // ========================================================================
    // Features
    // ========================================================================

    /// Capability bits of FEAT0
    pub fn features(&self) -> Feat0 {
        Feat0::from_bits_truncate(self.read_reg(FEAT0))
    }

    /// Number of alert sources
    pub fn alert_count(&self) -> u32 {
        self.read_reg(FEAT0) & FEAT0_ALERT_NUM
    }

    /// Whether samples can carry a tag
    pub fn is_tag_supported(&self) -> bool {
        self.features().contains(Feat0::TAG_IN)
    }

    /// Tag width in bits
    pub fn tag_length_bits(&self) -> u32 {
        self.field(FEAT0, FEAT0_TAG_LEN, FEAT0_TAG_LEN_POS) + 1
    }

    /// Whether the block can write samples to RAM
    pub fn is_dma_supported(&self) -> bool {
        self.features().contains(Feat0::DMA_IF)
    }

    /// Whether an alternate read address can be programmed
    pub fn is_alternate_address_supported(&self) -> bool {
        self.read_reg(DATA_INFO) & DATA_INFO_ALT_ADDR != 0
    }

    /// Whether narrow values share storage words
    pub fn is_data_packed(&self) -> bool {
        self.read_reg(DATA_INFO) & DATA_INFO_PACKED != 0
    }

    /// Data values produced by each monitor per sample
    pub fn data_values_per_monitor(&self) -> u32 {
        (self.read_reg(DATA_INFO) & DATA_INFO_DATA_PER_MON) + 1
    }

    /// Width of each data value in bits
    pub fn monitor_data_width(&self) -> u32 {
        self.field(DATA_INFO, DATA_INFO_MON_DATA_WIDTH, DATA_INFO_MON_DATA_WIDTH_POS) + 1
    }

    // ========================================================================
    // Monitor Enable
    // ========================================================================

    #[inline]
    fn check_monitor(&self, monitor: u32) -> FwkResult<()> {
        if monitor >= self.monitor_count() {
            return Err(FwkError::Range);
        }
        Ok(())
    }

    /// Whether the hardware reports `monitor` as enabled
    pub fn is_monitor_enabled(&self, monitor: u32) -> bool {
        monitor < 32 && self.read_reg(MON_STAT) & (1 << monitor) != 0
    }

    /// Request `monitor` to be enabled
    pub fn enable_monitor(&self, monitor: u32) -> FwkResult<()> {
        self.check_monitor(monitor)?;
        self.set_bits(MON_REQ, 1 << monitor);
        Ok(())
    }

    /// Request `monitor` to be disabled
    pub fn disable_monitor(&self, monitor: u32) -> FwkResult<()> {
        self.check_monitor(monitor)?;
        self.clear_bits(MON_REQ, 1 << monitor);
        Ok(())
    }

    /// Enable `monitor` and poll until the hardware applied it
    pub fn enable_monitor_blocking(&self, monitor: u32, policy: PollPolicy) -> FwkResult<()> {
        self.enable_monitor(monitor)?;
        policy.wait_until(|| self.is_monitor_enabled(monitor))
    }

    /// Disable `monitor` and poll until the hardware applied it
    pub fn disable_monitor_blocking(&self, monitor: u32, policy: PollPolicy) -> FwkResult<()> {
        self.disable_monitor(monitor)?;
        policy.wait_until(|| !self.is_monitor_enabled(monitor))
    }

    /// Request every monitor of the group to be enabled
    pub fn enable_all_monitors(&self) -> FwkResult<()> {
        (0..self.monitor_count()).try_for_each(|monitor| self.enable_monitor(monitor))
    }

    // ========================================================================
    // Monitor Modes
    // ========================================================================

    /// Number of MODE_REQ / MODE_STAT register pairs in use
    pub fn mode_register_count(&self) -> u32 {
        (self.read_reg(FEAT1) & FEAT1_MODE_REG) + 1
    }

    /// Width of each mode register in bits
    pub fn mode_register_width(&self) -> u32 {
        self.field(FEAT1, FEAT1_MODE_LEN, FEAT1_MODE_LEN_POS) + 1
    }

    /// Start broadcasting mode writes to `monitor`
    pub fn enable_program_mode(&self, monitor: u32) -> FwkResult<()> {
        self.check_monitor(monitor)?;
        self.set_bits(MODE_BCAST, 1 << monitor);
        Ok(())
    }

    /// Start broadcasting mode writes to every monitor in `mask`
    pub fn enable_program_mode_multi(&self, mask: u32) -> FwkResult<()> {
        if u64::from(mask) >= 1u64 << self.monitor_count() {
            return Err(FwkError::Range);
        }
        self.set_bits(MODE_BCAST, mask);
        Ok(())
    }

    /// Stop broadcasting mode writes to `monitor`
    pub fn disable_program_mode(&self, monitor: u32) -> FwkResult<()> {
        self.check_monitor(monitor)?;
        self.clear_bits(MODE_BCAST, 1 << monitor);
        Ok(())
    }

    #[inline]
    fn check_mode_index(&self, mode_index: u32) -> FwkResult<usize> {
        let count = self.mode_register_count().min(MAX_MODE_REGS as u32);
        if mode_index >= count {
            return Err(FwkError::Range);
        }
        Ok(mode_index as usize)
    }

    /// Write MODE_REQ`mode_index`, truncated to the mode register width
    pub fn set_monitor_mode(&self, mode_index: u32, value: u32) -> FwkResult<()> {
        let index = self.check_mode_index(mode_index)?;
        let mask = bit_mask(self.mode_register_width());
        self.write_reg(mode_req(index), value & mask);
        Ok(())
    }

    /// Current MODE_STAT`mode_index`
    pub fn monitor_mode(&self, mode_index: u32) -> FwkResult<u32> {
        let index = self.check_mode_index(mode_index)?;
        Ok(self.read_reg(mode_stat(index)))
    }

    /// Whether every mode request has been applied
    pub fn is_monitor_mode_updated(&self) -> bool {
        let count = (self.mode_register_count() as usize).min(MAX_MODE_REGS);
        (0..count).all(|i| self.read_reg(mode_req(i)) == self.read_reg(mode_stat(i)))
    }

    /// Poll until every mode request has been applied
    pub fn wait_monitor_mode_updated(&self, policy: PollPolicy) -> FwkResult<()> {
        policy.wait_until(|| self.is_monitor_mode_updated())
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    /// Set the sample enable bit
    pub fn enable_sample(&self) {
        self.set_bits(SMP_EN, SMP_EN_EN);
    }

    /// Clear the sample enable bit
    pub fn disable_sample(&self) {
        self.clear_bits(SMP_EN, SMP_EN_EN);
    }

    /// Whether the sample enable bit is set
    pub fn is_sample_enabled(&self) -> bool {
        self.read_reg(SMP_EN) & SMP_EN_EN != 0
    }

    /// Whether a sample is in progress
    pub fn is_sample_ongoing(&self) -> bool {
        self.read_reg(SMP_EN) & SMP_EN_OG != 0
    }

    /// Select what starts a sample
    ///
    /// Periodic sampling needs the sample timer and trigger sampling needs
    /// the trigger input; otherwise [`FwkError::Support`].
    pub fn set_sample_type(&self, sample_type: SampleType) -> FwkResult<()> {
        if !self.is_sample_type_supported(sample_type) {
            return Err(FwkError::Support);
        }

        let cfg = self.read_reg(SMP_CFG) & !SMP_CFG_SMP_TYP;
        self.write_reg(SMP_CFG, cfg | (sample_type as u32 & SMP_CFG_SMP_TYP));
        Ok(())
    }

    /// Whether the group can be sampled with `sample_type`
    pub fn is_sample_type_supported(&self, sample_type: SampleType) -> bool {
        let features = self.features();
        match sample_type {
            SampleType::Periodic => features.contains(Feat0::PER_TIMER),
            SampleType::TriggerInput => features.contains(Feat0::TRIGGER_IN),
            _ => true,
        }
    }

    /// Select the sample type from its raw encoding
    ///
    /// Encodings past the last type fail with [`FwkError::Range`].
    pub fn set_sample_type_raw(&self, raw: u32) -> FwkResult<()> {
        let sample_type = SampleType::from_raw(raw).ok_or(FwkError::Range)?;
        self.set_sample_type(sample_type)
    }

    /// Currently selected sample type
    pub fn sample_type(&self) -> SampleType {
        // The two-bit field always decodes
        SampleType::from_raw(self.read_reg(SMP_CFG) & SMP_CFG_SMP_TYP).unwrap_or_default()
    }

    /// Program the sample timer period
    pub fn set_sample_period(&self, period: u32) -> FwkResult<()> {
        if !self.features().contains(Feat0::PER_TIMER) {
            return Err(FwkError::Support);
        }
        self.write_reg(SMP_PER, period);
        Ok(())
    }

    /// Largest sample delay the hardware accepts
    pub fn sample_delay_max(&self) -> u32 {
        bit_mask(self.field(FEAT1, FEAT1_SMP_DLY_LEN, FEAT1_SMP_DLY_LEN_POS))
    }

    /// Program the delay between sample start and capture
    pub fn set_sample_delay(&self, delay: u32) -> FwkResult<()> {
        if delay > self.sample_delay_max() {
            return Err(FwkError::Range);
        }
        self.write_reg(SMP_DLY, delay);
        Ok(())
    }

    // ========================================================================
    // DMA and Alternate Address
    // ========================================================================

    /// Program the RAM address samples are written to
    pub fn set_dma_data_address(&self, address: u64) -> FwkResult<()> {
        if !self.is_dma_supported() {
            return Err(FwkError::Support);
        }
        if address & 0x3 != 0 {
            return Err(FwkError::Align);
        }
        self.write_reg(WADDR0, address as u32);
        self.write_reg(WADDR1, (address >> 32) as u32);
        Ok(())
    }

    /// Programmed DMA write address
    pub fn dma_data_address(&self) -> u64 {
        u64::from(self.read_reg(WADDR1)) << 32 | u64::from(self.read_reg(WADDR0))
    }

    /// Turn on the DMA write path
    pub fn enable_dma(&self) -> FwkResult<()> {
        if !self.is_dma_supported() {
            return Err(FwkError::Support);
        }
        self.set_bits(WREN, WREN_DMA_IF);
        Ok(())
    }

    /// Whether the DMA write path is on
    pub fn is_dma_enabled(&self) -> bool {
        self.read_reg(WREN) & WREN_DMA_IF != 0
    }

    /// Program the alternate address the sample data is read from
    pub fn set_alternate_data_address(&self, address: u64) -> FwkResult<()> {
        if !self.is_alternate_address_supported() {
            return Err(FwkError::Support);
        }
        self.write_reg(RADDR0, address as u32);
        self.write_reg(RADDR1, (address >> 32) as u32);
        Ok(())
    }

    /// Programmed alternate read address
    pub fn alternate_data_address(&self) -> u64 {
        u64::from(self.read_reg(RADDR1)) << 32 | u64::from(self.read_reg(RADDR0))
    }

    // ========================================================================
    // Write Configuration
    // ========================================================================

    /// Header write-enable bits
    pub fn write_config(&self) -> WrCfg {
        WrCfg::from_bits_truncate(self.read_reg(WRCFG))
    }

    /// Set header write-enable bits
    pub fn enable_writes(&self, flags: WrCfg) {
        self.set_bits(WRCFG, flags.bits());
    }

    /// Write the group id ahead of the data
    pub fn enable_group_id_write(&self) {
        self.enable_writes(WrCfg::GRP_ID_EN);
    }

    /// Write the valid bits ahead of the data
    pub fn enable_valid_bits_write(&self) {
        self.enable_writes(WrCfg::DATA_VLD_EN);
    }

    /// Write the sample count ahead of the data
    pub fn enable_count_id_write(&self) {
        self.enable_writes(WrCfg::INCR_ID_EN);
    }

    /// Write the tag ahead of the data
    pub fn enable_tag_id_write(&self) {
        self.enable_writes(WrCfg::TAG_ID_EN);
    }

    fn set_num_sample_id(&self, value: u32) {
        let cfg = self.read_reg(WRCFG) & !WRCFG_NUM_SAMPLE_ID;
        self.write_reg(WRCFG, cfg | (value << WRCFG_NUM_SAMPLE_ID_POS));
    }

    /// Write only the start sample id
    pub fn request_start_id_write(&self) {
        self.set_num_sample_id(WRCFG_WRITE_START_SAMPLE_ID);
    }

    /// Write both the start and the end sample id
    pub fn request_start_and_end_id_write(&self) {
        self.set_num_sample_id(WRCFG_WRITE_START_AND_END_SAMPLE_ID);
    }

    /// Number of sample ids written per sample (0, 1 or 2)
    pub fn sample_ids_written(&self) -> u32 {
        self.field(WRCFG, WRCFG_NUM_SAMPLE_ID, WRCFG_NUM_SAMPLE_ID_POS)
    }

    // ========================================================================
    // Sample Status
    // ========================================================================

    /// Start sample id value, 0 if never written
    pub fn start_sample_id(&self) -> u32 {
        decode_sample_id(self.read_reg(SMPID_START))
    }

    /// End sample id value, 0 if never written
    pub fn end_sample_id(&self) -> u32 {
        decode_sample_id(self.read_reg(SMPID_END))
    }

    /// Whether the last sample of `monitor` is valid
    pub fn is_data_valid(&self, monitor: u32) -> bool {
        monitor < 32 && self.read_reg(DVLD) & (1 << monitor) != 0
    }

    // ========================================================================
    // Errors
    // ========================================================================

    /// Raw error code field
    pub fn error_code(&self) -> u32 {
        self.read_reg(ERR_CODE) & ERR_CODE_ERROR_CODE
    }

    /// Monitor that reported the last error
    pub fn error_monitor_id(&self) -> u32 {
        self.field(ERR_CODE, ERR_CODE_MON_ID, ERR_CODE_MON_ID_POS)
    }

    /// Last error, if `monitor` reported it
    pub fn monitor_error(&self, monitor: u32) -> Option<MgiErrorCode> {
        let reg = self.read_reg(ERR_CODE);
        if (reg & ERR_CODE_MON_ID) >> ERR_CODE_MON_ID_POS != monitor {
            return None;
        }
        Some(MgiErrorCode::from_raw(reg & ERR_CODE_ERROR_CODE))
    }

    // ========================================================================
    // Interrupts
    // ========================================================================

    /// Raw IRQ_STAT, including positions with no named source
    pub fn irq_status(&self) -> u32 {
        self.read_reg(IRQ_STAT)
    }

    /// Clear status bit `pos`
    pub fn clear_source_pos(&self, pos: u32) -> FwkResult<()> {
        if pos >= IrqSource::MAX {
            return Err(FwkError::Range);
        }
        self.clear_bits(IRQ_STAT, 1 << pos);
        Ok(())
    }

    /// Whether `source` is asserted
    pub fn is_source_triggered(&self, source: IrqSource) -> bool {
        self.read_reg(IRQ_STAT) & source.mask() != 0
    }

    /// Clear the status bit of `source`
    pub fn clear_source(&self, source: IrqSource) {
        self.clear_bits(IRQ_STAT, source.mask());
    }

    /// Stop `source` from raising the interrupt line
    pub fn mask_source(&self, source: IrqSource) {
        self.set_bits(IRQ_MASK, source.mask());
    }

    /// Let `source` raise the interrupt line
    pub fn unmask_source(&self, source: IrqSource) {
        self.clear_bits(IRQ_MASK, source.mask());
    }

    /// Whether `source` is masked
    pub fn is_source_masked(&self, source: IrqSource) -> bool {
        self.read_reg(IRQ_MASK) & source.mask() != 0
    }
}

#[inline]
fn decode_sample_id(encoded: u32) -> u32 {
    match SampleIdStatus::of(encoded) {
        SampleIdStatus::Uninitialized => 0,
        _ => sample_id_value(encoded),
    }
}
