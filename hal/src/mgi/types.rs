//! Typed views of MGI register fields.

use bitflags::bitflags;

use super::regs::{SMPID_STATUS, SMPID_STATUS_POS, SMPID_VALUE};

bitflags! {
    /// Capability bits of FEAT0
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Feat0: u32 {
        /// Mode programming targets a single monitor
        const SINGLE_MON_MODE = 1 << 23;
        /// Alerts can compare against a delta
        const ALT_DELTA = 1 << 24;
        /// Tag input present
        const TAG_IN = 1 << 25;
        /// Trigger input present
        const TRIGGER_IN = 1 << 26;
        /// Trigger output present
        const TRIGGER_OUT = 1 << 27;
        /// DMA write interface present
        const DMA_IF = 1 << 28;
        /// User-defined commands supported
        const USER_DEF_CMD = 1 << 29;
        /// Monitors can be disconnected
        const MON_DISCON = 1 << 30;
        /// Periodic sample timer present
        const PER_TIMER = 1 << 31;
    }
}

bitflags! {
    /// Write-enable bits of WRCFG selecting which header fields the DMA
    /// engine writes ahead of the data
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WrCfg: u32 {
        /// Write the group id
        const GRP_ID_EN = 1 << 8;
        /// Write the data valid bits
        const DATA_VLD_EN = 1 << 9;
        /// Write the incrementing sample id
        const INCR_ID_EN = 1 << 10;
        /// Write the tag
        const TAG_ID_EN = 1 << 11;
        /// Synchronize the completion interrupt with the write
        const IRQ_WR_SYNC = 1 << 16;
    }
}

/// Event that starts a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum SampleType {
    /// Software requests each sample
    #[default]
    Manual = 0,
    /// The periodic timer starts samples
    Periodic = 1,
    /// Reading the data starts the next sample
    DataRead = 2,
    /// An external trigger input starts samples
    TriggerInput = 3,
}

impl SampleType {
    /// Decode an SMP_CFG type field
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(SampleType::Manual),
            1 => Some(SampleType::Periodic),
            2 => Some(SampleType::DataRead),
            3 => Some(SampleType::TriggerInput),
            _ => None,
        }
    }
}

/// Status nibble of an encoded sample id word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleIdStatus {
    /// Never written
    Uninitialized,
    /// Monitor group powered off
    PoweredOff,
    /// Value field holds a sample count
    ValidCount,
    /// Value field holds a tag length in words
    ValidTagLength,
    /// Any other encoding
    Reserved(u32),
}

impl SampleIdStatus {
    const UNINITIALIZED: u32 = 0x0;
    const POWERED_OFF: u32 = 0x1;
    const VALID_COUNT: u32 = 0x8;
    const VALID_TAG_LENGTH: u32 = 0x9;

    /// Status of an encoded sample id word
    pub const fn of(encoded: u32) -> Self {
        match (encoded & SMPID_STATUS) >> SMPID_STATUS_POS {
            Self::UNINITIALIZED => SampleIdStatus::Uninitialized,
            Self::POWERED_OFF => SampleIdStatus::PoweredOff,
            Self::VALID_COUNT => SampleIdStatus::ValidCount,
            Self::VALID_TAG_LENGTH => SampleIdStatus::ValidTagLength,
            other => SampleIdStatus::Reserved(other),
        }
    }

    /// Raw status nibble
    pub const fn raw(self) -> u32 {
        match self {
            SampleIdStatus::Uninitialized => Self::UNINITIALIZED,
            SampleIdStatus::PoweredOff => Self::POWERED_OFF,
            SampleIdStatus::ValidCount => Self::VALID_COUNT,
            SampleIdStatus::ValidTagLength => Self::VALID_TAG_LENGTH,
            SampleIdStatus::Reserved(raw) => raw & 0xF,
        }
    }

    /// Encode `value` with this status
    pub const fn encode(self, value: u32) -> u32 {
        (self.raw() << SMPID_STATUS_POS) | (value & SMPID_VALUE)
    }
}

/// Value field of an encoded sample id word
#[inline]
pub const fn sample_id_value(encoded: u32) -> u32 {
    encoded & SMPID_VALUE
}

/// Error codes reported in ERR_CODE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MgiErrorCode {
    /// Sampling failed
    Sample,
    /// Sample requested on a disabled monitor
    SampleOnDisabled,
    /// Enable failed
    Enable,
    /// Disable failed
    Disable,
    /// Mode change failed
    Mode,
    /// Mode change requested on a disabled monitor
    ModeOnDisabled,
    /// Monitor received an unknown command
    UnknownCmdMli,
    /// Sample period shorter than the sampling time
    SamplePeriodWarning,
    /// Group received an unknown command
    UnknownCmdMgi,
    /// Code not defined by the architecture
    Reserved(u32),
}

impl MgiErrorCode {
    /// Decode the ERR_CODE error field
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0 => MgiErrorCode::Sample,
            1 => MgiErrorCode::SampleOnDisabled,
            2 => MgiErrorCode::Enable,
            3 => MgiErrorCode::Disable,
            4 => MgiErrorCode::Mode,
            5 => MgiErrorCode::ModeOnDisabled,
            7 => MgiErrorCode::UnknownCmdMli,
            16 => MgiErrorCode::SamplePeriodWarning,
            23 => MgiErrorCode::UnknownCmdMgi,
            other => MgiErrorCode::Reserved(other),
        }
    }
}

/// Interrupt sources, by bit position in IRQ_STAT / IRQ_MASK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum IrqSource {
    /// Sample complete
    SampleComplete = 0,
    /// Monitor enable applied
    MonitorEnable = 1,
    /// Monitor mode applied
    MonitorMode = 2,
    /// Command received
    CommandReceived = 3,
    /// Error reported in ERR_CODE
    Error = 4,
    /// Monitor trigger
    MonitorTrigger = 5,
    /// Input trigger
    InputTrigger = 6,
    /// Configuration changed
    Config = 7,
    /// Data write finished
    DataWrite = 8,
    /// Alert 0
    Alert0 = 16,
    /// Alert 1
    Alert1 = 17,
    /// Alert 2
    Alert2 = 18,
    /// Alert 3
    Alert3 = 19,
    /// Alert 4
    Alert4 = 20,
    /// Alert 5
    Alert5 = 21,
    /// Alert 6
    Alert6 = 22,
}

impl IrqSource {
    /// One past the highest source position
    pub const MAX: u32 = 23;

    /// Every named source in bit order
    pub const ALL: [IrqSource; 16] = [
        IrqSource::SampleComplete,
        IrqSource::MonitorEnable,
        IrqSource::MonitorMode,
        IrqSource::CommandReceived,
        IrqSource::Error,
        IrqSource::MonitorTrigger,
        IrqSource::InputTrigger,
        IrqSource::Config,
        IrqSource::DataWrite,
        IrqSource::Alert0,
        IrqSource::Alert1,
        IrqSource::Alert2,
        IrqSource::Alert3,
        IrqSource::Alert4,
        IrqSource::Alert5,
        IrqSource::Alert6,
    ];

    /// Source at bit position `pos`
    pub const fn from_pos(pos: u32) -> Option<Self> {
        match pos {
            0 => Some(IrqSource::SampleComplete),
            1 => Some(IrqSource::MonitorEnable),
            2 => Some(IrqSource::MonitorMode),
            3 => Some(IrqSource::CommandReceived),
            4 => Some(IrqSource::Error),
            5 => Some(IrqSource::MonitorTrigger),
            6 => Some(IrqSource::InputTrigger),
            7 => Some(IrqSource::Config),
            8 => Some(IrqSource::DataWrite),
            16 => Some(IrqSource::Alert0),
            17 => Some(IrqSource::Alert1),
            18 => Some(IrqSource::Alert2),
            19 => Some(IrqSource::Alert3),
            20 => Some(IrqSource::Alert4),
            21 => Some(IrqSource::Alert5),
            22 => Some(IrqSource::Alert6),
            _ => None,
        }
    }

    /// Bit position
    #[inline]
    pub const fn pos(self) -> u32 {
        self as u32
    }

    /// Bit mask
    #[inline]
    pub const fn mask(self) -> u32 {
        1 << self.pos()
    }
}
