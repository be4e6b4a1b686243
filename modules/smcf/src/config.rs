//! # Platform Configuration
//!
//! Each monitor group is described by an [`SmcfElementConfig`], normally
//! built in a `const` table by the platform:
//!
//! ```rust,ignore
//! const MGI0: SmcfElementConfig = unsafe {
//!     SmcfElementConfig::new(
//!         0x5000_0000,
//!         DataConfig::new(
//!             HeaderFormat::DATA_VALID_BITS.union(HeaderFormat::COUNT_ID),
//!             DataLocation::Mgi,
//!         ),
//!     )
//! }
//! .with_irq(42)
//! .with_sample_type(SampleType::Periodic)
//! .with_sample_period(1000);
//! ```

use scp_core::interrupts::IrqLine;
use scp_hal::mgi::SampleType;
use scp_hal::PollPolicy;

use crate::header::HeaderFormat;

/// RAM the sample records are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamRegion {
    addr: usize,
    words: usize,
}

impl RamRegion {
    /// Describe `words` 32-bit words at `addr`
    ///
    /// # Safety
    ///
    /// The memory must stay mapped and readable for the lifetime of the
    /// driver, and may only be written by the monitor group hardware.
    pub const unsafe fn new(addr: usize, words: usize) -> Self {
        Self { addr, words }
    }

    /// Start address
    pub const fn addr(&self) -> usize {
        self.addr
    }

    /// Length in 32-bit words
    pub const fn words(&self) -> usize {
        self.words
    }
}

/// Where sample records are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLocation {
    /// In the monitor group's own registers
    Mgi,
    /// Written over DMA to `write_addr`, read back through `read`
    Ram {
        /// Address the hardware writes to
        write_addr: u64,
        /// The same memory as seen by this processor
        read: RamRegion,
    },
    /// As [`DataLocation::Ram`], with the data also readable at an alternate
    /// address programmed into the group
    Alternate {
        /// Address the hardware writes to
        write_addr: u64,
        /// The same memory as seen by this processor
        read: RamRegion,
        /// Alternate read address programmed into the group
        alt_addr: u64,
    },
}

/// Sample record configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataConfig {
    /// Header fields present in each record
    pub header_format: HeaderFormat,
    /// Record storage
    pub location: DataLocation,
}

impl DataConfig {
    /// Create a data configuration
    pub const fn new(header_format: HeaderFormat, location: DataLocation) -> Self {
        Self {
            header_format,
            location,
        }
    }
}

/// Configuration of one monitor group element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmcfElementConfig {
    reg_base: usize,
    /// Interrupt line, or `None` when another module forwards interrupts
    pub irq: Option<IrqLine>,
    /// What starts a sample
    pub sample_type: SampleType,
    /// Sample timer period, programmed when set
    pub sample_period: Option<u32>,
    /// Sample delay, programmed when set
    pub sample_delay: Option<u32>,
    /// Sample record layout
    pub data: DataConfig,
    /// Polling bound for blocking requests
    pub poll: PollPolicy,
}

impl SmcfElementConfig {
    /// Create a configuration for the group whose registers are at
    /// `reg_base`
    ///
    /// # Safety
    ///
    /// `reg_base` must map a complete MGI register block for the lifetime of
    /// the driver.
    pub const unsafe fn new(reg_base: usize, data: DataConfig) -> Self {
        Self {
            reg_base,
            irq: None,
            sample_type: SampleType::Manual,
            sample_period: None,
            sample_delay: None,
            data,
            poll: PollPolicy::Unbounded,
        }
    }

    /// Register base address
    pub const fn reg_base(&self) -> usize {
        self.reg_base
    }

    /// Deliver interrupts on `irq`
    pub const fn with_irq(mut self, irq: IrqLine) -> Self {
        self.irq = Some(irq);
        self
    }

    /// Select what starts a sample
    pub const fn with_sample_type(mut self, sample_type: SampleType) -> Self {
        self.sample_type = sample_type;
        self
    }

    /// Program the sample timer period
    pub const fn with_sample_period(mut self, period: u32) -> Self {
        self.sample_period = Some(period);
        self
    }

    /// Program the sample delay
    pub const fn with_sample_delay(mut self, delay: u32) -> Self {
        self.sample_delay = Some(delay);
        self
    }

    /// Bound blocking requests
    pub const fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}
