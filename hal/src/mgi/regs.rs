//! # MGI Register Map
//!
//! | Offset  | Register         | Description                          |
//! |---------|------------------|--------------------------------------|
//! | 0x000   | GRP_ID           | Group id and monitor count           |
//! | 0x008   | DATA_INFO        | Data values, width and packing       |
//! | 0x010   | FEAT0            | Feature register 0                   |
//! | 0x018   | FEAT1            | Feature register 1                   |
//! | 0x030   | SMP_EN           | Sample enable / ongoing              |
//! | 0x038   | SMP_CFG          | Sample type                          |
//! | 0x040   | SMP_PER          | Sample period                        |
//! | 0x048   | SMP_DLY          | Sample delay                         |
//! | 0x060   | MON_REQ          | Monitor enable request               |
//! | 0x070   | MON_STAT         | Monitor enable status                |
//! | 0x080   | MODE_BCAST       | Mode programming broadcast           |
//! | 0x090   | MODE_REQ0..3     | Mode request (stride 8)              |
//! | 0x0C0   | MODE_STAT0..3    | Mode status (stride 8)               |
//! | 0x100   | IRQ_STAT         | Interrupt status                     |
//! | 0x110   | IRQ_MASK         | Interrupt mask                       |
//! | 0x140   | TRG_MASK         | Trigger mask                         |
//! | 0x150   | ERR_CODE         | Last error code and monitor          |
//! | 0x160   | WREN             | Write enable (DMA path)              |
//! | 0x168   | WRCFG            | Write configuration                  |
//! | 0x170   | WADDR0/1         | DMA write address low/high           |
//! | 0x180   | RADDR0/1         | Alternate read address low/high      |
//! | 0x190   | DISCON_ID        | Disconnect id                        |
//! | 0x198   | CON_STAT         | Connection status                    |
//! | 0x1B0   | CMD_SEND0/1      | Command send                         |
//! | 0x1C0   | CMD_RECV0/1      | Command receive                      |
//! | 0x200   | ATYPn/AVAL_*n    | Alert type and values (stride 0x10)  |
//! | 0x700   | DATA             | Monitor data (512 words)             |
//! | 0xF00   | DVLD             | Data valid bits                      |
//! | 0xF10   | TAG0..3          | Sample tag                           |
//! | 0xF40   | SMPID_START      | Start sample id                      |
//! | 0xF48   | SMPID_END        | End sample id                        |
//! | 0xFC0   | IIDR             | Implementation identification        |
//! | 0xFC8   | AIDR             | Architecture identification          |

#![allow(missing_docs)]

use static_assertions::const_assert;

// ============================================================================
// Register Offsets
// ============================================================================

/// Size of the register block in bytes
pub const MGI_BLOCK_SIZE: usize = 0x1000;

/// Size of the register block in 32-bit words
pub const MGI_BLOCK_WORDS: usize = MGI_BLOCK_SIZE / 4;

pub const GRP_ID: usize = 0x000;
pub const DATA_INFO: usize = 0x008;
pub const FEAT0: usize = 0x010;
pub const FEAT1: usize = 0x018;
pub const SMP_EN: usize = 0x030;
pub const SMP_CFG: usize = 0x038;
pub const SMP_PER: usize = 0x040;
pub const SMP_DLY: usize = 0x048;
pub const MON_REQ: usize = 0x060;
pub const MON_STAT: usize = 0x070;
pub const MODE_BCAST: usize = 0x080;
pub const MODE_REQ0: usize = 0x090;
pub const MODE_STAT0: usize = 0x0C0;
/// Distance between consecutive MODE_REQ / MODE_STAT registers
pub const MODE_STRIDE: usize = 0x8;
pub const IRQ_STAT: usize = 0x100;
pub const IRQ_MASK: usize = 0x110;
pub const TRG_MASK: usize = 0x140;
pub const ERR_CODE: usize = 0x150;
pub const WREN: usize = 0x160;
pub const WRCFG: usize = 0x168;
pub const WADDR0: usize = 0x170;
pub const WADDR1: usize = 0x174;
pub const RADDR0: usize = 0x180;
pub const RADDR1: usize = 0x184;
pub const DISCON_ID: usize = 0x190;
pub const CON_STAT: usize = 0x198;
pub const CMD_SEND0: usize = 0x1B0;
pub const CMD_SEND1: usize = 0x1B8;
pub const CMD_RECV0: usize = 0x1C0;
pub const CMD_RECV1: usize = 0x1C8;
pub const ATYP0: usize = 0x200;
/// Distance between consecutive alert register groups
pub const ALERT_STRIDE: usize = 0x10;
/// AVAL_LOW offset inside an alert register group
pub const AVAL_LOW: usize = 0x8;
/// AVAL_HIGH offset inside an alert register group
pub const AVAL_HIGH: usize = 0xC;
/// Number of alert register groups
pub const ALERT_GROUPS: usize = 7;
pub const DATA: usize = 0x700;
/// Number of words in the DATA array
pub const DATA_NUM_VALUES: usize = 512;
pub const DVLD: usize = 0xF00;
pub const TAG0: usize = 0xF10;
/// Number of TAG registers
pub const TAG_REGS: usize = 4;
pub const SMPID_START: usize = 0xF40;
pub const SMPID_END: usize = 0xF48;
pub const IIDR: usize = 0xFC0;
pub const AIDR: usize = 0xFC8;

/// Byte offset of MODE_REQn
pub const fn mode_req(n: usize) -> usize {
    MODE_REQ0 + n * MODE_STRIDE
}

/// Byte offset of MODE_STATn
pub const fn mode_stat(n: usize) -> usize {
    MODE_STAT0 + n * MODE_STRIDE
}

/// Byte offset of ATYPn
pub const fn atyp(n: usize) -> usize {
    ATYP0 + n * ALERT_STRIDE
}

const_assert!(mode_req(1) == 0x098);
const_assert!(mode_req(3) == 0x0A8);
const_assert!(mode_stat(3) == 0x0D8);
const_assert!(mode_req(MAX_MODE_REGS - 1) < mode_stat(0));
const_assert!(atyp(ALERT_GROUPS - 1) + AVAL_HIGH == 0x26C);
const_assert!(atyp(ALERT_GROUPS - 1) + AVAL_HIGH < DATA);
const_assert!(DATA + DATA_NUM_VALUES * 4 == DVLD);
const_assert!(TAG0 + TAG_REGS * 4 <= SMPID_START);
const_assert!(AIDR < MGI_BLOCK_SIZE);

// ============================================================================
// GRP_ID
// ============================================================================

pub const GRP_ID_GRP_ID: u32 = 0x0000_07FF;
pub const GRP_ID_MON_NUM: u32 = 0x001F_0000;
pub const GRP_ID_MON_NUM_POS: u32 = 16;

// ============================================================================
// DATA_INFO
// ============================================================================

pub const DATA_INFO_DATA_PER_MON: u32 = 0x0000_FFFF;
pub const DATA_INFO_PACKED: u32 = 1 << 20;
pub const DATA_INFO_ALT_ADDR: u32 = 1 << 21;
pub const DATA_INFO_MON_DATA_WIDTH: u32 = 0x0FC0_0000;
pub const DATA_INFO_MON_DATA_WIDTH_POS: u32 = 22;

// ============================================================================
// FEAT0 / FEAT1
// ============================================================================

pub const FEAT0_ALERT_NUM: u32 = 0x0000_0007;
pub const FEAT0_TAG_LEN: u32 = 0x0000_7F00;
pub const FEAT0_TAG_LEN_POS: u32 = 8;

pub const FEAT1_MODE_REG: u32 = 0x0000_0007;
pub const FEAT1_MODE_LEN: u32 = 0x0000_1F00;
pub const FEAT1_MODE_LEN_POS: u32 = 8;
pub const FEAT1_SMP_DLY_LEN: u32 = 0x003F_0000;
pub const FEAT1_SMP_DLY_LEN_POS: u32 = 16;

/// Number of MODE_REQ / MODE_STAT register pairs in the block
pub const MAX_MODE_REGS: usize = 4;

/// Mode register width at which any 32-bit value is accepted
pub const MODE_MAX_WORD_LEN: u32 = 32;

// ============================================================================
// SMP_EN / SMP_CFG
// ============================================================================

pub const SMP_EN_EN: u32 = 1 << 0;
pub const SMP_EN_OG: u32 = 1 << 1;
pub const SMP_CFG_SMP_TYP: u32 = 0x3;

// ============================================================================
// Sample ids
// ============================================================================

pub const SMPID_VALUE: u32 = 0x0FFF_FFFF;
pub const SMPID_STATUS: u32 = 0xF000_0000;
pub const SMPID_STATUS_POS: u32 = 28;

// ============================================================================
// ERR_CODE
// ============================================================================

pub const ERR_CODE_ERROR_CODE: u32 = 0x0000_001F;
pub const ERR_CODE_MON_ID: u32 = 0x0000_1F00;
pub const ERR_CODE_MON_ID_POS: u32 = 8;

// ============================================================================
// WREN / WRCFG
// ============================================================================

pub const WREN_DMA_IF: u32 = 1 << 0;

pub const WRCFG_WR_COND: u32 = 0x3;
pub const WRCFG_NUM_SAMPLE_ID: u32 = 0x30;
pub const WRCFG_NUM_SAMPLE_ID_POS: u32 = 4;
pub const WRCFG_WRITE_START_SAMPLE_ID: u32 = 1;
pub const WRCFG_WRITE_START_AND_END_SAMPLE_ID: u32 = 2;

// ============================================================================
// Word indices used by in-block data locations
// ============================================================================

/// Word index of a byte offset inside the block
pub const fn word(offset: usize) -> usize {
    offset / 4
}

const_assert!(word(DVLD) < MGI_BLOCK_WORDS);
const_assert!(word(SMPID_END) < MGI_BLOCK_WORDS);
