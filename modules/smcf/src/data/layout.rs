//! # Sample Layout Resolution
//!
//! Binds a [`DataConfig`] to a monitor group: works out the word offset of
//! every header field and of the data payload, and programs the group to
//! write records in that shape.
//!
//! Resolution runs in two phases. [`plan`] is pure: it validates the format
//! against the hardware's capabilities and computes offsets and the write
//! configuration. Only when planning succeeded does [`resolve`] touch the
//! hardware, so a rejected configuration leaves the group as it was.
//! Callers with more validation of their own can run [`plan`] first and
//! [`commit`] the plan once everything else has passed.
//!
//! ## RAM records
//!
//! Fields are laid out in the fixed header order, one slot per word. The
//! cursor passes every field, enabled or not; a disabled field is given the
//! offset it would have had but occupies no space. Offsets of disabled
//! fields are therefore meaningless; readers consult the format first.
//!
//! Every tagged record reserves an end tag length slot even without
//! `END_ID`, matching what the hardware writes.

use scp_core::{FwkError, FwkResult};
use scp_hal::mgi::{regs, Mgi, WrCfg};
use scp_hal::VolatileRegion;

use super::copy::DataAttributes;
use crate::config::{DataConfig, DataLocation, RamRegion};
use crate::header::{words_for_bits, HeaderFormat};

/// How many sample ids the group writes per record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleIds {
    /// Start id only
    Start,
    /// Start and end ids
    StartAndEnd,
}

/// Word offsets of the header fields and the data payload
///
/// A tag length of `None` means the record carries no length slot; the
/// tag then always spans [`SampleLayout::tag_words`] words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOffsets {
    /// Group id
    pub group_id: usize,
    /// Valid bits
    pub valid_bits: usize,
    /// Start count id
    pub start_count_id: usize,
    /// End count id
    pub end_count_id: usize,
    /// Start tag length
    pub start_tag_length: Option<usize>,
    /// Start tag
    pub start_tag: usize,
    /// End tag length
    pub end_tag_length: Option<usize>,
    /// End tag
    pub end_tag: usize,
    /// First data word
    pub data: usize,
}

/// Where each part of a sample record lives, relative to its storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLayout {
    /// Header fields present
    pub format: HeaderFormat,
    /// Field offsets
    pub offsets: FieldOffsets,
    /// Shape of the data
    pub attrs: DataAttributes,
    /// Monitors in the group
    pub monitor_count: u32,
    /// Words one tag occupies
    pub tag_words: usize,
    /// Words of storage the record needs
    pub record_words: usize,
}

/// Outcome of planning: the layout and the hardware programming it needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPlan {
    /// Resolved layout
    pub layout: SampleLayout,
    /// Storage to read records from
    pub storage: Storage,
}

/// Record storage and the programming it requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// The group's own register block
    Mgi,
    /// RAM written over DMA
    Ram {
        /// DMA write address
        write_addr: u64,
        /// Read side of the buffer
        read: RamRegion,
        /// Alternate read address to program, if any
        alt_addr: Option<u64>,
        /// Header write enables
        writes: WrCfg,
        /// Sample ids written per record
        sample_ids: Option<SampleIds>,
    },
}

/// Resolved layout bound to the memory it describes
#[derive(Debug, Clone, Copy)]
pub struct DataLayout {
    /// Field offsets and data shape
    pub sample: SampleLayout,
    /// Memory the offsets index into
    pub source: VolatileRegion,
}

/// Data shape reported by the group
pub fn data_attributes(mgi: &Mgi) -> DataAttributes {
    DataAttributes {
        values_per_monitor: mgi.data_values_per_monitor(),
        width: mgi.monitor_data_width(),
        packed: mgi.is_data_packed(),
    }
}

/// Check that the group can produce records with `format`
///
/// Tags need the tag input ([`FwkError::Support`]); `END_ID` needs a count
/// or a tag to repeat ([`FwkError::Param`]).
pub fn validate_header_format(mgi: &Mgi, format: HeaderFormat) -> FwkResult<()> {
    if format.contains(HeaderFormat::TAG_ID) && !mgi.is_tag_supported() {
        return Err(FwkError::Support);
    }
    if format.has_dangling_end() {
        return Err(FwkError::Param);
    }
    Ok(())
}

/// Validate `config` and compute its layout without touching the hardware
pub fn plan(mgi: &Mgi, config: &DataConfig) -> FwkResult<LayoutPlan> {
    let format = config.header_format;
    validate_header_format(mgi, format)?;

    let attrs = data_attributes(mgi);
    let monitor_count = mgi.monitor_count();
    let tag_words = if format.contains(HeaderFormat::TAG_ID) {
        words_for_bits(mgi.tag_length_bits()) as usize
    } else {
        0
    };

    let (write_addr, read, alt_addr) = match config.location {
        DataLocation::Mgi => {
            let layout = mgi_layout(format, attrs, monitor_count, tag_words)?;
            return Ok(LayoutPlan {
                layout,
                storage: Storage::Mgi,
            });
        },
        DataLocation::Ram { write_addr, read } => (write_addr, read, None),
        DataLocation::Alternate {
            write_addr,
            read,
            alt_addr,
        } => {
            if !mgi.is_alternate_address_supported() {
                return Err(FwkError::Support);
            }
            (write_addr, read, Some(alt_addr))
        },
    };

    if read.addr() == 0 {
        return Err(FwkError::Param);
    }
    if !mgi.is_dma_supported() {
        return Err(FwkError::Support);
    }
    if write_addr & 0x3 != 0 {
        return Err(FwkError::Align);
    }

    let layout = ram_layout(format, attrs, monitor_count, tag_words);
    if layout.record_words > read.words() {
        log::warn!(
            "[SMCF] Record needs {} words, RAM region has {}",
            layout.record_words,
            read.words()
        );
        return Err(FwkError::NoMem);
    }

    Ok(LayoutPlan {
        layout,
        storage: Storage::Ram {
            write_addr,
            read,
            alt_addr,
            writes: write_enables(format),
            sample_ids: sample_ids(format),
        },
    })
}

/// Plan `config`, then program the group for it
///
/// On error nothing has been written to the group.
pub fn resolve(mgi: &Mgi, config: &DataConfig) -> FwkResult<DataLayout> {
    commit(mgi, plan(mgi, config)?)
}

/// Program the group for a layout [`plan`] produced for it
pub fn commit(mgi: &Mgi, plan: LayoutPlan) -> FwkResult<DataLayout> {
    let LayoutPlan { layout, storage } = plan;

    let source = match storage {
        Storage::Mgi => mgi.block(),
        Storage::Ram {
            write_addr,
            read,
            alt_addr,
            writes,
            sample_ids,
        } => {
            // SAFETY: the RamRegion constructor's contract
            let source = unsafe { VolatileRegion::new(read.addr(), read.words())? };

            mgi.enable_writes(writes);
            match sample_ids {
                Some(SampleIds::Start) => mgi.request_start_id_write(),
                Some(SampleIds::StartAndEnd) => mgi.request_start_and_end_id_write(),
                None => {},
            }
            if let Some(alt_addr) = alt_addr {
                mgi.set_alternate_data_address(alt_addr)?;
            }
            mgi.set_dma_data_address(write_addr)?;
            mgi.enable_dma()?;
            source
        },
    };

    log::debug!(
        "[SMCF] Layout resolved: format {:#x}, data at word {}",
        layout.format.bits(),
        layout.offsets.data
    );

    Ok(DataLayout {
        sample: layout,
        source,
    })
}

/// Records read straight from the register block
///
/// The sample id registers double as the tag length slots: a tagged
/// record carries a length in SMPID_START with the tag-length status. The
/// tag itself is in TAG0..TAG3. When both count and tag are selected the
/// sample id registers hold the count, and the tag spans the full tag
/// width.
fn mgi_layout(
    format: HeaderFormat,
    attrs: DataAttributes,
    monitor_count: u32,
    tag_words: usize,
) -> FwkResult<SampleLayout> {
    if attrs.payload_words(monitor_count) > regs::DATA_NUM_VALUES || tag_words > regs::TAG_REGS {
        return Err(FwkError::NoMem);
    }

    let length_slots = !format.contains(HeaderFormat::COUNT_ID);
    let offsets = FieldOffsets {
        group_id: regs::word(regs::GRP_ID),
        valid_bits: regs::word(regs::DVLD),
        start_count_id: regs::word(regs::SMPID_START),
        end_count_id: regs::word(regs::SMPID_END),
        start_tag_length: length_slots.then_some(regs::word(regs::SMPID_START)),
        start_tag: regs::word(regs::TAG0),
        end_tag_length: length_slots.then_some(regs::word(regs::SMPID_END)),
        end_tag: regs::word(regs::TAG0),
        data: regs::word(regs::DATA),
    };

    Ok(SampleLayout {
        format,
        offsets,
        attrs,
        monitor_count,
        tag_words,
        record_words: regs::MGI_BLOCK_WORDS,
    })
}

/// Records written to RAM in the canonical header order
fn ram_layout(
    format: HeaderFormat,
    attrs: DataAttributes,
    monitor_count: u32,
    tag_words: usize,
) -> SampleLayout {
    let tagged = format.contains(HeaderFormat::TAG_ID);
    let mut cursor = 0usize;
    let mut place = |present: bool, words: usize| {
        let at = cursor;
        if present {
            cursor += words;
        }
        at
    };

    let group_id = place(format.contains(HeaderFormat::GROUP_ID), 1);
    let valid_bits = place(format.contains(HeaderFormat::DATA_VALID_BITS), 1);
    let start_count_id = place(format.contains(HeaderFormat::COUNT_ID), 1);
    let end_count_id = place(format.has_end_count(), 1);
    let start_tag_length = place(tagged, 1);
    let start_tag = place(tagged, tag_words);
    let end_tag_length = place(tagged, 1);
    let end_tag = place(format.has_end_tag(), tag_words);
    let data = place(true, 0);

    SampleLayout {
        format,
        offsets: FieldOffsets {
            group_id,
            valid_bits,
            start_count_id,
            end_count_id,
            start_tag_length: Some(start_tag_length),
            start_tag,
            end_tag_length: Some(end_tag_length),
            end_tag,
            data,
        },
        attrs,
        monitor_count,
        tag_words,
        record_words: data + attrs.payload_words(monitor_count),
    }
}

/// WRCFG bits selecting the header fields in `format`
fn write_enables(format: HeaderFormat) -> WrCfg {
    let mut writes = WrCfg::empty();
    if format.contains(HeaderFormat::GROUP_ID) {
        writes |= WrCfg::GRP_ID_EN;
    }
    if format.contains(HeaderFormat::DATA_VALID_BITS) {
        writes |= WrCfg::DATA_VLD_EN;
    }
    if format.contains(HeaderFormat::COUNT_ID) {
        writes |= WrCfg::INCR_ID_EN;
    }
    if format.contains(HeaderFormat::TAG_ID) {
        writes |= WrCfg::TAG_ID_EN;
    }
    writes
}

/// Sample ids the group must write for `format`
fn sample_ids(format: HeaderFormat) -> Option<SampleIds> {
    if !format.intersects(HeaderFormat::COUNT_ID | HeaderFormat::TAG_ID) {
        None
    } else if format.contains(HeaderFormat::END_ID) {
        Some(SampleIds::StartAndEnd)
    } else {
        Some(SampleIds::Start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scp_hal::mgi::regs::*;
    use scp_hal::mgi::Feat0;

    struct Fixture {
        _mgi_mem: Vec<u32>,
        ram: Vec<u32>,
        mgi: Mgi,
    }

    impl Fixture {
        /// 4 monitors, 1 value of 32 bits each, optional tag of `tag_bits`
        fn new(feat0: Feat0, tag_bits: u32) -> Self {
            let mut mgi_mem = vec![0u32; MGI_BLOCK_WORDS];
            mgi_mem[word(GRP_ID)] = 3 << GRP_ID_MON_NUM_POS;
            mgi_mem[word(DATA_INFO)] = 31 << DATA_INFO_MON_DATA_WIDTH_POS;
            mgi_mem[word(FEAT0)] = feat0.bits() | ((tag_bits - 1) << FEAT0_TAG_LEN_POS);
            let mgi = unsafe { Mgi::new(mgi_mem.as_mut_ptr() as usize) }.unwrap();
            Self {
                _mgi_mem: mgi_mem,
                ram: vec![0u32; 64],
                mgi,
            }
        }

        fn ram_config(&mut self, format: HeaderFormat, words: usize) -> DataConfig {
            let read = unsafe { RamRegion::new(self.ram.as_mut_ptr() as usize, words) };
            DataConfig::new(
                format,
                DataLocation::Ram {
                    write_addr: 0x8000_0000,
                    read,
                },
            )
        }

        fn set_reg(&self, offset: usize, bits: u32) {
            let block = self.mgi.block();
            let value = block.read(word(offset)).unwrap();
            block.write(word(offset), value | bits).unwrap();
        }

        fn snapshot(&self) -> Vec<u32> {
            let block = self.mgi.block();
            (0..MGI_BLOCK_WORDS).map(|i| block.read(i).unwrap()).collect()
        }
    }

    #[test]
    fn test_all_fields_with_33_bit_tag() {
        let mut fx = Fixture::new(Feat0::DMA_IF | Feat0::TAG_IN, 33);
        let config = fx.ram_config(HeaderFormat::ALL_FIELDS, 64);
        let plan = plan(&fx.mgi, &config).unwrap();
        let o = plan.layout.offsets;

        assert_eq!(o.group_id, 0);
        assert_eq!(o.valid_bits, 1);
        assert_eq!(o.start_count_id, 2);
        assert_eq!(o.end_count_id, 3);
        assert_eq!(o.start_tag_length, Some(4));
        assert_eq!(o.start_tag, 5);
        assert_eq!(o.end_tag_length, Some(7));
        assert_eq!(o.end_tag, 8);
        assert_eq!(o.data, 10);
        assert_eq!(plan.layout.record_words, 14);
    }

    #[test]
    fn test_tag_only_reserves_end_length_slot() {
        let mut fx = Fixture::new(Feat0::DMA_IF | Feat0::TAG_IN, 64);
        let config = fx.ram_config(HeaderFormat::TAG_ID, 64);
        let o = plan(&fx.mgi, &config).unwrap().layout.offsets;

        assert_eq!(o.start_tag_length, Some(0));
        assert_eq!(o.start_tag, 1);
        assert_eq!(o.end_tag_length, Some(3));
        assert_eq!(o.data, 4);
    }

    #[test]
    fn test_tag_with_end() {
        let mut fx = Fixture::new(Feat0::DMA_IF | Feat0::TAG_IN, 64);
        let config = fx.ram_config(HeaderFormat::TAG_ID | HeaderFormat::END_ID, 64);
        let o = plan(&fx.mgi, &config).unwrap().layout.offsets;

        assert_eq!(o.start_tag_length, Some(0));
        assert_eq!(o.start_tag, 1);
        assert_eq!(o.end_tag_length, Some(3));
        assert_eq!(o.end_tag, 4);
        assert_eq!(o.data, 6);
    }

    #[test]
    fn test_disabled_fields_share_the_cursor() {
        let mut fx = Fixture::new(Feat0::DMA_IF, 1);
        let config = fx.ram_config(HeaderFormat::COUNT_ID, 64);
        let o = plan(&fx.mgi, &config).unwrap().layout.offsets;

        assert_eq!(o.group_id, 0);
        assert_eq!(o.valid_bits, 0);
        assert_eq!(o.start_count_id, 0);
        assert_eq!(o.end_count_id, 1);
        assert_eq!(o.data, 1);
    }

    #[test]
    fn test_dangling_end_rejected_everywhere() {
        let mut fx = Fixture::new(Feat0::DMA_IF | Feat0::TAG_IN, 32);
        fx.set_reg(DATA_INFO, DATA_INFO_ALT_ADDR);
        let format = HeaderFormat::END_ID | HeaderFormat::DATA_VALID_BITS;
        let ram = fx.ram_config(format, 64);
        let DataLocation::Ram { write_addr, read } = ram.location else {
            unreachable!()
        };
        let locations = [
            DataLocation::Mgi,
            ram.location,
            DataLocation::Alternate {
                write_addr,
                read,
                alt_addr: 0x100,
            },
        ];

        let before = fx.snapshot();
        for location in locations {
            let config = DataConfig::new(format, location);
            assert_eq!(validate_header_format(&fx.mgi, format), Err(FwkError::Param));
            assert_eq!(resolve(&fx.mgi, &config).unwrap_err(), FwkError::Param);
        }
        assert_eq!(fx.snapshot(), before);
    }

    #[test]
    fn test_tag_needs_support() {
        let mut fx = Fixture::new(Feat0::DMA_IF, 32);
        let config = fx.ram_config(HeaderFormat::TAG_ID, 64);
        assert_eq!(plan(&fx.mgi, &config).unwrap_err(), FwkError::Support);
    }

    #[test]
    fn test_ram_needs_dma_and_room() {
        let mut fx = Fixture::new(Feat0::empty(), 1);
        let config = fx.ram_config(HeaderFormat::COUNT_ID, 64);
        assert_eq!(plan(&fx.mgi, &config).unwrap_err(), FwkError::Support);

        let mut fx = Fixture::new(Feat0::DMA_IF, 1);
        // 1 header word + 4 data words
        let config = fx.ram_config(HeaderFormat::COUNT_ID, 4);
        assert_eq!(plan(&fx.mgi, &config).unwrap_err(), FwkError::NoMem);
        let config = fx.ram_config(HeaderFormat::COUNT_ID, 5);
        assert!(plan(&fx.mgi, &config).is_ok());
    }

    #[test]
    fn test_misaligned_write_address_commits_nothing() {
        let mut fx = Fixture::new(Feat0::DMA_IF, 1);
        let mut config = fx.ram_config(HeaderFormat::GROUP_ID | HeaderFormat::COUNT_ID, 64);
        if let DataLocation::Ram { write_addr, .. } = &mut config.location {
            *write_addr = 0x8000_0002;
        }

        let before = fx.snapshot();
        assert_eq!(resolve(&fx.mgi, &config).unwrap_err(), FwkError::Align);
        assert_eq!(fx.snapshot(), before);
    }

    #[test]
    fn test_resolve_programs_ram_writes() {
        let mut fx = Fixture::new(Feat0::DMA_IF | Feat0::TAG_IN, 32);
        let format = HeaderFormat::COUNT_ID | HeaderFormat::TAG_ID | HeaderFormat::END_ID;
        let config = fx.ram_config(format, 64);
        let layout = resolve(&fx.mgi, &config).unwrap();

        assert_eq!(layout.source.base_addr(), fx.ram.as_ptr() as usize);
        assert_eq!(fx.mgi.write_config(), WrCfg::INCR_ID_EN | WrCfg::TAG_ID_EN);
        assert_eq!(fx.mgi.sample_ids_written(), 2);
        assert_eq!(fx.mgi.dma_data_address(), 0x8000_0000);
        assert!(fx.mgi.is_dma_enabled());
    }

    #[test]
    fn test_commit_applies_a_plan() {
        let mut fx = Fixture::new(Feat0::DMA_IF, 1);
        let config = fx.ram_config(HeaderFormat::COUNT_ID, 64);
        let before = fx.snapshot();

        let planned = plan(&fx.mgi, &config).unwrap();
        assert_eq!(fx.snapshot(), before);

        let layout = commit(&fx.mgi, planned).unwrap();
        assert_eq!(layout.sample, planned.layout);
        assert_eq!(fx.mgi.write_config(), WrCfg::INCR_ID_EN);
        assert!(fx.mgi.is_dma_enabled());
    }

    #[test]
    fn test_alternate_needs_alt_support() {
        let mut fx = Fixture::new(Feat0::DMA_IF, 1);
        let DataLocation::Ram { write_addr, read } =
            fx.ram_config(HeaderFormat::COUNT_ID, 64).location
        else {
            unreachable!()
        };
        let config = DataConfig::new(
            HeaderFormat::COUNT_ID,
            DataLocation::Alternate {
                write_addr,
                read,
                alt_addr: 0x1_0000_0000,
            },
        );
        assert_eq!(plan(&fx.mgi, &config).unwrap_err(), FwkError::Support);

        fx.set_reg(DATA_INFO, DATA_INFO_ALT_ADDR);
        resolve(&fx.mgi, &config).unwrap();
        assert_eq!(fx.mgi.alternate_data_address(), 0x1_0000_0000);
    }

    #[test]
    fn test_mgi_location_points_at_registers() {
        let fx = Fixture::new(Feat0::TAG_IN, 64);
        let config = DataConfig::new(HeaderFormat::TAG_ID, DataLocation::Mgi);
        let before = fx.snapshot();
        let layout = resolve(&fx.mgi, &config).unwrap();
        let o = layout.sample.offsets;

        assert_eq!(o.start_tag_length, Some(word(SMPID_START)));
        assert_eq!(o.start_tag, word(TAG0));
        assert_eq!(o.data, word(DATA));
        assert_eq!(layout.sample.tag_words, 2);
        assert_eq!(layout.source.base_addr(), fx.mgi.base_addr());
        assert_eq!(fx.snapshot(), before);

        let config = DataConfig::new(HeaderFormat::TAG_ID | HeaderFormat::COUNT_ID, DataLocation::Mgi);
        let o = plan(&fx.mgi, &config).unwrap().layout.offsets;
        assert_eq!(o.start_tag_length, None);
    }
}
