//! Sample header format.
//!
//! A sample record starts with optional header fields, selected by a
//! [`HeaderFormat`], in this fixed order:
//!
//! ```text
//! group id | valid bits | start count | end count |
//! start tag length | start tag ... | end tag length | end tag ... | data ...
//! ```
//!
//! The end count exists only with both `COUNT_ID` and `END_ID`; the end tag
//! only with both `TAG_ID` and `END_ID`.

use bitflags::bitflags;

bitflags! {
    /// Optional fields of a sample record header
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HeaderFormat: u32 {
        /// Group id word
        const GROUP_ID = 1 << 0;
        /// Per-monitor data valid bits
        const DATA_VALID_BITS = 1 << 1;
        /// Incrementing sample count
        const COUNT_ID = 1 << 2;
        /// Sample tag, preceded by its length
        const TAG_ID = 1 << 3;
        /// Repeat the count and/or tag after the sample
        const END_ID = 1 << 4;
    }
}

impl HeaderFormat {
    /// Every field
    pub const ALL_FIELDS: Self = Self::all();

    /// Whether the record carries an end count
    #[inline]
    pub const fn has_end_count(self) -> bool {
        self.contains(Self::COUNT_ID.union(Self::END_ID))
    }

    /// Whether the record carries an end tag
    #[inline]
    pub const fn has_end_tag(self) -> bool {
        self.contains(Self::TAG_ID.union(Self::END_ID))
    }

    /// Whether `END_ID` is set without anything to repeat
    #[inline]
    pub const fn has_dangling_end(self) -> bool {
        self.contains(Self::END_ID) && !self.intersects(Self::COUNT_ID.union(Self::TAG_ID))
    }
}

/// Number of 32-bit words needed for `bits` bits
#[inline]
pub const fn words_for_bits(bits: u32) -> u32 {
    bits.div_ceil(32)
}
