//! Extraction of one monitor's values from the data payload.
//!
//! Two storage regimes exist:
//!
//! - **Packed** (`packed` and width <= 16): values sit back to back in a bit
//!   stream, each in an 8-bit slot (width <= 8) or a 16-bit slot. Value `i`
//!   of monitor `m` starts at bit `slot * (i + m * values_per_monitor)`.
//! - **Unpacked**: one word per value, or a low/high word pair for widths
//!   above 32 bits.

use scp_core::{FwkError, FwkResult};
use scp_hal::WordSource;

const WORD_BITS: u32 = 32;

/// Shape of the data each monitor produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataAttributes {
    /// Values per monitor per sample
    pub values_per_monitor: u32,
    /// Width of each value in bits (1 to 64)
    pub width: u32,
    /// Whether narrow values share storage words
    pub packed: bool,
}

impl DataAttributes {
    /// Whether values are stored in the packed bit stream
    #[inline]
    pub const fn is_bit_packed(&self) -> bool {
        self.packed && self.width <= 16
    }

    /// Whether each value takes two words
    #[inline]
    pub const fn is_wide(&self) -> bool {
        self.width > 32
    }

    /// Bit slot of one packed value
    #[inline]
    const fn packed_slot_bits(&self) -> u32 {
        if self.width > 8 {
            16
        } else {
            8
        }
    }

    /// Words the caller's buffer needs for one monitor
    pub const fn buffer_words(&self) -> usize {
        let values = self.values_per_monitor as usize;
        if self.is_wide() {
            2 * values
        } else {
            values
        }
    }

    /// Words of storage the payload occupies for `monitors` monitors
    pub const fn payload_words(&self, monitors: u32) -> usize {
        let values = self.values_per_monitor as usize * monitors as usize;
        if self.is_bit_packed() {
            (values * self.packed_slot_bits() as usize).div_ceil(WORD_BITS as usize)
        } else if self.is_wide() {
            2 * values
        } else {
            values
        }
    }
}

/// Copy monitor `monitor`'s values from the payload starting at word
/// `data_base` of `src` into `dest`
///
/// `dest` must hold at least [`DataAttributes::buffer_words`] words.
pub fn copy_data<S>(
    attrs: &DataAttributes,
    src: &S,
    data_base: usize,
    monitor: u32,
    dest: &mut [u32],
) -> FwkResult<()>
where
    S: WordSource + ?Sized,
{
    let needed = attrs.buffer_words();
    let dest = dest.get_mut(..needed).ok_or(FwkError::NoMem)?;

    if attrs.is_bit_packed() {
        copy_packed(attrs, src, data_base, monitor, dest)
    } else {
        copy_unpacked(src, data_base + monitor as usize * needed, dest)
    }
}

fn copy_unpacked<S>(src: &S, base: usize, dest: &mut [u32]) -> FwkResult<()>
where
    S: WordSource + ?Sized,
{
    for (i, slot) in dest.iter_mut().enumerate() {
        *slot = src.word(base + i).ok_or(FwkError::Range)?;
    }
    Ok(())
}

fn copy_packed<S>(
    attrs: &DataAttributes,
    src: &S,
    data_base: usize,
    monitor: u32,
    dest: &mut [u32],
) -> FwkResult<()>
where
    S: WordSource + ?Sized,
{
    let slot_bits = attrs.packed_slot_bits() as usize;
    let count = attrs.values_per_monitor as usize;
    let mask = scp_hal::mgi::bit_mask(attrs.width);

    for (i, value) in dest.iter_mut().enumerate() {
        let bit_offset = slot_bits * (i + monitor as usize * count);
        let word = src
            .word(data_base + bit_offset / WORD_BITS as usize)
            .ok_or(FwkError::Range)?;
        *value = (word >> (bit_offset % WORD_BITS as usize)) & mask;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(values_per_monitor: u32, width: u32, packed: bool) -> DataAttributes {
        DataAttributes {
            values_per_monitor,
            width,
            packed,
        }
    }

    /// Lay values out the way the hardware packs them
    fn pack(attrs: &DataAttributes, values: &[u32]) -> Vec<u32> {
        let slot = attrs.packed_slot_bits() as usize;
        let mut words = vec![0u32; (values.len() * slot).div_ceil(32)];
        for (i, v) in values.iter().enumerate() {
            let bit = i * slot;
            words[bit / 32] |= (v & scp_hal::mgi::bit_mask(attrs.width)) << (bit % 32);
        }
        words
    }

    #[test]
    fn test_packed_8_bit_values() {
        // 3 monitors, 3 values each, 5-bit values in 8-bit slots
        let a = attrs(3, 5, true);
        let values: Vec<u32> = (0..9).map(|i| (i * 3 + 1) & 0x1F).collect();
        let words = pack(&a, &values);

        for monitor in 0..3u32 {
            let mut out = [0u32; 3];
            copy_data(&a, words.as_slice(), 0, monitor, &mut out).unwrap();
            let start = monitor as usize * 3;
            assert_eq!(&out[..], &values[start..start + 3]);
        }
    }

    #[test]
    fn test_packed_16_bit_values_cross_words() {
        // 2 monitors, 3 values each, 12-bit values in 16-bit slots
        let a = attrs(3, 12, true);
        let values = [0xABC, 0x123, 0xFFF, 0x001, 0x800, 0x7FE];
        let mut words = vec![0xDEAD_BEEF];
        words.extend(pack(&a, &values));

        let mut out = [0u32; 3];
        copy_data(&a, words.as_slice(), 1, 1, &mut out).unwrap();
        assert_eq!(out, [0x001, 0x800, 0x7FE]);
    }

    #[test]
    fn test_unpacked_32_bit() {
        let a = attrs(2, 32, false);
        let words = [10, 11, 20, 21, 30, 31];
        let mut out = [0u32; 2];
        copy_data(&a, &words[..], 0, 2, &mut out).unwrap();
        assert_eq!(out, [30, 31]);
    }

    #[test]
    fn test_packed_flag_ignored_above_16_bits() {
        let a = attrs(2, 24, true);
        assert!(!a.is_bit_packed());
        let words = [1, 2, 3, 4];
        let mut out = [0u32; 2];
        copy_data(&a, &words[..], 0, 1, &mut out).unwrap();
        assert_eq!(out, [3, 4]);
    }

    #[test]
    fn test_wide_values_take_two_words() {
        let a = attrs(2, 48, false);
        assert_eq!(a.buffer_words(), 4);
        let words: Vec<u32> = (0..8).collect();
        let mut out = [0u32; 4];
        copy_data(&a, words.as_slice(), 0, 1, &mut out).unwrap();
        assert_eq!(out, [4, 5, 6, 7]);
    }

    #[test]
    fn test_short_buffer_and_source() {
        let a = attrs(2, 32, false);
        let words = [1, 2, 3];
        let mut short = [0u32; 1];
        assert_eq!(copy_data(&a, &words[..], 0, 0, &mut short), Err(FwkError::NoMem));

        let mut out = [0u32; 2];
        assert_eq!(copy_data(&a, &words[..], 0, 1, &mut out), Err(FwkError::Range));
    }

    #[test]
    fn test_payload_words() {
        assert_eq!(attrs(3, 5, true).payload_words(4), 3);
        assert_eq!(attrs(3, 12, true).payload_words(2), 3);
        assert_eq!(attrs(2, 64, false).payload_words(4), 16);
        assert_eq!(attrs(1, 32, false).payload_words(4), 4);
    }
}
