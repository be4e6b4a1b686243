//! Sizing of sample records in a shared RAM region.

use crate::header::HeaderFormat;

/// Size of one header slot in bytes
const SLOT_BYTES: u32 = 4;

/// Round `value` up to a multiple of 4
#[inline]
const fn align_up_4(value: u32) -> u32 {
    (value + 3) & !3
}

/// Header size in bytes of a record with `format` and `tag_bits`-wide tags
pub const fn header_size(format: HeaderFormat, tag_bits: u32) -> u32 {
    let mut size = 0;

    if format.contains(HeaderFormat::GROUP_ID) {
        size += SLOT_BYTES;
    }
    if format.contains(HeaderFormat::DATA_VALID_BITS) {
        size += SLOT_BYTES;
    }
    if format.contains(HeaderFormat::COUNT_ID) {
        size += SLOT_BYTES;
        if format.contains(HeaderFormat::END_ID) {
            size += SLOT_BYTES;
        }
    }
    if format.contains(HeaderFormat::TAG_ID) {
        let tag = SLOT_BYTES + tag_bits.div_ceil(8);
        size += if format.contains(HeaderFormat::END_ID) { 2 * tag } else { tag };
    }

    size
}

/// Offset of the record following one placed at `current_offset`
///
/// The result is 4-byte aligned. Inputs are trusted: the format is
/// validated when the layout is resolved.
pub const fn next_record_offset(
    current_offset: u32,
    format: HeaderFormat,
    data_size: u32,
    tag_bits: u32,
) -> u32 {
    align_up_4(current_offset + header_size(format, tag_bits) + data_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: u32 = 0x5100_0000;

    #[test]
    fn test_all_fields_with_64_bit_tag() {
        assert_eq!(next_record_offset(BASE, HeaderFormat::ALL_FIELDS, 4, 64), BASE + 0x2C);
    }

    #[test]
    fn test_no_header() {
        assert_eq!(next_record_offset(BASE, HeaderFormat::empty(), 4, 64), BASE + 0x04);
    }

    #[test]
    fn test_result_is_aligned_and_advances() {
        for bits in 0..32u32 {
            let format = HeaderFormat::from_bits_truncate(bits);
            for data_size in 1..9 {
                for tag_bits in [1, 7, 33, 64, 128] {
                    let start = BASE + (data_size % 4);
                    let next = next_record_offset(start, format, data_size, tag_bits);
                    assert_eq!(next % 4, 0);
                    assert!(next > start);
                    assert_eq!(next, next_record_offset(start, format, data_size, tag_bits));
                }
            }
        }
    }

    #[test]
    fn test_tag_bytes_round_up() {
        // 4-byte length slot + ceil(12 / 8) bytes
        assert_eq!(header_size(HeaderFormat::TAG_ID, 12), 6);
        assert_eq!(next_record_offset(0, HeaderFormat::TAG_ID, 1, 12), 8);
    }
}
