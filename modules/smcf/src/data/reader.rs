//! # Sample Reader
//!
//! The group overwrites sample records whenever it likes, so a read is
//! optimistic: check the record is complete, remember its count, copy, and
//! check the count did not move while copying.
//!
//! ```text
//! pre-check ──► capture count ──► copy tag ──► copy data ──► post-check
//!     │                                                          │
//!     └── State: not ready                      State: overwritten ┘
//! ```
//!
//! [`read_sample`] makes exactly one attempt. A [`FwkError::State`] result
//! means the output buffers must not be trusted; retrying is up to the
//! caller.

use scp_core::{FwkError, FwkResult};
use scp_hal::mgi::{regs, sample_id_value, SampleIdStatus};
use scp_hal::WordSource;

use super::copy::copy_data;
use super::layout::SampleLayout;
use crate::header::HeaderFormat;

#[inline]
fn has_status<S>(src: &S, offset: usize, status: SampleIdStatus) -> bool
where
    S: WordSource + ?Sized,
{
    src.word(offset)
        .is_some_and(|encoded| SampleIdStatus::of(encoded) == status)
}

fn valid_bit_set<S>(layout: &SampleLayout, src: &S, monitor: u32) -> bool
where
    S: WordSource + ?Sized,
{
    if !layout.format.contains(HeaderFormat::DATA_VALID_BITS) {
        return true;
    }
    monitor < 32
        && src
            .word(layout.offsets.valid_bits)
            .is_some_and(|bits| (bits >> monitor) & 1 == 1)
}

fn count_id_valid<S>(layout: &SampleLayout, src: &S) -> bool
where
    S: WordSource + ?Sized,
{
    !layout.format.contains(HeaderFormat::COUNT_ID)
        || has_status(src, layout.offsets.start_count_id, SampleIdStatus::ValidCount)
}

fn tag_state_valid<S>(layout: &SampleLayout, src: &S) -> bool
where
    S: WordSource + ?Sized,
{
    layout.format.contains(HeaderFormat::TAG_ID)
        && layout.offsets.start_tag_length.map_or(true, |offset| {
            has_status(src, offset, SampleIdStatus::ValidTagLength)
        })
}

fn counts_match<S>(layout: &SampleLayout, src: &S) -> bool
where
    S: WordSource + ?Sized,
{
    if !layout.format.has_end_count() {
        return true;
    }
    match (
        src.word(layout.offsets.start_count_id),
        src.word(layout.offsets.end_count_id),
    ) {
        (Some(start), Some(end)) => start == end,
        _ => false,
    }
}

/// Whether the record for `monitor` is complete and safe to copy
pub fn is_sample_valid_before_copy<S>(layout: &SampleLayout, src: &S, monitor: u32) -> bool
where
    S: WordSource + ?Sized,
{
    valid_bit_set(layout, src, monitor)
        && count_id_valid(layout, src)
        && (!layout.format.contains(HeaderFormat::TAG_ID) || tag_state_valid(layout, src))
        && counts_match(layout, src)
}

/// Whether the record still carries `count_id` after a copy
///
/// Only records with both start and end counts can be checked; others
/// always pass.
pub fn is_sample_valid_after_copy<S>(layout: &SampleLayout, src: &S, count_id: u32) -> bool
where
    S: WordSource + ?Sized,
{
    if !layout.format.has_end_count() {
        return true;
    }
    let unchanged = |offset| src.word(offset).map(sample_id_value) == Some(count_id);
    unchanged(layout.offsets.start_count_id) && unchanged(layout.offsets.end_count_id)
}

/// Start count value, or 0 when the record has no valid count
pub fn start_count_id<S>(layout: &SampleLayout, src: &S) -> u32
where
    S: WordSource + ?Sized,
{
    if !count_id_valid(layout, src) || !layout.format.contains(HeaderFormat::COUNT_ID) {
        return 0;
    }
    src.word(layout.offsets.start_count_id)
        .map_or(0, sample_id_value)
}

/// Tag length in words, or 0 when the record has no valid tag
pub fn tag_length<S>(layout: &SampleLayout, src: &S) -> u32
where
    S: WordSource + ?Sized,
{
    if !tag_state_valid(layout, src) {
        return 0;
    }
    match layout.offsets.start_tag_length {
        Some(offset) => src.word(offset).map_or(0, sample_id_value),
        None => layout.tag_words as u32,
    }
}

/// Group id carried by the record, or 0 without a group id field
pub fn group_id<S>(layout: &SampleLayout, src: &S) -> u32
where
    S: WordSource + ?Sized,
{
    if !layout.format.contains(HeaderFormat::GROUP_ID) {
        return 0;
    }
    src.word(layout.offsets.group_id)
        .map_or(0, |id| id & regs::GRP_ID_GRP_ID)
}

/// Words a data buffer needs for one monitor
pub fn data_buffer_words(layout: &SampleLayout) -> usize {
    layout.attrs.buffer_words()
}

fn copy_tag<S>(layout: &SampleLayout, src: &S, dest: &mut [u32]) -> FwkResult<()>
where
    S: WordSource + ?Sized,
{
    if !tag_state_valid(layout, src) {
        return Err(FwkError::State);
    }
    let length = tag_length(layout, src) as usize;
    // A length past the tag width means the record is not one we laid out
    if length > layout.tag_words {
        return Err(FwkError::State);
    }
    let dest = dest.get_mut(..length).ok_or(FwkError::NoMem)?;
    for (i, slot) in dest.iter_mut().enumerate() {
        *slot = src
            .word(layout.offsets.start_tag + i)
            .ok_or(FwkError::Range)?;
    }
    Ok(())
}

/// Copy the latest sample of `monitor`, and its tag if `tag` is given
///
/// Makes a single attempt; see the module documentation.
pub fn read_sample<S>(
    layout: &SampleLayout,
    src: &S,
    monitor: u32,
    data: &mut [u32],
    tag: Option<&mut [u32]>,
) -> FwkResult<()>
where
    S: WordSource + ?Sized,
{
    if monitor >= layout.monitor_count {
        return Err(FwkError::Range);
    }
    if data.len() < data_buffer_words(layout) {
        return Err(FwkError::NoMem);
    }

    if !is_sample_valid_before_copy(layout, src, monitor) {
        return Err(FwkError::State);
    }

    let count_id = start_count_id(layout, src);

    if let Some(tag) = tag {
        copy_tag(layout, src, tag)?;
    }

    copy_data(&layout.attrs, src, layout.offsets.data, monitor, data)?;

    if !is_sample_valid_after_copy(layout, src, count_id) {
        log::trace!("[SMCF] Sample {} overwritten during copy", count_id);
        return Err(FwkError::State);
    }

    Ok(())
}
