//! # Sample Data
//!
//! Record layout resolution, payload extraction and the consistent sample
//! read built on top of both.

pub mod copy;
pub mod layout;
pub mod reader;

pub use copy::{copy_data, DataAttributes};
pub use layout::{
    commit, data_attributes, plan, resolve, validate_header_format, DataLayout, FieldOffsets, LayoutPlan,
    SampleIds, SampleLayout, Storage,
};
pub use reader::{
    data_buffer_words, group_id, is_sample_valid_after_copy, is_sample_valid_before_copy,
    read_sample, start_count_id, tag_length,
};
