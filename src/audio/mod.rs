//! Audio loading

pub mod decoder;

pub use decoder::{decode, resample_buffer, ANALYSIS_SAMPLE_RATE};
