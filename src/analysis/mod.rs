//! Audio analysis modules
//!
//! Beat tracking sits behind the [`BeatTracker`] trait so the analyzer can be
//! driven by another backend (or a fixed grid in tests) without changes.

pub mod alignment;
pub mod analyzer;
pub mod beats;
pub mod features;
pub mod onset;
pub mod peaks;
pub mod spectral;
pub mod tempo;
pub mod traits;
pub mod zoom;

pub use alignment::{analyze_cues, AlignmentSettings};
pub use analyzer::AudioAnalyzer;
pub use beats::DynamicBeatTracker;
pub use traits::{BeatGrid, BeatTracker};
pub use zoom::zoom_view;
