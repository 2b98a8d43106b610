//! Analysis trait abstractions
//!
//! These traits define the interface for swappable analysis backends.
//! The default beat tracker is the dynamic-programming tracker in `beats`.

use crate::error::Result;
use crate::types::AudioBuffer;

/// Tempo plus beat positions for one signal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatGrid {
    /// Global tempo in BPM (0 when no tempo could be found)
    pub tempo: f64,
    /// Beat times in seconds, ascending
    pub beats: Vec<f64>,
    /// Onset strength at each beat, 0-1, parallel to `beats`
    pub strengths: Vec<f64>,
}

impl BeatGrid {
    /// Grid with the given tempo and no beats
    pub fn empty(tempo: f64) -> Self {
        Self {
            tempo,
            beats: Vec::new(),
            strengths: Vec::new(),
        }
    }
}

/// Beat tracking backend
pub trait BeatTracker: Send + Sync {
    /// Estimate tempo and beat positions from audio samples
    fn track(&self, buffer: &AudioBuffer) -> Result<BeatGrid>;

    /// Get the name of this tracker (for logging)
    fn name(&self) -> &'static str;
}
