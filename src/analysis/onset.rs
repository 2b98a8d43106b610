//! Onset strength envelope
//!
//! Log-compressed spectral flux: for each frame, the mean positive change in
//! log magnitude across frequency bins relative to the previous frame.

use super::spectral::{for_each_magnitude_frame, frame_count};

/// Magnitudes are compressed as `ln(1 + LOG_COMPRESSION * |X|)`
const LOG_COMPRESSION: f32 = 1000.0;

/// Onset strength per STFT frame
#[derive(Debug, Clone)]
pub struct OnsetEnvelope {
    /// Non-negative strength per frame
    pub strength: Vec<f32>,
    /// Frames per second
    pub frame_rate: f64,
}

impl OnsetEnvelope {
    pub fn compute(samples: &[f32], sample_rate: u32, n_fft: usize, hop: usize) -> Self {
        let mut strength = Vec::with_capacity(frame_count(samples.len(), hop));
        let mut previous: Vec<f32> = Vec::new();
        let mut current: Vec<f32> = Vec::new();

        for_each_magnitude_frame(samples, n_fft, hop, |_, magnitudes| {
            current.clear();
            current.extend(magnitudes.iter().map(|&m| (1.0 + LOG_COMPRESSION * m).ln()));

            let flux = if previous.is_empty() {
                0.0
            } else {
                let rise: f32 = current
                    .iter()
                    .zip(&previous)
                    .map(|(c, p)| (c - p).max(0.0))
                    .sum();
                rise / current.len() as f32
            };
            strength.push(flux);
            std::mem::swap(&mut previous, &mut current);
        });

        Self {
            strength,
            frame_rate: sample_rate as f64 / hop.max(1) as f64,
        }
    }

    pub fn len(&self) -> usize {
        self.strength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strength.is_empty()
    }

    /// Time in seconds of frame `index`
    pub fn frame_time(&self, index: usize) -> f64 {
        index as f64 / self.frame_rate
    }

    /// True if no frame has any onset energy
    pub fn is_silent(&self) -> bool {
        self.strength.iter().all(|&s| s <= 0.0)
    }

    /// Strength of `index` relative to the strongest frame (0-1)
    pub fn relative_strength(&self, index: usize) -> f64 {
        let max = self.strength.iter().cloned().fold(0.0f32, f32::max);
        if max <= 0.0 {
            return 0.0;
        }
        self.strength.get(index).map(|&s| (s / max) as f64).unwrap_or(0.0)
    }
}
