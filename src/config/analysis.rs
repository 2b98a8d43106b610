//! Analyzer tuning constants
//!
//! One explicitly constructed value is handed to the analyzer; nothing here
//! is global.

use crate::error::{CuegridError, Result};

/// Every constant the beat/cue analyzer uses
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Points in the overview waveform
    pub waveform_points: usize,
    /// STFT / RMS frame length in samples
    pub frame_length: usize,
    /// Hop between frames in samples
    pub hop_length: usize,
    /// Gaussian sigma (in frames) for the energy curve
    pub energy_sigma: f64,
    /// Sample rate of the onset/tempo signal
    pub onset_sample_rate: u32,
    /// Centre of the tempo prior (BPM)
    pub start_bpm: f64,
    /// How strongly the beat tracker sticks to the global tempo
    pub tightness: f64,
    /// Beats per bar for downbeat inference (4/4 assumed)
    pub beats_per_bar: usize,
    /// Seconds a beat may sit from a downbeat and still be one
    pub downbeat_tolerance: f64,
    /// Seconds of audio after a beat averaged for its energy
    pub beat_energy_window: f64,
    /// Beats per window of the tempo-change series
    pub tempo_window: usize,
    /// A cue closer than this (seconds) to a downbeat is on the grid
    pub on_grid_tolerance: f64,
    /// Off-grid cues closer than this (seconds) get a snap suggestion
    pub snap_window: f64,
    /// Seconds of audio after a cue averaged for its energy
    pub cue_energy_window: f64,
    /// Downbeats within this many seconds of a cue give its local tempo
    pub tempo_neighbourhood: f64,
    /// Local cue tempo when too few downbeats are nearby
    pub fallback_bpm: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            waveform_points: 2000,
            frame_length: 2048,
            hop_length: 512,
            energy_sigma: 2.0,
            onset_sample_rate: 22050,
            start_bpm: 120.0,
            tightness: 100.0,
            beats_per_bar: 4,
            downbeat_tolerance: 0.05,
            beat_energy_window: 0.1,
            tempo_window: 8,
            on_grid_tolerance: 0.1,
            snap_window: 2.0,
            cue_energy_window: 0.5,
            tempo_neighbourhood: 8.0,
            fallback_bpm: 120.0,
        }
    }
}

impl AnalysisConfig {
    /// Reject values that would make the analysis meaningless
    pub fn validate(&self) -> Result<()> {
        if self.waveform_points == 0 {
            return Err(CuegridError::ConfigError("waveform points must be > 0".into()));
        }
        if self.frame_length == 0 || self.hop_length == 0 {
            return Err(CuegridError::ConfigError("frame and hop length must be > 0".into()));
        }
        if self.hop_length > self.frame_length {
            return Err(CuegridError::ConfigError(format!(
                "hop length {} exceeds frame length {}",
                self.hop_length, self.frame_length
            )));
        }
        if self.onset_sample_rate == 0 || self.start_bpm <= 0.0 {
            return Err(CuegridError::ConfigError(
                "onset sample rate and start BPM must be > 0".into(),
            ));
        }
        if self.beats_per_bar == 0 || self.tempo_window < 2 {
            return Err(CuegridError::ConfigError(
                "beats per bar must be > 0 and tempo window at least 2".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_points() {
        let config = AnalysisConfig {
            waveform_points: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CuegridError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_hop_longer_than_frame() {
        let config = AnalysisConfig {
            hop_length: 4096,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
