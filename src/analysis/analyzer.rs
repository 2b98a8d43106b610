//! Full-track analysis
//!
//! Decoding failure is fatal for the file: every derived series depends on a
//! valid sample buffer, so the analyzer returns an error rather than a
//! partial result.

use super::alignment::{analyze_cues, AlignmentSettings};
use super::beats::DynamicBeatTracker;
use super::features::{self, BeatEnrichment};
use super::peaks::energy_peak_times;
use super::spectral::spectral_centroid;
use super::traits::BeatTracker;
use super::zoom::zoom_view;
use crate::audio::{self, resample_buffer, ANALYSIS_SAMPLE_RATE};
use crate::config::AnalysisConfig;
use crate::error::{ErrorContext, Result};
use crate::types::{AudioAnalysis, AudioBuffer, CuePoint, ZoomView};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Produces [`AudioAnalysis`] values for audio files
pub struct AudioAnalyzer {
    config: AnalysisConfig,
    tracker: Box<dyn BeatTracker>,
}

impl AudioAnalyzer {
    /// Analyzer using the dynamic-programming beat tracker
    pub fn new(config: AnalysisConfig) -> Self {
        let tracker = Box::new(DynamicBeatTracker::new(&config));
        Self { config, tracker }
    }

    /// Analyzer with a custom beat tracking backend
    pub fn with_tracker(config: AnalysisConfig, tracker: Box<dyn BeatTracker>) -> Self {
        Self { config, tracker }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Decode `path` and analyze it, scoring `cues` against the beat grid
    pub fn analyze(&self, path: &Path, cues: &[CuePoint]) -> Result<AudioAnalysis> {
        let start = Instant::now();
        let buffer = audio::decode(path)?;
        info!(
            "Loaded {} ({:.1}s @ {} Hz) in {:.2}s",
            path.display(),
            buffer.duration,
            buffer.sample_rate,
            start.elapsed().as_secs_f64()
        );

        let analysis = self.analyze_buffer(&buffer, cues).with_file_context(path)?;
        info!(
            "Analyzed {}: {:.1} BPM, {} beats, {} cues scored in {:.2}s",
            path.display(),
            analysis.tempo,
            analysis.beats.len(),
            analysis.cue_analyses.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(analysis)
    }

    /// Analyze an already decoded buffer
    pub fn analyze_buffer(&self, buffer: &AudioBuffer, cues: &[CuePoint]) -> Result<AudioAnalysis> {
        let config = &self.config;
        config.validate()?;

        let phase = Instant::now();
        let waveform =
            features::waveform_envelope(&buffer.samples, config.waveform_points, config.frame_length);
        debug!("Waveform: {} points in {:?}", waveform.len(), phase.elapsed());

        let phase = Instant::now();
        let grid = self.tracker.track(buffer)?;
        debug!(
            "Beat tracking ({}): {:.1} BPM, {} beats in {:?}",
            self.tracker.name(),
            grid.tempo,
            grid.beats.len(),
            phase.elapsed()
        );

        let downbeats = features::downbeats(&grid.beats, config.beats_per_bar);
        let beats = features::beat_infos(
            &grid.beats,
            &grid.strengths,
            &downbeats,
            buffer,
            grid.tempo,
            BeatEnrichment {
                downbeat_tolerance: config.downbeat_tolerance,
                energy_window: config.beat_energy_window,
            },
        );
        let tempo_changes = features::tempo_changes(&grid.beats, config.tempo_window);

        let phase = Instant::now();
        let energy_curve = features::energy_curve(
            &buffer.samples,
            config.frame_length,
            config.hop_length,
            config.energy_sigma,
        );
        let spectral_centroid = spectral_centroid(
            &buffer.samples,
            buffer.sample_rate,
            config.frame_length,
            config.hop_length,
        );
        debug!("Energy and spectral features in {:?}", phase.elapsed());

        if !cues.is_empty() && downbeats.is_empty() {
            warn!("No downbeats found; {} cue points left unscored", cues.len());
        }
        let cue_analyses = analyze_cues(cues, &downbeats, buffer, &AlignmentSettings::from(config));

        Ok(AudioAnalysis {
            duration: buffer.duration,
            sample_rate: buffer.sample_rate,
            waveform,
            beats,
            downbeats,
            tempo: grid.tempo,
            tempo_changes,
            energy_curve,
            spectral_centroid,
            cue_analyses,
        })
    }

    /// Time-windowed slice of a finished analysis
    pub fn zoom(&self, analysis: &AudioAnalysis, center: f64, duration: f64) -> ZoomView {
        zoom_view(analysis, center, duration)
    }

    /// Candidate cue times at the loudest moments of the track
    pub fn suggest_cue_points(&self, path: &Path, sensitivity: f64) -> Result<Vec<f64>> {
        let buffer = audio::decode(path)?;
        let signal = resample_buffer(&buffer, ANALYSIS_SAMPLE_RATE);
        let times = energy_peak_times(
            &signal.samples,
            signal.sample_rate,
            self.config.frame_length,
            self.config.hop_length,
            sensitivity,
        );
        debug!("{} energy peaks in {}", times.len(), path.display());
        Ok(times)
    }
}

impl Default for AudioAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
