//! Cue-to-grid alignment scoring
//!
//! Each cue is measured against the nearest downbeat. Musical context comes
//! from the cue's relative position in the track only, not from structure
//! detection.

use crate::config::AnalysisConfig;
use crate::types::{AudioBuffer, CueAnalysis, CuePoint, MusicalContext};

/// Thresholds used when scoring a cue
#[derive(Debug, Clone, Copy)]
pub struct AlignmentSettings {
    pub on_grid_tolerance: f64,
    pub snap_window: f64,
    pub energy_window: f64,
    pub tempo_neighbourhood: f64,
    pub beats_per_bar: usize,
    pub fallback_bpm: f64,
}

impl From<&AnalysisConfig> for AlignmentSettings {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            on_grid_tolerance: config.on_grid_tolerance,
            snap_window: config.snap_window,
            energy_window: config.cue_energy_window,
            tempo_neighbourhood: config.tempo_neighbourhood,
            beats_per_bar: config.beats_per_bar,
            fallback_bpm: config.fallback_bpm,
        }
    }
}

impl Default for AlignmentSettings {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

/// Score every cue; empty when there are no downbeats to measure against
pub fn analyze_cues(
    cues: &[CuePoint],
    downbeats: &[f64],
    buffer: &AudioBuffer,
    settings: &AlignmentSettings,
) -> Vec<CueAnalysis> {
    cues.iter()
        .filter_map(|cue| analyze_cue(cue.position, downbeats, buffer, settings))
        .collect()
}

/// Score one cue position against the downbeats
pub fn analyze_cue(
    position: f64,
    downbeats: &[f64],
    buffer: &AudioBuffer,
    settings: &AlignmentSettings,
) -> Option<CueAnalysis> {
    let (nearest_downbeat, distance) = nearest(position, downbeats)?;
    let is_on_downbeat = distance < settings.on_grid_tolerance;

    let suggested_position =
        (!is_on_downbeat && distance < settings.snap_window).then_some(nearest_downbeat);

    let relative = if buffer.duration > 0.0 {
        position / buffer.duration
    } else {
        0.0
    };

    Some(CueAnalysis {
        original_position: position,
        nearest_downbeat,
        distance_to_downbeat: distance,
        is_on_downbeat,
        confidence: (1.0 - distance).max(0.0),
        suggested_position,
        energy_level: buffer.mean_abs(position, settings.energy_window),
        bpm_at_position: local_bpm(position, downbeats, settings),
        musical_context: MusicalContext::from_relative_position(relative),
    })
}

/// Nearest downbeat and its absolute distance (first one wins a tie)
fn nearest(position: f64, downbeats: &[f64]) -> Option<(f64, f64)> {
    downbeats
        .iter()
        .map(|&d| (d, (position - d).abs()))
        .fold(None, |best: Option<(f64, f64)>, cur| match best {
            Some(b) if b.1 <= cur.1 => Some(b),
            _ => Some(cur),
        })
}

/// Tempo reading from the downbeat spacing near `position`
///
/// `60 / (beats_per_bar * mean interval)`: 7.5 for bars two seconds apart.
fn local_bpm(position: f64, downbeats: &[f64], settings: &AlignmentSettings) -> f64 {
    let mut nearby: Vec<f64> = downbeats
        .iter()
        .copied()
        .filter(|d| (position - d).abs() < settings.tempo_neighbourhood)
        .collect();
    if nearby.len() < 2 {
        return settings.fallback_bpm;
    }
    nearby.sort_by(|a, b| a.total_cmp(b));

    let bar = (nearby[nearby.len() - 1] - nearby[0]) / (nearby.len() - 1) as f64;
    if bar <= 0.0 {
        return settings.fallback_bpm;
    }
    60.0 / (bar * settings.beats_per_bar as f64)
}
