//! Dynamic-programming beat tracker
//!
//! 1. Onset envelope of the signal resampled to the onset rate.
//! 2. Global tempo from the envelope's autocorrelation.
//! 3. Beat placement: each frame's cumulative score is its local onset score
//!    plus the best predecessor score between half a period and two periods
//!    back, penalised by the squared log deviation from the ideal period.
//!    The best-scoring chain is backtracked from the last strong frame.
//! 4. Weak beats at either end (fade-ins, silence) are trimmed.

use super::onset::OnsetEnvelope;
use super::tempo::estimate_tempo;
use super::traits::{BeatGrid, BeatTracker};
use crate::audio::resample_buffer;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::types::AudioBuffer;
use tracing::debug;

/// Kernel width factor of the local score (Gaussian of period / 32 frames)
const LOCAL_SCORE_SHARPNESS: f64 = 32.0;

/// Frames quieter than this share of the loudest local score can't start the chain
const FIRST_BEAT_THRESHOLD: f64 = 0.01;

/// Beat tracker over an onset envelope
#[derive(Debug, Clone)]
pub struct DynamicBeatTracker {
    onset_sample_rate: u32,
    frame_length: usize,
    hop_length: usize,
    start_bpm: f64,
    tightness: f64,
}

impl DynamicBeatTracker {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            onset_sample_rate: config.onset_sample_rate,
            frame_length: config.frame_length,
            hop_length: config.hop_length,
            start_bpm: config.start_bpm,
            tightness: config.tightness,
        }
    }
}

impl Default for DynamicBeatTracker {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl BeatTracker for DynamicBeatTracker {
    fn track(&self, buffer: &AudioBuffer) -> Result<BeatGrid> {
        let signal = resample_buffer(buffer, self.onset_sample_rate);
        let onsets = OnsetEnvelope::compute(
            &signal.samples,
            signal.sample_rate,
            self.frame_length,
            self.hop_length,
        );
        let grid = track_onsets(&onsets, self.start_bpm, self.tightness);
        debug!("Tracked {} beats at {:.1} BPM", grid.beats.len(), grid.tempo);
        Ok(grid)
    }

    fn name(&self) -> &'static str {
        "dynamic-programming"
    }
}

/// Tempo and beats from an onset envelope
pub fn track_onsets(onsets: &OnsetEnvelope, start_bpm: f64, tightness: f64) -> BeatGrid {
    let Some(tempo) = estimate_tempo(onsets, start_bpm) else {
        return BeatGrid::empty(0.0);
    };

    let period = 60.0 * onsets.frame_rate / tempo;
    let Some(normalized) = normalize_by_std(&onsets.strength) else {
        return BeatGrid::empty(tempo);
    };

    let local = local_score(&normalized, period);
    let (backlink, cumulative) = dynamic_program(&local, period, tightness);

    let Some(last) = last_beat(&cumulative) else {
        return BeatGrid::empty(tempo);
    };

    let mut frames = vec![last];
    while let Some(&current) = frames.last() {
        match usize::try_from(backlink[current]) {
            Ok(previous) if previous < current => frames.push(previous),
            _ => break,
        }
    }
    frames.reverse();

    let frames = trim_weak_edges(&local, frames);

    BeatGrid {
        tempo,
        beats: frames.iter().map(|&f| onsets.frame_time(f)).collect(),
        strengths: frames.iter().map(|&f| onsets.relative_strength(f)).collect(),
    }
}

/// Envelope divided by its sample standard deviation
fn normalize_by_std(values: &[f32]) -> Option<Vec<f64>> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    (std > 0.0).then(|| values.iter().map(|&v| v as f64 / std).collect())
}

/// Onsets convolved with a Gaussian one period wide
fn local_score(onsets: &[f64], period: f64) -> Vec<f64> {
    let radius = period.round().max(1.0) as isize;
    let kernel: Vec<f64> = (-radius..=radius)
        .map(|j| (-0.5 * (j as f64 * LOCAL_SCORE_SHARPNESS / period).powi(2)).exp())
        .collect();

    let n = onsets.len() as isize;
    (0..n)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(k, w)| {
                    let j = i + k as isize - radius;
                    (0..n).contains(&j).then(|| w * onsets[j as usize])
                })
                .sum()
        })
        .collect()
}

/// Cumulative beat scores and the best predecessor of each frame
///
/// A backlink of -1 (or any negative frame) ends the chain.
fn dynamic_program(local: &[f64], period: f64, tightness: f64) -> (Vec<isize>, Vec<f64>) {
    let earliest = -(2.0 * period).round() as isize;
    let latest = (-(period / 2.0).round() as isize).min(-1);
    let offsets: Vec<isize> = (earliest..=latest).collect();
    let penalties: Vec<f64> = offsets
        .iter()
        .map(|&o| -tightness * ((-o) as f64 / period).ln().powi(2))
        .collect();

    let max_local = local.iter().cloned().fold(0.0f64, f64::max);
    let mut backlink = vec![-1isize; local.len()];
    let mut cumulative = vec![0.0f64; local.len()];
    let mut chain_started = false;

    for i in 0..local.len() {
        let mut best_score = f64::NEG_INFINITY;
        let mut best_frame = -1isize;
        for (&offset, &penalty) in offsets.iter().zip(&penalties) {
            let j = i as isize + offset;
            let score = if j >= 0 { penalty + cumulative[j as usize] } else { penalty };
            if score > best_score {
                best_score = score;
                best_frame = j;
            }
        }

        cumulative[i] = local[i] + best_score;
        if !chain_started && local[i] < FIRST_BEAT_THRESHOLD * max_local {
            backlink[i] = -1;
        } else {
            backlink[i] = best_frame;
            chain_started = true;
        }
    }

    (backlink, cumulative)
}

/// Last local maximum of the cumulative score above half the median maximum
fn last_beat(cumulative: &[f64]) -> Option<usize> {
    let n = cumulative.len();
    let is_peak = |i: usize| {
        let left = if i == 0 { cumulative[0] } else { cumulative[i - 1] };
        let right = if i + 1 == n { cumulative[i] } else { cumulative[i + 1] };
        cumulative[i] > left && cumulative[i] >= right
    };

    let mut peaks: Vec<f64> = (0..n).filter(|&i| is_peak(i)).map(|i| cumulative[i]).collect();
    if peaks.is_empty() {
        return None;
    }
    peaks.sort_by(|a, b| a.total_cmp(b));
    let median = if peaks.len() % 2 == 1 {
        peaks[peaks.len() / 2]
    } else {
        0.5 * (peaks[peaks.len() / 2 - 1] + peaks[peaks.len() / 2])
    };

    (0..n).rev().find(|&i| is_peak(i) && 2.0 * cumulative[i] > median)
}

/// Drop leading and trailing beats whose smoothed local score is under half
/// the RMS of all beats' smoothed scores
fn trim_weak_edges(local: &[f64], frames: Vec<usize>) -> Vec<usize> {
    if frames.is_empty() {
        return frames;
    }
    let scores: Vec<f64> = frames.iter().map(|&f| local[f]).collect();
    // Hann(5) = [0, 0.5, 1, 0.5, 0], zero beyond the ends
    let smoothed: Vec<f64> = (0..scores.len())
        .map(|k| {
            let left = if k > 0 { scores[k - 1] } else { 0.0 };
            let right = scores.get(k + 1).copied().unwrap_or(0.0);
            0.5 * left + scores[k] + 0.5 * right
        })
        .collect();

    let rms = (smoothed.iter().map(|s| s * s).sum::<f64>() / smoothed.len() as f64).sqrt();
    let threshold = 0.5 * rms;

    let first = smoothed.iter().position(|&s| s > threshold);
    let last = smoothed.iter().rposition(|&s| s > threshold);
    match (first, last) {
        (Some(first), Some(last)) => frames[first..=last].to_vec(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_envelope(period: f64, frames: usize, frame_rate: f64, first: usize) -> OnsetEnvelope {
        let mut strength = vec![0.0f32; frames];
        let mut t = first as f64;
        while (t.round() as usize) < frames {
            strength[t.round() as usize] = 1.0;
            t += period;
        }
        OnsetEnvelope { strength, frame_rate }
    }

    #[test]
    fn test_tracks_regular_pulse() {
        let fr = 22050.0 / 512.0;
        let period = fr / 2.0; // 120 BPM
        let env = click_envelope(period, 1300, fr, 10);
        let grid = track_onsets(&env, 120.0, 100.0);

        assert!((grid.tempo - 120.0).abs() < 3.0, "tempo {}", grid.tempo);
        assert!(grid.beats.len() >= 55, "only {} beats", grid.beats.len());
        assert_eq!(grid.beats.len(), grid.strengths.len());

        // Every beat lands on a click
        for &beat in &grid.beats {
            let frame = (beat * fr).round() as usize;
            let near = (frame.saturating_sub(1)..=frame + 1).any(|f| env.strength.get(f) == Some(&1.0));
            assert!(near, "beat at {} is not on a click", beat);
        }

        // Intervals close to half a second
        for pair in grid.beats.windows(2) {
            assert!((pair[1] - pair[0] - 0.5).abs() < 0.05);
        }
    }

    #[test]
    fn test_silence_has_no_beats() {
        let env = OnsetEnvelope { strength: vec![0.0; 1000], frame_rate: 43.0 };
        let grid = track_onsets(&env, 120.0, 100.0);
        assert!(grid.beats.is_empty());
        assert_eq!(grid.tempo, 0.0);
    }

    #[test]
    fn test_trim_weak_edges() {
        let local = vec![0.05, 1.0, 1.0, 1.0, 1.0, 1.0, 0.02];
        let frames: Vec<usize> = (0..7).collect();
        assert_eq!(trim_weak_edges(&local, frames), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_last_beat_picks_final_strong_peak() {
        let cumulative = vec![0.0, 1.0, 0.5, 2.0, 1.5, 3.0, 2.8, 0.2, 0.3, 0.1];
        // Peaks: 1.0 (1), 2.0 (3), 3.0 (5), 0.3 (8); median 1.5; 2*0.3 < 1.5
        assert_eq!(last_beat(&cumulative), Some(5));
    }

    #[test]
    fn test_normalize_rejects_flat() {
        assert!(normalize_by_std(&[1.0, 1.0, 1.0]).is_none());
        assert!(normalize_by_std(&[1.0]).is_none());
    }
}
