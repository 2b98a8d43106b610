//! Time-domain features: waveform envelope, RMS energy, smoothing, and the
//! beat-derived series (downbeats, per-beat info, tempo changes)

use super::spectral::{centered_frame, frame_count};
use crate::types::{AudioBuffer, BeatInfo, TempoChange};

/// Centered RMS per hop, each frame `frame_length` samples (zero-padded)
pub fn rms_frames(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f32> {
    if frame_length == 0 || hop == 0 {
        return Vec::new();
    }
    let mut frame = vec![0.0f32; frame_length];
    (0..frame_count(samples.len(), hop))
        .map(|index| {
            centered_frame(samples, index, hop, &mut frame);
            let power: f64 = frame.iter().map(|&x| (x as f64) * (x as f64)).sum();
            (power / frame_length as f64).sqrt() as f32
        })
        .collect()
}

/// RMS envelope with exactly `points` values, normalized so the loudest is 1
///
/// A silent signal yields all zeros.
pub fn waveform_envelope(samples: &[f32], points: usize, frame_length: usize) -> Vec<f32> {
    if points == 0 {
        return Vec::new();
    }
    let hop = (samples.len() / points).max(1);
    let mut frame = vec![0.0f32; frame_length.max(1)];

    let mut envelope: Vec<f32> = (0..points)
        .map(|index| {
            centered_frame(samples, index, hop, &mut frame);
            let power: f64 = frame.iter().map(|&x| (x as f64) * (x as f64)).sum();
            (power / frame.len() as f64).sqrt() as f32
        })
        .collect();

    let max = envelope.iter().cloned().fold(0.0f32, f32::max);
    if max > 0.0 {
        envelope.iter_mut().for_each(|v| *v /= max);
    }
    envelope
}

/// 1-D Gaussian filter, kernel radius `truncate * sigma`
///
/// Edges are extended by mirroring about the outer sample edge
/// (`d c b a | a b c d | d c b a`).
pub fn gaussian_smooth(values: &[f32], sigma: f64, truncate: f64) -> Vec<f32> {
    if values.is_empty() || sigma <= 0.0 {
        return values.to_vec();
    }

    let radius = (truncate * sigma + 0.5) as isize;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= total);

    let n = values.len() as isize;
    let reflect = |mut i: isize| -> usize {
        // Repeat until inside: long kernels on short inputs bounce more than once
        let period = 2 * n;
        i = i.rem_euclid(period);
        if i >= n {
            i = period - 1 - i;
        }
        i as usize
    };

    (0..n)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * values[reflect(i + k as isize - radius)] as f64)
                .sum::<f64>() as f32
        })
        .collect()
}

/// Gaussian-smoothed RMS energy per hop
pub fn energy_curve(samples: &[f32], frame_length: usize, hop: usize, sigma: f64) -> Vec<f32> {
    gaussian_smooth(&rms_frames(samples, frame_length, hop), sigma, 4.0)
}

/// Every `beats_per_bar`-th beat, starting with the first
///
/// Assumes a constant meter (4/4 by default); this is an approximation, not
/// meter detection.
pub fn downbeats(beats: &[f64], beats_per_bar: usize) -> Vec<f64> {
    beats.iter().step_by(beats_per_bar.max(1)).copied().collect()
}

/// Settings for [`beat_infos`]
#[derive(Debug, Clone, Copy)]
pub struct BeatEnrichment {
    /// A beat within this many seconds of a downbeat is a downbeat
    pub downbeat_tolerance: f64,
    /// Seconds of audio after the beat averaged for its energy
    pub energy_window: f64,
}

/// Per-beat flags, local tempo and energy
///
/// Local tempo comes from the last three intervals (four beats); the first
/// three beats use the global tempo.
pub fn beat_infos(
    beats: &[f64],
    strengths: &[f64],
    downbeats: &[f64],
    buffer: &AudioBuffer,
    tempo: f64,
    settings: BeatEnrichment,
) -> Vec<BeatInfo> {
    beats
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let bpm = if i >= 3 {
                local_tempo(&beats[i - 3..=i]).unwrap_or(tempo)
            } else {
                tempo
            };
            BeatInfo {
                position,
                is_downbeat: downbeats
                    .iter()
                    .any(|d| (position - d).abs() < settings.downbeat_tolerance),
                confidence: strengths.get(i).copied().unwrap_or(0.0).clamp(0.0, 1.0),
                bpm,
                energy: buffer.mean_abs(position, settings.energy_window),
            }
        })
        .collect()
}

/// Tempo of windows of `window` beats, advancing by half a window
pub fn tempo_changes(beats: &[f64], window: usize) -> Vec<TempoChange> {
    let step = (window / 2).max(1);
    if window < 2 || beats.len() <= window {
        return Vec::new();
    }

    (0..beats.len() - window)
        .step_by(step)
        .filter_map(|i| {
            let slice = &beats[i..i + window];
            local_tempo(slice).map(|bpm| TempoChange { time: slice[0], bpm })
        })
        .collect()
}

/// BPM from the mean interval of consecutive beat times
pub fn local_tempo(beats: &[f64]) -> Option<f64> {
    if beats.len() < 2 {
        return None;
    }
    let mean = (beats[beats.len() - 1] - beats[0]) / (beats.len() - 1) as f64;
    (mean > 0.0).then(|| 60.0 / mean)
}
