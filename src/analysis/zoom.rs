//! Time-windowed projection of a finished analysis

use crate::types::{AudioAnalysis, ZoomView};

/// Slice the waveform, beats and downbeats to `duration` seconds around `center`
///
/// The window is clipped to the track. Waveform indices come from the ratio
/// of the window bounds to the track duration.
pub fn zoom_view(analysis: &AudioAnalysis, center: f64, duration: f64) -> ZoomView {
    let start_time = (center - duration / 2.0).max(0.0);
    let end_time = (center + duration / 2.0).min(analysis.duration);

    let points = analysis.waveform.len();
    let index_at = |t: f64| {
        if analysis.duration <= 0.0 {
            return 0;
        }
        ((t / analysis.duration * points as f64).max(0.0) as usize).min(points)
    };
    let end_idx = index_at(end_time);
    let start_idx = index_at(start_time).min(end_idx);
    let waveform = analysis.waveform[start_idx..end_idx].to_vec();

    let in_window = |t: f64| start_time <= t && t <= end_time;
    let beats = analysis
        .beats
        .iter()
        .filter(|b| in_window(b.position))
        .cloned()
        .collect();
    let downbeats = analysis.downbeats.iter().copied().filter(|&d| in_window(d)).collect();

    let time_per_point = if waveform.is_empty() {
        0.0
    } else {
        (end_time - start_time) / waveform.len() as f64
    };

    ZoomView {
        waveform,
        start_time,
        end_time,
        beats,
        downbeats,
        time_per_point,
    }
}
