//! Energy-peak cue suggestions
//!
//! Candidate cue points are the loud moments of a track: local maxima of the
//! RMS envelope above a share of the loudest frame, at least one second apart.

use super::features::rms_frames;

/// Indices of local maxima at least `min_height` high and `min_distance` apart
///
/// A flat-topped maximum reports its middle sample. When two peaks are
/// closer than `min_distance`, the higher one is kept.
pub fn find_peaks(values: &[f32], min_height: f32, min_distance: usize) -> Vec<usize> {
    let mut peaks = Vec::new();
    let n = values.len();
    let mut i = 1;
    while i + 1 < n {
        if values[i] > values[i - 1] {
            // Walk a plateau
            let mut end = i;
            while end + 1 < n && values[end + 1] == values[i] {
                end += 1;
            }
            if end + 1 < n && values[end + 1] < values[i] {
                if values[i] >= min_height {
                    peaks.push((i + end) / 2);
                }
                i = end + 1;
                continue;
            }
            i = end;
        }
        i += 1;
    }

    if min_distance <= 1 || peaks.len() < 2 {
        return peaks;
    }

    // Highest first; ties keep the later-listed peak out
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| values[peaks[b]].total_cmp(&values[peaks[a]]).then(a.cmp(&b)));

    let mut keep = vec![true; peaks.len()];
    for &idx in &order {
        if !keep[idx] {
            continue;
        }
        let here = peaks[idx];
        for (other, kept) in keep.iter_mut().enumerate() {
            if other != idx && peaks[other].abs_diff(here) < min_distance {
                *kept = false;
            }
        }
    }

    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect()
}

/// Times (seconds) of RMS peaks at least `sensitivity * max` high and one
/// second apart
pub fn energy_peak_times(
    samples: &[f32],
    sample_rate: u32,
    frame_length: usize,
    hop: usize,
    sensitivity: f64,
) -> Vec<f64> {
    let rms = rms_frames(samples, frame_length, hop);
    let max = rms.iter().cloned().fold(0.0f32, f32::max);
    if max <= 0.0 || hop == 0 {
        return Vec::new();
    }

    let min_height = (sensitivity.clamp(0.0, 1.0) as f32) * max;
    let one_second = (sample_rate as usize / hop).max(1);

    find_peaks(&rms, min_height, one_second)
        .into_iter()
        .map(|frame| frame as f64 * hop as f64 / sample_rate as f64)
        .collect()
}
