//! Global tempo estimation from an onset envelope
//!
//! Autocorrelation of the (lightly smoothed, mean-removed) onset envelope,
//! weighted by a log-normal prior centred on a start tempo, then refined to
//! a fractional lag by parabolic interpolation.

use super::features::gaussian_smooth;
use super::onset::OnsetEnvelope;

/// Slowest tempo considered
pub const MIN_BPM: f64 = 30.0;

/// Fastest tempo considered
pub const MAX_BPM: f64 = 300.0;

/// Width of the tempo prior, in octaves
const PRIOR_OCTAVES: f64 = 1.0;

/// Smoothing applied before autocorrelation so periods that fall between
/// two frames still correlate at the neighbouring integer lags
const ENVELOPE_SIGMA: f64 = 1.0;

/// Estimate the dominant tempo in BPM
///
/// Returns `None` when the envelope is silent or too short to hold a single
/// period in the allowed range.
pub fn estimate_tempo(onsets: &OnsetEnvelope, start_bpm: f64) -> Option<f64> {
    if onsets.is_silent() || onsets.frame_rate <= 0.0 {
        return None;
    }

    let fr = onsets.frame_rate;
    let smoothed = gaussian_smooth(&onsets.strength, ENVELOPE_SIGMA, 4.0);
    let mean = smoothed.iter().map(|&v| v as f64).sum::<f64>() / smoothed.len() as f64;
    let centered: Vec<f64> = smoothed.iter().map(|&v| v as f64 - mean).collect();

    let min_lag = ((60.0 * fr / MAX_BPM).ceil() as usize).max(1);
    let max_lag = ((60.0 * fr / MIN_BPM).floor() as usize).min(centered.len().saturating_sub(1));
    if min_lag >= max_lag {
        return None;
    }

    // Include one lag on each side for the parabolic fit
    let ac: Vec<f64> = (0..=max_lag + 1)
        .map(|lag| autocorrelation(&centered, lag))
        .collect();

    let prior = |lag: usize| {
        let bpm = 60.0 * fr / lag as f64;
        let octaves = (bpm / start_bpm).log2() / PRIOR_OCTAVES;
        (-0.5 * octaves * octaves).exp()
    };

    let (best_lag, best_score) = (min_lag..=max_lag)
        .map(|lag| (lag, ac[lag] * prior(lag)))
        .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best });

    if best_lag == 0 || best_score <= 0.0 {
        return None;
    }

    let refined = best_lag as f64 + parabolic_offset(ac[best_lag - 1], ac[best_lag], ac[best_lag + 1]);
    Some(60.0 * fr / refined)
}

/// Unbiased autocorrelation at `lag` (mean product over the overlap)
fn autocorrelation(x: &[f64], lag: usize) -> f64 {
    if lag >= x.len() {
        return 0.0;
    }
    let n = x.len() - lag;
    x[..n].iter().zip(&x[lag..]).map(|(a, b)| a * b).sum::<f64>() / n as f64
}

/// Vertex offset (-0.5..0.5) of the parabola through three equally spaced points
fn parabolic_offset(left: f64, centre: f64, right: f64) -> f64 {
    let denom = left - 2.0 * centre + right;
    if denom >= 0.0 {
        return 0.0;
    }
    (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
}
