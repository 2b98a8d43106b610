//! Short-time Fourier transform helpers
//!
//! Frames are centered: frame `t` covers samples around `t * hop`, with the
//! signal zero-padded by `n_fft / 2` on both sides, so a signal of `len`
//! samples has `len / hop + 1` frames.
//!
//! Spectra are visited one frame at a time instead of materialized, so a
//! full-length track at 44.1 kHz never holds a whole spectrogram in memory.

use rustfft::{num_complex::Complex, FftPlanner};

/// Periodic Hann window (the DFT-even form used for spectral analysis)
pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            0.5 * (1.0 - x.cos())
        })
        .collect()
}

/// Number of centered frames for a signal of `len` samples
pub fn frame_count(len: usize, hop: usize) -> usize {
    if hop == 0 {
        return 0;
    }
    len / hop + 1
}

/// Copy the centered, zero-padded frame `index` of `samples` into `out`
pub fn centered_frame(samples: &[f32], index: usize, hop: usize, out: &mut [f32]) {
    let half = out.len() / 2;
    let center = index * hop;
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = (center + i)
            .checked_sub(half)
            .and_then(|pos| samples.get(pos))
            .copied()
            .unwrap_or(0.0);
    }
}

/// Visit the magnitude spectrum (`n_fft / 2 + 1` bins) of every frame
pub fn for_each_magnitude_frame<F>(samples: &[f32], n_fft: usize, hop: usize, mut visit: F)
where
    F: FnMut(usize, &[f32]),
{
    if n_fft == 0 || hop == 0 {
        return;
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);
    let window = hann_window(n_fft);
    let num_bins = n_fft / 2 + 1;

    let mut frame = vec![0.0f32; n_fft];
    let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];
    let mut magnitudes = vec![0.0f32; num_bins];

    for index in 0..frame_count(samples.len(), hop) {
        centered_frame(samples, index, hop, &mut frame);
        for ((slot, &x), &w) in buffer.iter_mut().zip(&frame).zip(&window) {
            *slot = Complex::new(x * w, 0.0);
        }

        fft.process(&mut buffer);

        for (mag, bin) in magnitudes.iter_mut().zip(&buffer[..num_bins]) {
            *mag = bin.norm();
        }
        visit(index, &magnitudes);
    }
}

/// Spectral centroid in Hz per frame (0 for frames with no energy)
pub fn spectral_centroid(samples: &[f32], sample_rate: u32, n_fft: usize, hop: usize) -> Vec<f32> {
    let bin_hz = sample_rate as f64 / n_fft.max(1) as f64;
    let mut centroid = Vec::with_capacity(frame_count(samples.len(), hop));

    for_each_magnitude_frame(samples, n_fft, hop, |_, magnitudes| {
        let total: f64 = magnitudes.iter().map(|&m| m as f64).sum();
        if total <= f64::EPSILON {
            centroid.push(0.0);
            return;
        }
        let weighted: f64 = magnitudes
            .iter()
            .enumerate()
            .map(|(k, &m)| k as f64 * bin_hz * m as f64)
            .sum();
        centroid.push((weighted / total) as f32);
    });

    centroid
}
