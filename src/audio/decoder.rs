//! Audio decoding using symphonia
//!
//! Decodes audio files to mono f32 samples at their native sample rate.
//! Onset and tempo analysis run on a copy resampled with rubato.

use crate::error::{CuegridError, Result};
use crate::types::{AudioBuffer, AudioFormat};
use rubato::{FftFixedInOut, Resampler};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace};

/// Sample rate of the onset/tempo analysis signal (22050 Hz)
///
/// Onsets live well below 11 kHz, and half the samples halves the STFT work.
pub const ANALYSIS_SAMPLE_RATE: u32 = 22050;

/// Maximum file size we'll attempt to decode (2GB)
const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Decode an audio file to a mono AudioBuffer at its native sample rate
///
/// Fails if the file is missing, can't be probed, or holds no samples.
pub fn decode(path: &Path) -> Result<AudioBuffer> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CuegridError::FileNotFound(path.to_path_buf()),
        _ => CuegridError::decode_error(path, format!("Failed to read file metadata: {}", e)),
    })?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(CuegridError::decode_error(
            path,
            format!(
                "File too large ({:.1} GB). Maximum supported size is 2 GB.",
                metadata.len() as f64 / (1024.0 * 1024.0 * 1024.0)
            ),
        ));
    }

    let file = std::fs::File::open(path)
        .map_err(|e| CuegridError::decode_error(path, format!("Failed to open file: {}", e)))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let extension = path.extension().and_then(|e| e.to_str());
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| match extension {
            Some(ext) if AudioFormat::from_extension(ext).is_none() => CuegridError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: ext.to_string(),
            },
            _ => CuegridError::decode_error(path, format!("Failed to probe format: {}", e)),
        })?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| CuegridError::decode_error(path, "No audio tracks found"))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| CuegridError::decode_error(path, "Unknown sample rate"))?;

    debug!(
        "Decoding: {} @ {}Hz, {} channels",
        path.display(),
        sample_rate,
        codec_params.channels.map(|c| c.count()).unwrap_or(0)
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| CuegridError::decode_error(path, format!("Failed to create decoder: {}", e)))?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break; // End of stream
            }
            Err(e) => {
                return Err(CuegridError::decode_error(path, format!("Failed to read packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                trace!("Skipping corrupted frame: {}", e);
                continue;
            }
            Err(e) => {
                return Err(CuegridError::decode_error(path, format!("Decode error: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        all_samples.extend(to_mono(sample_buf.samples(), spec.channels.count()));
    }

    if all_samples.is_empty() {
        return Err(CuegridError::decode_error(path, "File contains no audio samples"));
    }

    let buffer = AudioBuffer::new(all_samples, sample_rate);
    debug!("Decoded {} samples ({:.2}s)", buffer.len(), buffer.duration);
    Ok(buffer)
}

/// Resample a buffer to `to_rate`, returning it unchanged if already there
pub fn resample_buffer(buffer: &AudioBuffer, to_rate: u32) -> AudioBuffer {
    if buffer.sample_rate == to_rate {
        return buffer.clone();
    }
    AudioBuffer::new(resample(&buffer.samples, buffer.sample_rate, to_rate), to_rate)
}

/// Convert interleaved multi-channel audio to mono
fn to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// FFT-based resampling with an anti-aliasing filter
///
/// Falls back to linear interpolation if rubato can't be set up for the
/// rate pair.
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    const CHUNK_SIZE: usize = 1024;

    let mut resampler = match FftFixedInOut::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        1, // mono channel
    ) {
        Ok(r) => r,
        Err(e) => {
            debug!("Rubato initialization failed ({}), using fallback", e);
            return resample_linear_fallback(samples, from_rate, to_rate);
        }
    };

    let input_frames_per_chunk = resampler.input_frames_next();
    let output_frames_per_chunk = resampler.output_frames_next();

    let ratio = to_rate as f64 / from_rate as f64;
    let mut output = Vec::with_capacity((samples.len() as f64 * ratio).ceil() as usize);

    let mut pos = 0;
    while pos < samples.len() {
        let end = (pos + input_frames_per_chunk).min(samples.len());
        let mut chunk = samples[pos..end].to_vec();

        // Pad last chunk
        if chunk.len() < input_frames_per_chunk {
            chunk.resize(input_frames_per_chunk, 0.0);
        }

        let input_channels = vec![chunk];

        match resampler.process(&input_channels, None) {
            Ok(resampled) => {
                if let Some(channel) = resampled.first() {
                    // Drop output produced from the padding
                    let valid_samples = if pos + input_frames_per_chunk > samples.len() {
                        let input_valid = samples.len() - pos;
                        ((input_valid as f64 * ratio).ceil() as usize).min(output_frames_per_chunk)
                    } else {
                        output_frames_per_chunk
                    };
                    output.extend_from_slice(&channel[..valid_samples.min(channel.len())]);
                }
            }
            Err(e) => {
                debug!("Rubato processing error ({}), using fallback for remaining", e);
                output.extend(resample_linear_fallback(&samples[pos..], from_rate, to_rate));
                break;
            }
        }

        pos += input_frames_per_chunk;
    }

    output
}

/// Linear interpolation resampler, used only when rubato fails
fn resample_linear_fallback(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio) as usize;

    (0..output_len)
        .map(|i| {
            let src_pos = i as f64 * ratio;
            let src_idx = src_pos as usize;
            let frac = (src_pos - src_idx as f64) as f32;
            if src_idx + 1 < samples.len() {
                samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
            } else {
                samples[src_idx.min(samples.len() - 1)]
            }
        })
        .collect()
}
