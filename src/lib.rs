//! cuegrid - DJ cue point extraction and beat-grid alignment
//!
//! Reads the cue points DJ software embeds in audio file tags and measures
//! them against a beat grid tracked from the audio itself.
//!
//! # Architecture
//!
//! - `tags`: container-neutral tag access (ID3v2 frame walker plus lofty)
//! - `cues`: per-vendor cue parsers and the deduplicating dispatcher
//! - `audio`: decoding with symphonia, resampling with rubato
//! - `analysis`: beat tracking, per-beat features, cue scoring, zoom
//! - `config`: CLI arguments, batch settings, analyzer constants
//! - `discovery`, `pipeline`, `export`: batch mode writing `cuegrid.json`
//!
//! # Example
//!
//! ```no_run
//! use cuegrid::{AudioAnalyzer, EmbeddedCueReader};
//! use std::path::Path;
//!
//! let path = Path::new("track.mp3");
//! let cues = EmbeddedCueReader::new().read_all_embedded_cues(path);
//! let analysis = AudioAnalyzer::default().analyze(path, &cues)?;
//! for scored in &analysis.cue_analyses {
//!     println!("{:.2}s on grid: {}", scored.original_position, scored.is_on_downbeat);
//! }
//! # Ok::<(), cuegrid::CuegridError>(())
//! ```

pub mod analysis;
pub mod audio;
pub mod config;
pub mod cues;
pub mod discovery;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod tags;
pub mod types;

// Re-export key types at crate root
pub use analysis::AudioAnalyzer;
pub use cues::EmbeddedCueReader;
pub use error::{CuegridError, Result};
pub use types::{AudioAnalysis, AudioBuffer, BeatInfo, CueAnalysis, CuePoint, ZoomView};
