//! Core data types for cuegrid
//!
//! These types flow from the cue extractor and the analyzer out to callers.
//! Everything that leaves the crate serializes to JSON with camelCase keys.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// Cue points
// =============================================================================

/// DJ software a cue point was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Software {
    Serato,
    #[serde(rename = "mixinkey")]
    MixInKey,
    Traktor,
    Rekordbox,
    Unknown,
}

impl Software {
    /// Lowercase tag used in reports and logs
    pub fn as_str(self) -> &'static str {
        match self {
            Software::Serato => "serato",
            Software::MixInKey => "mixinkey",
            Software::Traktor => "traktor",
            Software::Rekordbox => "rekordbox",
            Software::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Software {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a cue point. Only plain cues are decoded today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueKind {
    #[default]
    Cue,
}

/// Where a cue point came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueSource {
    /// Decoded from tags written by DJ software
    #[default]
    Embedded,
    /// Supplied by hand (CLI, caller)
    User,
}

/// Default energy level for cues without a real energy source
pub const DEFAULT_ENERGY_LEVEL: u8 = 5;

/// Highest hot-cue slot. Slot 0 means "not a hot cue".
pub const MAX_HOTCUE_INDEX: u8 = 8;

/// A vendor-agnostic cue point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuePoint {
    /// Seconds from track start, never negative
    pub position: f64,
    #[serde(rename = "type")]
    pub kind: CueKind,
    /// `#RRGGBB`
    pub color: String,
    pub name: String,
    /// Hot-cue slot 0-8 (0 = unassigned)
    pub hotcue_index: u8,
    /// When the cue was extracted (not read from the file)
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// 1-10, placeholder until enriched
    pub energy_level: u8,
    pub source: CueSource,
    pub software: Software,
}

impl CuePoint {
    /// Build an embedded cue point decoded from `software`'s tags
    ///
    /// Negative positions are clamped to zero and out-of-range hot-cue slots
    /// are treated as unassigned.
    pub fn embedded(
        position: f64,
        color: impl Into<String>,
        name: impl Into<String>,
        hotcue_index: u8,
        software: Software,
    ) -> Self {
        Self {
            position: position.max(0.0),
            kind: CueKind::Cue,
            color: color.into(),
            name: name.into(),
            hotcue_index: if hotcue_index > MAX_HOTCUE_INDEX { 0 } else { hotcue_index },
            created_at: chrono::Utc::now(),
            energy_level: DEFAULT_ENERGY_LEVEL,
            source: CueSource::Embedded,
            software,
        }
    }

    /// Build a manually supplied cue point at `position` seconds
    pub fn user(position: f64) -> Self {
        Self {
            position: position.max(0.0),
            kind: CueKind::Cue,
            color: "#FFFFFF".to_string(),
            name: format!("Cue @ {:.3}s", position.max(0.0)),
            hotcue_index: 0,
            created_at: chrono::Utc::now(),
            energy_level: DEFAULT_ENERGY_LEVEL,
            source: CueSource::User,
            software: Software::Unknown,
        }
    }

    /// True if the cue is bound to a hot-cue slot
    pub fn is_hotcue(&self) -> bool {
        self.hotcue_index > 0
    }
}

/// Only the cues bound to a hot-cue slot
pub fn hotcues(cues: &[CuePoint]) -> Vec<&CuePoint> {
    cues.iter().filter(|c| c.is_hotcue()).collect()
}

/// First cue bound to hot-cue `slot`
pub fn cue_by_hotkey(cues: &[CuePoint], slot: u8) -> Option<&CuePoint> {
    if slot == 0 {
        return None;
    }
    cues.iter().find(|c| c.hotcue_index == slot)
}

/// Diagnostic view of a file's tags
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileScan {
    pub file_path: PathBuf,
    pub filename: String,
    /// Every tag key present, in container order
    pub tags_found: Vec<String>,
    /// Vendors inferable from tag names, first-seen order
    pub software_detected: Vec<Software>,
    pub cue_points: Vec<CuePoint>,
}

// =============================================================================
// Analysis results
// =============================================================================

/// One tracked beat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeatInfo {
    /// Seconds
    pub position: f64,
    pub is_downbeat: bool,
    /// 0-1
    pub confidence: f64,
    /// Local tempo estimate
    pub bpm: f64,
    /// Mean absolute amplitude in the window following the beat
    pub energy: f64,
}

/// Coarse section label from a cue's relative position in the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicalContext {
    Intro,
    Verse,
    Chorus,
    Breakdown,
    Outro,
}

impl MusicalContext {
    /// Classify a fraction of the track duration (0.0 - 1.0)
    ///
    /// Fixed thresholds, not structural analysis.
    pub fn from_relative_position(relative: f64) -> Self {
        if relative < 0.1 {
            MusicalContext::Intro
        } else if relative < 0.3 {
            MusicalContext::Verse
        } else if relative < 0.7 {
            MusicalContext::Chorus
        } else if relative < 0.9 {
            MusicalContext::Breakdown
        } else {
            MusicalContext::Outro
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MusicalContext::Intro => "intro",
            MusicalContext::Verse => "verse",
            MusicalContext::Chorus => "chorus",
            MusicalContext::Breakdown => "breakdown",
            MusicalContext::Outro => "outro",
        }
    }
}

/// A cue point scored against the beat grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueAnalysis {
    pub original_position: f64,
    pub nearest_downbeat: f64,
    /// Absolute seconds
    pub distance_to_downbeat: f64,
    pub is_on_downbeat: bool,
    /// max(0, 1 - distance)
    pub confidence: f64,
    /// Nearest downbeat, only when off-grid but close enough to snap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_position: Option<f64>,
    pub energy_level: f64,
    pub bpm_at_position: f64,
    pub musical_context: MusicalContext,
}

/// Local tempo at the start of a beat window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoChange {
    /// Seconds
    pub time: f64,
    pub bpm: f64,
}

/// Complete analysis of one audio file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAnalysis {
    /// Seconds
    pub duration: f64,
    pub sample_rate: u32,
    /// Normalized RMS envelope, fixed point count
    pub waveform: Vec<f32>,
    pub beats: Vec<BeatInfo>,
    /// Seconds
    pub downbeats: Vec<f64>,
    /// Global BPM
    pub tempo: f64,
    pub tempo_changes: Vec<TempoChange>,
    /// Gaussian-smoothed RMS per hop
    pub energy_curve: Vec<f32>,
    /// Hz per frame
    pub spectral_centroid: Vec<f32>,
    pub cue_analyses: Vec<CueAnalysis>,
}

/// Time-windowed slice of an analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomView {
    pub waveform: Vec<f32>,
    pub start_time: f64,
    pub end_time: f64,
    pub beats: Vec<BeatInfo>,
    pub downbeats: Vec<f64>,
    /// Seconds covered by one waveform point (0 when the slice is empty)
    pub time_per_point: f64,
}

/// One file's result from the batch pipeline
#[derive(Debug, Clone)]
pub struct ProcessedTrack {
    /// Deterministic ID derived from the path
    pub track_id: i32,
    pub path: PathBuf,
    /// Embedded cue points (possibly empty)
    pub cue_points: Vec<CuePoint>,
    /// Present when audio analysis ran
    pub analysis: Option<AudioAnalysis>,
}

// =============================================================================
// Audio buffer types
// =============================================================================

/// Decoded mono audio
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        // Guard against division by zero - use 0 duration for invalid sample rate
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample index for a time in seconds (not clamped)
    pub fn index_at(&self, seconds: f64) -> usize {
        (seconds.max(0.0) * self.sample_rate as f64) as usize
    }

    /// Mean absolute amplitude over `[start, start + window)` seconds
    ///
    /// Returns 0 when the window runs past the end of the buffer.
    pub fn mean_abs(&self, start: f64, window: f64) -> f64 {
        let from = self.index_at(start);
        let to = self.index_at(start + window);
        if to >= self.samples.len() || to <= from {
            return 0.0;
        }
        let slice = &self.samples[from..to];
        slice.iter().map(|s| s.abs() as f64).sum::<f64>() / slice.len() as f64
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats supported by cuegrid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Aiff,
    M4a,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "aiff" | "aif" => Some(AudioFormat::Aiff),
            "m4a" | "mp4" | "aac" => Some(AudioFormat::M4a),
            _ => None,
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_musical_context_thresholds() {
        let duration = 200.0;
        assert_eq!(MusicalContext::from_relative_position(10.0 / duration), MusicalContext::Intro);
        assert_eq!(MusicalContext::from_relative_position(40.0 / duration), MusicalContext::Verse);
        assert_eq!(MusicalContext::from_relative_position(100.0 / duration), MusicalContext::Chorus);
        assert_eq!(MusicalContext::from_relative_position(150.0 / duration), MusicalContext::Breakdown);
        assert_eq!(MusicalContext::from_relative_position(195.0 / duration), MusicalContext::Outro);
        // Boundaries belong to the later section
        assert_eq!(MusicalContext::from_relative_position(0.1), MusicalContext::Verse);
        assert_eq!(MusicalContext::from_relative_position(0.9), MusicalContext::Outro);
    }

    #[test]
    fn test_embedded_cue_clamps() {
        let cue = CuePoint::embedded(-1.0, "#FF0000", "x", 42, Software::Serato);
        assert_eq!(cue.position, 0.0);
        assert_eq!(cue.hotcue_index, 0);
        assert_eq!(cue.energy_level, DEFAULT_ENERGY_LEVEL);
        assert_eq!(cue.source, CueSource::Embedded);
    }

    #[test]
    fn test_cue_point_json_shape() {
        let cue = CuePoint::embedded(12.5, "#00FF00", "MIK Cue 1", 1, Software::MixInKey);
        let json = serde_json::to_value(&cue).unwrap();
        assert_eq!(json["type"], "cue");
        assert_eq!(json["hotcueIndex"], 1);
        assert_eq!(json["software"], "mixinkey");
        assert_eq!(json["source"], "embedded");
        assert_eq!(json["energyLevel"], 5);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_hotcue_helpers() {
        let cues = vec![
            CuePoint::embedded(1.0, "#FF0000", "a", 0, Software::Serato),
            CuePoint::embedded(2.0, "#FF0000", "b", 3, Software::Serato),
            CuePoint::embedded(3.0, "#FF0000", "c", 3, Software::Traktor),
        ];
        assert_eq!(hotcues(&cues).len(), 2);
        assert_eq!(cue_by_hotkey(&cues, 3).map(|c| c.name.as_str()), Some("b"));
        assert!(cue_by_hotkey(&cues, 0).is_none());
        assert!(cue_by_hotkey(&cues, 7).is_none());
    }

    #[test]
    fn test_mean_abs_window() {
        let buffer = AudioBuffer::new(vec![0.5; 1000], 100);
        assert!((buffer.mean_abs(1.0, 0.5) - 0.5).abs() < 1e-9);
        // Window running off the end yields zero
        assert_eq!(buffer.mean_abs(9.8, 0.5), 0.0);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(AudioFormat::from_extension("M4A"), Some(AudioFormat::M4a));
        assert_eq!(AudioFormat::from_extension("aif"), Some(AudioFormat::Aiff));
        assert_eq!(AudioFormat::from_extension("ogg"), None);
    }
}
