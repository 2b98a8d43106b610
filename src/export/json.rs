//! `cuegrid.json` batch report

use crate::error::{CuegridError, Result};
use crate::types::{CueAnalysis, CuePoint, ProcessedTrack, TempoChange};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Report file name inside the output directory
pub const REPORT_FILE_NAME: &str = "cuegrid.json";

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level report structure
#[derive(Debug, Serialize, Deserialize)]
pub struct CuegridJson {
    pub version: String,
    pub metadata: ExportMetadata,
    pub tracks: Vec<TrackJson>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// cuegrid version that generated this file
    pub generator_version: String,
    /// RFC 3339 timestamp
    pub exported_at: String,
    pub track_count: usize,
}

/// One track in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackJson {
    pub track_id: i32,
    pub path: String,
    pub cue_points: Vec<CuePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisSummary>,
}

/// Grid-level summary of an analysis (per-frame series are left out)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub duration: f64,
    pub sample_rate: u32,
    pub tempo: f64,
    pub beat_count: usize,
    pub downbeats: Vec<f64>,
    pub tempo_changes: Vec<TempoChange>,
    pub cue_analyses: Vec<CueAnalysis>,
}

impl From<&ProcessedTrack> for TrackJson {
    fn from(track: &ProcessedTrack) -> Self {
        Self {
            track_id: track.track_id,
            path: track.path.to_string_lossy().to_string(),
            cue_points: track.cue_points.clone(),
            analysis: track.analysis.as_ref().map(|a| AnalysisSummary {
                duration: a.duration,
                sample_rate: a.sample_rate,
                tempo: a.tempo,
                beat_count: a.beats.len(),
                downbeats: a.downbeats.clone(),
                tempo_changes: a.tempo_changes.clone(),
                cue_analyses: a.cue_analyses.clone(),
            }),
        }
    }
}

/// Write the report
///
/// Writes to a temp file in the same directory first, then renames it over
/// the target so an interrupted run never leaves a truncated report.
pub fn write_json(tracks: &[TrackJson], output_path: &Path) -> Result<()> {
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| CuegridError::output_error(output_path, e))?;

    let output = CuegridJson {
        version: SCHEMA_VERSION.to_string(),
        metadata: ExportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            track_count: tracks.len(),
        },
        tracks: tracks.to_vec(),
    };

    write_report(file, &output).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        CuegridError::OutputError {
            path: output_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        CuegridError::OutputError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!("Wrote {} tracks to {}", tracks.len(), output_path.display());
    Ok(())
}

/// Serialize `report` and flush the buffer; a failed flush is an error
fn write_report<W: Write>(writer: W, report: &CuegridJson) -> std::io::Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()
}

/// Tracks of an existing report; empty if it is missing or unreadable
pub fn read_existing_tracks(json_path: &Path) -> Vec<TrackJson> {
    if !json_path.exists() {
        debug!("No existing report at {}", json_path.display());
        return Vec::new();
    }

    let file = match File::open(json_path) {
        Ok(f) => f,
        Err(e) => {
            debug!("Could not open existing report: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_reader::<_, CuegridJson>(BufReader::new(file)) {
        Ok(json) => json.tracks,
        Err(e) => {
            debug!("Could not parse existing report: {}", e);
            Vec::new()
        }
    }
}

/// Paths already present in an existing report
pub fn read_existing_analysis(json_path: &Path) -> HashSet<String> {
    let paths: HashSet<String> = read_existing_tracks(json_path)
        .into_iter()
        .map(|t| t.path)
        .collect();
    debug!("{} tracks already in {}", paths.len(), json_path.display());
    paths
}
