//! Pipeline orchestration
//!
//! Discovery, parallel per-file extraction/analysis, then one report write.
//! Each file is handled independently; the only shared state is the progress
//! bar and the counters.

use crate::analysis::AudioAnalyzer;
use crate::config::Settings;
use crate::cues::EmbeddedCueReader;
use crate::discovery::{self, DiscoveredFile};
use crate::error::{CuegridError, Result};
use crate::export::{self, TrackJson, REPORT_FILE_NAME};
use crate::types::ProcessedTrack;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Pipeline result summary
#[derive(Debug)]
pub struct PipelineResult {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Run the batch pipeline
pub fn run(settings: &Settings) -> Result<PipelineResult> {
    let pipeline_start = Instant::now();
    settings.analysis.validate()?;

    info!("Scanning for audio files...");
    let files = discovery::scan(&settings.input, settings.recursive)?;
    if files.is_empty() {
        return Ok(PipelineResult {
            total_files: 0,
            successful: 0,
            failed: 0,
            skipped: 0,
        });
    }

    let json_path = settings.output.join(REPORT_FILE_NAME);
    let existing_paths: HashSet<String> = if settings.force {
        debug!("Force mode enabled, reprocessing all files");
        HashSet::new()
    } else {
        export::read_existing_analysis(&json_path)
    };

    let (to_process, already_done): (Vec<_>, Vec<_>) = files
        .into_iter()
        .partition(|f| !existing_paths.contains(&*f.path.to_string_lossy()));

    let total_files = to_process.len() + already_done.len();
    if !already_done.is_empty() {
        info!(
            "Skipping {} files already in the report (use --force to redo)",
            already_done.len()
        );
    }
    if to_process.is_empty() {
        info!("All files already processed, nothing to do");
        return Ok(PipelineResult {
            total_files,
            successful: 0,
            failed: 0,
            skipped: already_done.len(),
        });
    }

    let analysis_start = Instant::now();
    let (tracks, stats) = process_files(&to_process, settings)?;
    info!(
        "Processed {} files in {:.2}s",
        to_process.len(),
        analysis_start.elapsed().as_secs_f64()
    );

    if !tracks.is_empty() {
        export_results(&tracks, settings)?;
    }

    info!(
        "Total pipeline time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    Ok(PipelineResult {
        total_files,
        successful: stats.successful,
        failed: stats.failed,
        skipped: stats.skipped + already_done.len(),
    })
}

struct ProcessStats {
    successful: usize,
    failed: usize,
    skipped: usize,
}

/// Extract (and optionally analyze) files on a dedicated rayon pool
fn process_files(
    files: &[DiscoveredFile],
    settings: &Settings,
) -> Result<(Vec<ProcessedTrack>, ProcessStats)> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.threads)
        .build()
        .map_err(|e| CuegridError::ConfigError(format!("Failed to configure thread pool: {}", e)))?;
    debug!("Processing on {} threads", settings.threads);

    let reader = EmbeddedCueReader::new();
    let analyzer = settings.analyze.then(|| AudioAnalyzer::new(settings.analysis.clone()));

    let progress_bar = settings.show_progress.then(|| {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb
    });

    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);

    let tracks: Vec<ProcessedTrack> = pool.install(|| {
        files
            .par_iter()
            .filter_map(|file| {
                let (track, analysis_error) = process_single_file(file, &reader, analyzer.as_ref());
                if let Some(ref pb) = progress_bar {
                    pb.inc(1);
                    pb.set_message(file.path.file_name().unwrap_or_default().to_string_lossy().to_string());
                }
                match analysis_error {
                    None => {
                        successful.fetch_add(1, Ordering::Relaxed);
                        Some(track)
                    }
                    Some(e) if e.is_recoverable() => {
                        warn!("Skipping analysis of {}: {}", file.path.display(), e);
                        skipped.fetch_add(1, Ordering::Relaxed);
                        Some(track)
                    }
                    Some(e) => {
                        error!("Failed {}: {}", file.path.display(), e);
                        failed.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                }
            })
            .collect()
    });

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Done");
    }

    let stats = ProcessStats {
        successful: successful.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        skipped: skipped.load(Ordering::Relaxed),
    };
    Ok((tracks, stats))
}

/// Extract embedded cues, then analyze
///
/// The track keeps its cues when analysis fails; the error comes back
/// alongside it for the caller to classify.
fn process_single_file(
    file: &DiscoveredFile,
    reader: &EmbeddedCueReader,
    analyzer: Option<&AudioAnalyzer>,
) -> (ProcessedTrack, Option<CuegridError>) {
    debug!("Processing: {}", file.path.display());

    let cue_points = reader.read_all_embedded_cues(&file.path);
    let (analysis, analysis_error) = match analyzer.map(|a| a.analyze(&file.path, &cue_points)) {
        Some(Ok(analysis)) => (Some(analysis), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    let track = ProcessedTrack {
        track_id: discovery::generate_track_id(&file.path),
        path: file.path.clone(),
        cue_points,
        analysis,
    };
    (track, analysis_error)
}

/// Merge with the previous report (unless forced) and write it
fn export_results(tracks: &[ProcessedTrack], settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(&settings.output)
        .map_err(|e| CuegridError::output_error(&settings.output, e))?;

    let json_path = settings.output.join(REPORT_FILE_NAME);
    let fresh: Vec<TrackJson> = tracks.iter().map(TrackJson::from).collect();
    let fresh_paths: HashSet<&str> = fresh.iter().map(|t| t.path.as_str()).collect();

    let mut report: Vec<TrackJson> = if settings.force {
        Vec::new()
    } else {
        export::read_existing_tracks(&json_path)
            .into_iter()
            .filter(|t| !fresh_paths.contains(t.path.as_str()))
            .collect()
    };
    report.extend(fresh);
    report.sort_by(|a, b| a.path.cmp(&b.path));

    export::write_json(&report, &json_path)
}
