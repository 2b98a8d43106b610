//! Integration tests for cuegrid
//!
//! Fixtures are generated on the fly: click tracks and bursts with hound, and
//! ID3v2 tags written with lofty, placed inside WAV `id3 ` chunks or at the
//! start of MP3-named files.

use cuegrid::config::Settings;
use cuegrid::cues::encode_markers;
use cuegrid::types::{CuePoint, Software};
use cuegrid::{pipeline, AudioAnalyzer, CuegridError, EmbeddedCueReader};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SAMPLE_RATE: u32 = 44100;

fn wav_spec() -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn write_wav(path: &Path, samples: impl Iterator<Item = f32>) {
    let mut writer = hound::WavWriter::create(path, wav_spec()).expect("Failed to create WAV file");
    for sample in samples {
        writer
            .write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)
            .expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV");
}

/// Short decaying clicks at `bpm`, the first at t=0
fn generate_click_track(path: &Path, bpm: f32, duration_secs: f32) {
    let num_samples = (duration_secs * SAMPLE_RATE as f32) as usize;
    let samples_per_beat = (60.0 / bpm * SAMPLE_RATE as f32) as usize;
    let impulse_samples = (0.005 * SAMPLE_RATE as f32) as usize;

    write_wav(
        path,
        (0..num_samples).map(|i| {
            let position_in_beat = i % samples_per_beat;
            if position_in_beat < impulse_samples {
                0.8 * (-5.0 * position_in_beat as f32 / impulse_samples as f32).exp()
            } else {
                0.0
            }
        }),
    );
}

/// Quiet tone with loud bursts starting at `bursts` seconds
fn generate_bursts(path: &Path, duration_secs: f32, bursts: &[f32]) {
    let num_samples = (duration_secs * SAMPLE_RATE as f32) as usize;
    write_wav(
        path,
        (0..num_samples).map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let tone = (2.0 * std::f32::consts::PI * 220.0 * t).sin();
            let loud = bursts.iter().any(|&b| t >= b && t < b + 0.3);
            tone * if loud { 0.8 } else { 0.02 }
        }),
    );
}

/// ID3v2.4 tags built with lofty's writer
mod build {
    use lofty::id3::v2::{
        CommentFrame, ExtendedTextFrame, Frame, FrameFlags, FrameValue, GeneralEncapsulatedObject,
        Id3v2Tag,
    };
    use lofty::{TagExt, TextEncoding};

    pub fn tag(frames: Vec<Frame<'static>>) -> Vec<u8> {
        let mut tag = Id3v2Tag::new();
        for frame in frames {
            tag.insert(frame);
        }
        let mut out = Vec::new();
        tag.dump_to(&mut out).expect("Failed to write ID3v2 tag");
        out
    }

    pub fn geob(description: &str, data: &[u8]) -> Frame<'static> {
        let object = GeneralEncapsulatedObject {
            encoding: TextEncoding::UTF8,
            mime_type: Some("application/octet-stream".to_string()),
            file_name: None,
            descriptor: Some(description.to_string()),
            data: data.to_vec(),
        };
        Frame::new("GEOB", FrameValue::Binary(object.as_bytes()), FrameFlags::default()).unwrap()
    }

    pub fn private(owner: &str, data: &[u8]) -> Frame<'static> {
        let mut body = owner.as_bytes().to_vec();
        body.push(0);
        body.extend_from_slice(data);
        Frame::new("PRIV", FrameValue::Binary(body), FrameFlags::default()).unwrap()
    }

    pub fn user_text(description: &str, value: &str) -> Frame<'static> {
        let value = FrameValue::UserText(ExtendedTextFrame {
            encoding: TextEncoding::UTF8,
            description: description.to_string(),
            content: value.to_string(),
        });
        Frame::new("TXXX", value, FrameFlags::default()).unwrap()
    }

    pub fn comment(description: &str, text: &str) -> Frame<'static> {
        let value = FrameValue::Comment(CommentFrame {
            encoding: TextEncoding::UTF8,
            language: *b"eng",
            description: description.to_string(),
            content: text.to_string(),
        });
        Frame::new("COMM", value, FrameFlags::default()).unwrap()
    }
}

/// Append an `id3 ` chunk holding `tag` and fix up the RIFF size
fn append_id3_chunk(path: &Path, tag: &[u8]) {
    let mut bytes = fs::read(path).unwrap();
    bytes.extend_from_slice(b"id3 ");
    bytes.extend_from_slice(&(tag.len() as u32).to_le_bytes());
    bytes.extend_from_slice(tag);
    if tag.len() % 2 == 1 {
        bytes.push(0);
    }
    let riff_size = (bytes.len() - 8) as u32;
    bytes[4..8].copy_from_slice(&riff_size.to_le_bytes());
    fs::write(path, bytes).unwrap();
}

fn serato_tag(positions: &[f64]) -> lofty::id3::v2::Frame<'static> {
    let cues: Vec<CuePoint> = positions
        .iter()
        .enumerate()
        .map(|(i, &p)| CuePoint::embedded(p, "#00FF00", "", i as u8 + 1, Software::Serato))
        .collect();
    build::geob("Serato Markers2", &encode_markers(&cues))
}

fn click_fixture(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    generate_click_track(&path, 120.0, 30.0);
    path
}

fn is_octave_of_120(tempo: f64) -> bool {
    [60.0, 120.0, 240.0].iter().any(|t| (tempo - t).abs() / t < 0.03)
}

// =============================================================================
// Analysis
// =============================================================================

#[test]
fn test_click_track_tempo_and_grid() {
    let dir = TempDir::new().unwrap();
    let path = click_fixture(&dir, "click.wav");

    let analysis = AudioAnalyzer::default().analyze(&path, &[]).unwrap();

    assert!(is_octave_of_120(analysis.tempo), "tempo {}", analysis.tempo);
    assert!((analysis.duration - 30.0).abs() < 0.01);
    assert_eq!(analysis.sample_rate, SAMPLE_RATE);
    assert_eq!(analysis.waveform.len(), 2000);
    assert!(analysis.beats.len() >= 25, "only {} beats", analysis.beats.len());

    // Every 4th beat is a downbeat
    let expected: Vec<f64> = analysis.beats.iter().step_by(4).map(|b| b.position).collect();
    assert_eq!(analysis.downbeats, expected);
    for (i, beat) in analysis.beats.iter().enumerate() {
        assert_eq!(beat.is_downbeat, i % 4 == 0, "beat {}", i);
        assert!((0.0..=1.0).contains(&beat.confidence));
    }

    // Beats are evenly spaced at the detected tempo
    let period = 60.0 / analysis.tempo;
    for pair in analysis.beats.windows(2) {
        let interval = pair[1].position - pair[0].position;
        assert!((interval - period).abs() < 0.05, "interval {}", interval);
    }

    assert!(!analysis.tempo_changes.is_empty());
    for change in &analysis.tempo_changes {
        assert!((change.bpm - analysis.tempo).abs() / analysis.tempo < 0.05);
    }
    assert!(!analysis.energy_curve.is_empty());
    assert!(!analysis.spectral_centroid.is_empty());
}

#[test]
fn test_analysis_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let path = click_fixture(&dir, "click.wav");
    let analyzer = AudioAnalyzer::default();

    let first = analyzer.analyze(&path, &[]).unwrap();
    let second = analyzer.analyze(&path, &[]).unwrap();

    assert_eq!(first.tempo, second.tempo);
    assert_eq!(first.beats, second.beats);
    assert_eq!(first.downbeats, second.downbeats);
    assert_eq!(first.waveform, second.waveform);
}

#[test]
fn test_cue_alignment_on_click_track() {
    let dir = TempDir::new().unwrap();
    let path = click_fixture(&dir, "click.wav");
    let analyzer = AudioAnalyzer::default();
    let grid = analyzer.analyze(&path, &[]).unwrap();
    assert!(grid.downbeats.len() > 4);

    let on_grid = grid.downbeats[2] + 0.02;
    let off_grid = grid.downbeats[3] + 0.3;
    let cues = vec![CuePoint::user(on_grid), CuePoint::user(off_grid)];
    let analysis = analyzer.analyze(&path, &cues).unwrap();

    assert_eq!(analysis.cue_analyses.len(), 2);
    let first = &analysis.cue_analyses[0];
    assert!(first.is_on_downbeat);
    assert!(first.suggested_position.is_none());
    assert!(first.confidence > 0.9);

    let second = &analysis.cue_analyses[1];
    assert!(!second.is_on_downbeat);
    assert_eq!(second.suggested_position, Some(second.nearest_downbeat));
    // One bar of four beats per downbeat interval: tempo / 16
    let expected = analysis.tempo / 16.0;
    assert!(
        (second.bpm_at_position - expected).abs() / expected < 0.05,
        "bpm {} vs tempo {}",
        second.bpm_at_position,
        analysis.tempo
    );
}

#[test]
fn test_zoom_view_of_click_track() {
    let dir = TempDir::new().unwrap();
    let path = click_fixture(&dir, "click.wav");
    let analyzer = AudioAnalyzer::default();
    let analysis = analyzer.analyze(&path, &[]).unwrap();

    let view = analyzer.zoom(&analysis, 15.0, 4.0);
    assert_eq!(view.start_time, 13.0);
    assert_eq!(view.end_time, 17.0);
    assert!(!view.waveform.is_empty());
    assert!(view.beats.iter().all(|b| (13.0..=17.0).contains(&b.position)));
    assert!(view.downbeats.iter().all(|d| (13.0..=17.0).contains(d)));
    assert!(view.time_per_point > 0.0);
}

#[test]
fn test_suggest_cue_points_finds_bursts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bursts.wav");
    generate_bursts(&path, 12.0, &[2.0, 7.0]);

    let times = AudioAnalyzer::default().suggest_cue_points(&path, 0.7).unwrap();
    assert_eq!(times.len(), 2, "times {:?}", times);
    assert!((times[0] - 2.15).abs() < 0.3);
    assert!((times[1] - 7.15).abs() < 0.3);
}

#[test]
fn test_analysis_of_missing_file_fails() {
    let result = AudioAnalyzer::default().analyze(Path::new("/nonexistent/track.wav"), &[]);
    assert!(matches!(result, Err(CuegridError::FileNotFound(_))));
}

#[test]
fn test_analysis_of_garbage_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.mp3");
    fs::write(&path, vec![0x5Au8; 4096]).unwrap();

    let err = AudioAnalyzer::default().analyze(&path, &[]).unwrap_err();
    assert!(err.is_recoverable());
}

// =============================================================================
// Embedded cues
// =============================================================================

#[test]
fn test_cues_from_wav_id3_chunk() {
    let dir = TempDir::new().unwrap();
    let path = click_fixture(&dir, "tagged.wav");
    let tag = build::tag(vec![
        serato_tag(&[12.5, 64.25]),
        build::comment("", "Energy 7 CUE:12.5,100.0"),
    ]);
    append_id3_chunk(&path, &tag);

    let cues = EmbeddedCueReader::new().read_all_embedded_cues(&path);
    let positions: Vec<f64> = cues.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![12.5, 64.25, 100.0]);
    assert_eq!(cues[0].software, Software::Serato);
    assert_eq!(cues[0].color, "#00FF00");
    assert_eq!(cues[1].hotcue_index, 2);
    assert_eq!(cues[2].software, Software::MixInKey);
    assert_eq!(cues[2].name, "MIK Cue 2");

    // The audio still decodes with the extra chunk
    let analysis = AudioAnalyzer::default().analyze(&path, &cues).unwrap();
    assert!((analysis.duration - 30.0).abs() < 0.01);
}

#[test]
fn test_cues_from_leading_id3_tag() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("track.mp3");
    let mut bytes = build::tag(vec![
        build::user_text("TRAKTOR", "CUE 30.5 HOTCUE 45.0"),
        build::private("Pioneer", b"HOT 45.04 CUE 90.0"),
    ]);
    bytes.extend_from_slice(&[0u8; 256]);
    fs::write(&path, bytes).unwrap();

    let cues = EmbeddedCueReader::new().read_all_embedded_cues(&path);
    let summary: Vec<(f64, Software)> = cues.iter().map(|c| (c.position, c.software)).collect();
    // 45.04 shares the 45.0 slot with Traktor's cue
    assert_eq!(
        summary,
        vec![
            (30.5, Software::Traktor),
            (45.0, Software::Traktor),
            (90.0, Software::Rekordbox),
        ]
    );
}

#[test]
fn test_unreadable_files_have_no_cues() {
    let dir = TempDir::new().unwrap();
    let reader = EmbeddedCueReader::new();

    let empty = dir.path().join("empty.mp3");
    fs::write(&empty, b"").unwrap();
    assert!(reader.read_all_embedded_cues(&empty).is_empty());

    let garbage = dir.path().join("garbage.flac");
    fs::write(&garbage, vec![0xFFu8; 1024]).unwrap();
    assert!(reader.read_all_embedded_cues(&garbage).is_empty());

    assert!(reader
        .read_all_embedded_cues(Path::new("/nonexistent/track.mp3"))
        .is_empty());

    // Plain audio without tags
    let plain = click_fixture(&dir, "plain.wav");
    assert!(reader.read_all_embedded_cues(&plain).is_empty());
}

#[test]
fn test_scan_file_metadata_reports_tags() {
    let dir = TempDir::new().unwrap();
    let path = click_fixture(&dir, "scan.wav");
    append_id3_chunk(
        &path,
        &build::tag(vec![serato_tag(&[8.0]), build::user_text("TRAKTOR", "nothing here")]),
    );

    let scan = EmbeddedCueReader::new().scan_file_metadata(&path);
    assert_eq!(scan.filename, "scan.wav");
    assert!(scan.tags_found.iter().any(|t| t == "GEOB:Serato Markers2"));
    assert!(scan.tags_found.iter().any(|t| t == "TXXX:TRAKTOR"));
    assert_eq!(scan.software_detected, vec![Software::Serato, Software::Traktor]);
    assert_eq!(scan.cue_points.len(), 1);
}

// =============================================================================
// Batch pipeline
// =============================================================================

fn batch_settings(input: &Path, output: &Path) -> Settings {
    Settings {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        threads: 2,
        show_progress: false,
        ..Default::default()
    }
}

fn read_report(output: &Path) -> serde_json::Value {
    let text = fs::read_to_string(output.join("cuegrid.json")).expect("report missing");
    serde_json::from_str(&text).expect("report is not JSON")
}

#[test]
fn test_batch_writes_report_and_skips_existing() {
    let music = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let tagged = click_fixture(&music, "a.wav");
    append_id3_chunk(&tagged, &build::tag(vec![serato_tag(&[4.0])]));
    click_fixture(&music, "b.wav");
    // Undecodable audio behind a readable tag
    let mut broken = build::tag(vec![build::user_text("TRAKTOR", "CUE 12.0")]);
    broken.extend_from_slice(&[0x5Au8; 4096]);
    fs::write(music.path().join("broken.mp3"), broken).unwrap();

    let settings = batch_settings(music.path(), out.path());
    let result = pipeline::run(&settings).unwrap();
    assert_eq!(result.total_files, 3);
    assert_eq!(result.successful, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.failed, 0);

    let report = read_report(out.path());
    assert_eq!(report["version"], "1.0");
    assert_eq!(report["metadata"]["trackCount"], 3);
    let tracks = report["tracks"].as_array().unwrap();
    assert!(tracks[0]["path"].as_str().unwrap().ends_with("a.wav"));
    assert_eq!(tracks[0]["cuePoints"].as_array().unwrap().len(), 1);
    assert_eq!(tracks[0]["analysis"]["cueAnalyses"].as_array().unwrap().len(), 1);
    assert!(is_octave_of_120(tracks[1]["analysis"]["tempo"].as_f64().unwrap()));

    // The skipped file keeps its cues, without analysis
    assert!(tracks[2]["path"].as_str().unwrap().ends_with("broken.mp3"));
    assert_eq!(tracks[2]["cuePoints"][0]["position"], 12.0);
    assert!(tracks[2].get("analysis").is_none());

    // Second run leaves every reported file alone
    let again = pipeline::run(&settings).unwrap();
    assert_eq!(again.successful, 0);
    assert_eq!(again.skipped, 3);
    assert_eq!(read_report(out.path())["metadata"]["trackCount"], 3);
}

#[test]
fn test_batch_without_analysis_keeps_every_file() {
    let music = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    fs::write(music.path().join("broken.mp3"), vec![0x5Au8; 4096]).unwrap();
    click_fixture(&music, "c.wav");

    let settings = Settings {
        analyze: false,
        ..batch_settings(music.path(), out.path())
    };
    let result = pipeline::run(&settings).unwrap();
    assert_eq!(result.successful, 2);

    let report = read_report(out.path());
    for track in report["tracks"].as_array().unwrap() {
        assert!(track.get("analysis").is_none());
        assert!(track["cuePoints"].as_array().unwrap().is_empty());
    }
}

#[test]
fn test_batch_on_missing_input_fails() {
    let out = TempDir::new().unwrap();
    let settings = batch_settings(Path::new("/nonexistent/music"), out.path());
    assert!(matches!(pipeline::run(&settings), Err(CuegridError::FileNotFound(_))));
}
