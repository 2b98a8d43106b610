//! Embedded cue dispatcher
//!
//! Reads a file's tags once, runs every registered vendor parser over them,
//! and merges the results. Extraction never fails: an unreadable file is
//! logged and yields no cues.

use super::mixinkey::MixInKeyParser;
use super::rekordbox::RekordboxParser;
use super::serato::SeratoParser;
use super::traits::CueParser;
use super::traktor::TraktorParser;
use crate::tags::{read_tags, TagSet};
use crate::types::{CuePoint, FileScan, Software};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Runs the vendor parsers in registry order
pub struct EmbeddedCueReader {
    parsers: Vec<Box<dyn CueParser>>,
}

impl Default for EmbeddedCueReader {
    fn default() -> Self {
        Self::with_parsers(vec![
            Box::new(SeratoParser),
            Box::new(MixInKeyParser),
            Box::new(TraktorParser),
            Box::new(RekordboxParser),
        ])
    }
}

impl EmbeddedCueReader {
    /// Reader with the four built-in vendors (Serato, Mixed In Key, Traktor, Rekordbox)
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader with a custom registry; order decides which duplicate survives
    pub fn with_parsers(parsers: Vec<Box<dyn CueParser>>) -> Self {
        Self { parsers }
    }

    /// Vendors in dispatch order
    pub fn vendors(&self) -> Vec<Software> {
        self.parsers.iter().map(|p| p.software()).collect()
    }

    /// All embedded cue points of `path`, deduplicated
    pub fn read_all_embedded_cues(&self, path: &Path) -> Vec<CuePoint> {
        debug!("Scanning embedded cues in {}", path.display());
        match read_tags(path) {
            Ok(tags) => {
                let cues = self.cues_from_tags(&tags);
                info!("{} unique cue points in {}", cues.len(), path.display());
                cues
            }
            Err(e) => {
                warn!("Cannot read tags from {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Run every parser over an already-read tag set and merge the results
    pub fn cues_from_tags(&self, tags: &TagSet) -> Vec<CuePoint> {
        let mut all = Vec::new();
        for parser in &self.parsers {
            let cues = parser.parse(tags);
            if !cues.is_empty() {
                debug!("{}: {} cue points", parser.name(), cues.len());
                all.extend(cues);
            }
        }
        dedupe_cues(all)
    }

    /// Diagnostic listing of a file's tags, inferred vendors and cues
    pub fn scan_file_metadata(&self, path: &Path) -> FileScan {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let tags = read_tags(path).unwrap_or_else(|e| {
            warn!("Cannot read tags from {}: {}", path.display(), e);
            TagSet::default()
        });

        let tags_found: Vec<String> = tags.keys().map(str::to_string).collect();
        let mut software_detected = Vec::new();
        for software in tags_found.iter().filter_map(|k| detect_software(k)) {
            if !software_detected.contains(&software) {
                software_detected.push(software);
            }
        }

        FileScan {
            file_path: path.to_path_buf(),
            filename,
            tags_found,
            software_detected,
            cue_points: self.cues_from_tags(&tags),
        }
    }
}

/// Keep the first cue per 0.1 s position
///
/// A later cue is dropped when it rounds to the same tenth as a kept cue, or
/// falls in the same `floor(position * 10)` slot. So no two kept cues round
/// alike, and 120.04 / 120.06 still collide.
pub fn dedupe_cues(cues: Vec<CuePoint>) -> Vec<CuePoint> {
    let mut rounded = HashSet::new();
    let mut slots = HashSet::new();
    cues.into_iter()
        .filter(|cue| {
            let tenths = cue.position * 10.0;
            let (round, slot) = (tenths.round() as i64, tenths.floor() as i64);
            if rounded.contains(&round) || slots.contains(&slot) {
                return false;
            }
            rounded.insert(round);
            slots.insert(slot);
            true
        })
        .collect()
}

/// Vendor suggested by a tag name, if any
pub fn detect_software(tag_key: &str) -> Option<Software> {
    let key = tag_key.to_lowercase();
    if key.contains("serato") {
        Some(Software::Serato)
    } else if key.contains("mixedinkey") || key.contains("mixed") {
        Some(Software::MixInKey)
    } else if key.contains("traktor") || key.contains("native") {
        Some(Software::Traktor)
    } else if key.contains("pioneer") || key.contains("rekordbox") {
        Some(Software::Rekordbox)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::TagFrame;
    use std::io::Write;

    struct FixedParser {
        software: Software,
        positions: Vec<f64>,
    }

    impl CueParser for FixedParser {
        fn parse(&self, _tags: &TagSet) -> Vec<CuePoint> {
            self.positions
                .iter()
                .map(|&p| CuePoint::embedded(p, "#FF0000", "fixed", 1, self.software))
                .collect()
        }

        fn software(&self) -> Software {
            self.software
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_dedupe_first_vendor_wins() {
        let reader = EmbeddedCueReader::with_parsers(vec![
            Box::new(FixedParser { software: Software::Serato, positions: vec![120.04, 30.0] }),
            Box::new(FixedParser { software: Software::Traktor, positions: vec![120.06, 45.0] }),
        ]);
        let cues = reader.cues_from_tags(&TagSet::default());

        assert_eq!(cues.len(), 3);
        let in_bucket: Vec<&CuePoint> = cues.iter().filter(|c| (c.position - 120.05).abs() < 0.05).collect();
        assert_eq!(in_bucket.len(), 1);
        assert_eq!(in_bucket[0].software, Software::Serato);
        assert_eq!(in_bucket[0].position, 120.04);
    }

    fn cue_at(position: f64, software: Software) -> CuePoint {
        CuePoint::embedded(position, "#FF0000", "", 0, software)
    }

    #[test]
    fn test_dedupe_same_rounded_position_across_slots() {
        // Different floor slots, both round to 120.1
        let kept = dedupe_cues(vec![
            cue_at(120.06, Software::Serato),
            cue_at(120.14, Software::Traktor),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].position, 120.06);

        let kept = dedupe_cues(vec![
            cue_at(120.09, Software::Serato),
            cue_at(120.10, Software::Serato),
        ]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_dedupe_keeps_distinct_tenths() {
        let kept = dedupe_cues(vec![
            cue_at(120.04, Software::Serato),
            cue_at(120.16, Software::Traktor),
            cue_at(120.25, Software::Rekordbox),
        ]);
        let positions: Vec<f64> = kept.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![120.04, 120.16, 120.25]);

        let mut tenths: Vec<i64> = kept.iter().map(|c| (c.position * 10.0).round() as i64).collect();
        tenths.dedup();
        assert_eq!(tenths.len(), kept.len());
    }

    #[test]
    fn test_registry_order() {
        assert_eq!(
            EmbeddedCueReader::new().vendors(),
            vec![Software::Serato, Software::MixInKey, Software::Traktor, Software::Rekordbox]
        );
    }

    #[test]
    fn test_all_vendors_merge() {
        let serato = crate::cues::encode_markers(&[CuePoint::embedded(
            10.0,
            "#00FF00",
            "x",
            1,
            Software::Serato,
        )]);
        let tags = TagSet::new(vec![
            TagFrame::binary("GEOB:Serato Markers2", serato),
            TagFrame::text("COMM::eng", "CUE:10.05,20.0"),
            TagFrame::binary("PRIV:www.native-instruments.com", b"CUE 30.5".to_vec()),
            TagFrame::text("TXXX:PIONEER_REKORDBOX", "HOT 40.25"),
        ]);

        let cues = EmbeddedCueReader::new().cues_from_tags(&tags);
        let summary: Vec<(f64, Software)> = cues.iter().map(|c| (c.position, c.software)).collect();
        assert_eq!(
            summary,
            vec![
                (10.0, Software::Serato),
                (20.0, Software::MixInKey),
                (30.5, Software::Traktor),
                (40.25, Software::Rekordbox),
            ]
        );
    }

    #[test]
    fn test_never_fails_on_bad_files() {
        let reader = EmbeddedCueReader::new();
        assert!(reader.read_all_embedded_cues(Path::new("/nonexistent/a.mp3")).is_empty());

        let empty = tempfile::NamedTempFile::new().unwrap();
        assert!(reader.read_all_embedded_cues(empty.path()).is_empty());

        let mut garbage = tempfile::NamedTempFile::new().unwrap();
        garbage.write_all(&[0x5A; 4096]).unwrap();
        assert!(reader.read_all_embedded_cues(garbage.path()).is_empty());
    }

    #[test]
    fn test_detect_software() {
        assert_eq!(detect_software("GEOB:Serato Markers2"), Some(Software::Serato));
        assert_eq!(detect_software("TXXX:MixedInKey"), Some(Software::MixInKey));
        assert_eq!(detect_software("PRIV:www.native-instruments.com"), Some(Software::Traktor));
        assert_eq!(detect_software("----:com.pioneer.rekordbox"), Some(Software::Rekordbox));
        assert_eq!(detect_software("TIT2"), None);
    }

    #[test]
    fn test_scan_missing_file() {
        let scan = EmbeddedCueReader::new().scan_file_metadata(Path::new("/nonexistent/set.flac"));
        assert_eq!(scan.filename, "set.flac");
        assert!(scan.tags_found.is_empty());
        assert!(scan.software_detected.is_empty());
        assert!(scan.cue_points.is_empty());
    }
}
