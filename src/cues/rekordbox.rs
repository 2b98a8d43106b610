//! Pioneer Rekordbox tag parser
//!
//! Same decimal-substring heuristic as Traktor, triggered by `CUE` or `HOT`.

use super::heuristics::numbered_text_cues;
use super::traits::CueParser;
use crate::tags::TagSet;
use crate::types::{CuePoint, Software};
use tracing::debug;

/// Tags checked in order until one yields cues
pub const REKORDBOX_TAG_KEYS: &[&str] = &[
    "TXXX:PIONEER_REKORDBOX",
    "COMM:Pioneer",
    "PRIV:Pioneer",
    "----:com.pioneer.rekordbox",
];

const TRIGGERS: &[&str] = &["CUE", "HOT"];

#[derive(Debug, Default, Clone, Copy)]
pub struct RekordboxParser;

impl CueParser for RekordboxParser {
    fn parse(&self, tags: &TagSet) -> Vec<CuePoint> {
        for key in REKORDBOX_TAG_KEYS {
            let Some(payload) = tags.get(key) else {
                continue;
            };
            debug!("Found Rekordbox tag: {}", key);

            let cues = parse_payload(&payload.to_text());
            if !cues.is_empty() {
                debug!("Rekordbox: {} cue points", cues.len());
                return cues;
            }
        }
        Vec::new()
    }

    fn software(&self) -> Software {
        Software::Rekordbox
    }

    fn name(&self) -> &'static str {
        "rekordbox"
    }
}

/// Cues from decoded Rekordbox tag text
pub fn parse_payload(text: &str) -> Vec<CuePoint> {
    numbered_text_cues(text, TRIGGERS, "RB Cue", Software::Rekordbox)
}
