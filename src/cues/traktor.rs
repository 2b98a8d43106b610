//! Traktor Pro tag parser
//!
//! Native Instruments data is proprietary; the payload is read as text and
//! any decimal numbers in it are taken as cue positions.

use super::heuristics::numbered_text_cues;
use super::traits::CueParser;
use crate::tags::TagSet;
use crate::types::{CuePoint, Software};
use tracing::debug;

/// Tags checked in order until one yields cues
pub const TRAKTOR_TAG_KEYS: &[&str] = &[
    "PRIV:www.native-instruments.com",
    "PRIV:Native Instruments",
    "TXXX:TRAKTOR",
    "TXXX:NI_TRAKTOR",
];

const TRIGGERS: &[&str] = &["CUE", "HOTCUE"];

#[derive(Debug, Default, Clone, Copy)]
pub struct TraktorParser;

impl CueParser for TraktorParser {
    fn parse(&self, tags: &TagSet) -> Vec<CuePoint> {
        for key in TRAKTOR_TAG_KEYS {
            let Some(payload) = tags.get(key) else {
                continue;
            };
            debug!("Found Traktor tag: {}", key);

            let cues = parse_payload(&payload.to_text());
            if !cues.is_empty() {
                debug!("Traktor: {} cue points", cues.len());
                return cues;
            }
        }
        Vec::new()
    }

    fn software(&self) -> Software {
        Software::Traktor
    }

    fn name(&self) -> &'static str {
        "traktor"
    }
}

/// Cues from decoded Traktor tag text
pub fn parse_payload(text: &str) -> Vec<CuePoint> {
    numbered_text_cues(text, TRIGGERS, "Traktor Cue", Software::Traktor)
}
