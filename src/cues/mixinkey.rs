//! Mixed In Key comment parser
//!
//! Mixed In Key writes cue positions into comment fields as
//! `CUE:12.5,64.0,96.25` (or `CUES:` with `;` / `|` separators).

use super::heuristics::{hotcue_slot, palette_color};
use super::traits::CueParser;
use crate::tags::TagSet;
use crate::types::{CuePoint, Software};
use tracing::debug;

/// Tags checked in order until one yields cues
pub const MIXINKEY_TAG_KEYS: &[&str] = &[
    "COMM::eng",
    "COMM:MixedInKey",
    "TXXX:MixedInKey",
    "TXXX:MIXEDINKEY",
    "comment",
    "©cmt",
];

const MARKERS: [&str; 2] = ["CUE:", "CUES:"];
const SEPARATORS: [char; 3] = [',', ';', '|'];

#[derive(Debug, Default, Clone, Copy)]
pub struct MixInKeyParser;

impl CueParser for MixInKeyParser {
    fn parse(&self, tags: &TagSet) -> Vec<CuePoint> {
        for key in MIXINKEY_TAG_KEYS {
            let Some(payload) = tags.get(key) else {
                continue;
            };
            debug!("Found MixInKey tag: {}", key);

            let cues = parse_comment(&payload.to_text());
            if !cues.is_empty() {
                debug!("MixInKey: {} cue points", cues.len());
                return cues;
            }
        }
        Vec::new()
    }

    fn software(&self) -> Software {
        Software::MixInKey
    }

    fn name(&self) -> &'static str {
        "mixinkey"
    }
}

/// Decode the cue list from one comment
///
/// The first whitespace-delimited token after `CUE:` / `CUES:` is split on
/// the first separator it contains. Entries that are not positive numbers
/// are skipped but still consume an index.
pub fn parse_comment(text: &str) -> Vec<CuePoint> {
    let upper = text.to_uppercase();

    let Some(marker) = MARKERS.iter().find(|m| upper.contains(**m)) else {
        return Vec::new();
    };
    let after = upper.split(*marker).nth(1).unwrap_or_default();
    let Some(token) = after.split_whitespace().next() else {
        return Vec::new();
    };

    let entries: Vec<&str> = match SEPARATORS.iter().find(|sep| token.contains(**sep)) {
        Some(sep) => token.split(*sep).collect(),
        None => vec![token],
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let position: f64 = entry.trim().parse().ok()?;
            (position.is_finite() && position > 0.0).then(|| {
                CuePoint::embedded(
                    position,
                    palette_color(i),
                    format!("MIK Cue {}", i + 1),
                    hotcue_slot(i),
                    Software::MixInKey,
                )
            })
        })
        .collect()
}
