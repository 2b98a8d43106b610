//! Serato DJ marker parser
//!
//! Serato stores markers as a binary blob: a GEOB frame in ID3v2 files, a
//! base64 text field in Vorbis comments and MP4 freeform atoms. After an
//! optional 16-byte `Serato_Markers...` header the blob is a run of records:
//!
//! | bytes | field                                 |
//! |-------|---------------------------------------|
//! | 4     | marker type, big endian (0 or 1 = cue)|
//! | 4     | position in milliseconds, big endian  |
//! | 3     | RGB color                             |
//! | 1     | hot-cue slot (optional at buffer end) |
//!
//! Bytes that don't start a cue record are skipped one at a time.

use super::traits::CueParser;
use crate::tags::cursor::ByteCursor;
use crate::tags::{TagPayload, TagSet};
use crate::types::{CuePoint, Software};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use tracing::debug;

/// Tags checked in order; the first one present is the only one parsed
pub const SERATO_TAG_KEYS: &[&str] = &[
    "GEOB:Serato_Markers2",
    "GEOB:Serato_Markers_",
    "PRIV:Serato_Markers2",
    "TXXX:Serato_Markers2",
    "SERATO_MARKERS_V2",
    "----:com.serato.dj:markersv2",
];

const HEADER_MAGIC: &[u8] = b"Serato_Markers";
const HEADER_LEN: usize = 16;
const MIN_BLOB_LEN: usize = 8;
const CUE_MARKER_TYPES: [u32; 2] = [0x0000_0000, 0x0000_0001];

/// Header written by [`encode_markers`]
const ENCODED_HEADER: &[u8; HEADER_LEN] = b"Serato_Markers2\0";
const FALLBACK_RGB: [u8; 3] = [0xFF, 0x00, 0x00];

#[derive(Debug, Default, Clone, Copy)]
pub struct SeratoParser;

impl CueParser for SeratoParser {
    fn parse(&self, tags: &TagSet) -> Vec<CuePoint> {
        for key in SERATO_TAG_KEYS {
            let Some(payload) = tags.get(key) else {
                continue;
            };
            debug!("Found Serato tag: {}", key);

            let data = match payload {
                TagPayload::Binary(data) => data.clone(),
                TagPayload::Text(text) => match decode_base64(text) {
                    Some(data) => data,
                    None => {
                        debug!("Serato tag {} is not valid base64", key);
                        continue;
                    }
                },
            };

            let cues = parse_markers(&data);
            debug!("Serato: {} cue points", cues.len());
            return cues;
        }
        Vec::new()
    }

    fn software(&self) -> Software {
        Software::Serato
    }

    fn name(&self) -> &'static str {
        "serato"
    }
}

/// Base64 text as stored in Vorbis comments, with or without padding
fn decode_base64(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(&compact)
        .or_else(|_| STANDARD_NO_PAD.decode(compact.trim_end_matches('=')))
        .ok()
}

/// Decode every cue record in a Serato marker blob
///
/// Short or garbled data yields whatever records were complete.
pub fn parse_markers(data: &[u8]) -> Vec<CuePoint> {
    let mut cues = Vec::new();
    if data.len() < MIN_BLOB_LEN {
        return cues;
    }

    let mut cursor = ByteCursor::new(data);
    if data.starts_with(HEADER_MAGIC) && cursor.skip(HEADER_LEN).is_none() {
        return cues;
    }

    while cursor.remaining() > MIN_BLOB_LEN {
        let Some(marker_type) = cursor.peek_u32_be() else {
            break;
        };
        if !CUE_MARKER_TYPES.contains(&marker_type) {
            cursor.skip(1);
            continue;
        }
        cursor.skip(4);

        let Some(position_ms) = cursor.read_u32_be() else {
            break;
        };
        let Some(rgb) = cursor.take(3) else {
            break;
        };
        let hotcue = cursor.read_u8().unwrap_or(0);

        cues.push(CuePoint::embedded(
            f64::from(position_ms) / 1000.0,
            format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2]),
            format!("Serato Cue {}", cues.len() + 1),
            hotcue,
            Software::Serato,
        ));
    }

    cues
}

/// Encode cue points in the layout [`parse_markers`] reads
///
/// Positions are truncated to whole milliseconds. Colors that are not
/// `#RRGGBB` are written as red.
pub fn encode_markers(cues: &[CuePoint]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + cues.len() * 12);
    out.extend_from_slice(ENCODED_HEADER);
    for cue in cues {
        let position_ms = (cue.position.max(0.0) * 1000.0) as u32;
        out.extend_from_slice(&CUE_MARKER_TYPES[1].to_be_bytes());
        out.extend_from_slice(&position_ms.to_be_bytes());
        out.extend_from_slice(&parse_hex_color(&cue.color).unwrap_or(FALLBACK_RGB));
        out.push(cue.hotcue_index);
    }
    out
}

fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
