//! Shared helpers for the text-based vendor formats

use crate::types::{CuePoint, Software, MAX_HOTCUE_INDEX};
use regex::Regex;
use std::sync::OnceLock;

/// Colors assigned cyclically to cues that carry none
pub const CUE_PALETTE: [&str; 8] = [
    "#FF0000", "#FF6600", "#FFFF00", "#00FF00", "#00FFFF", "#0066FF", "#9900FF", "#FF00CC",
];

/// Matches found by [`decimal_numbers`] beyond this count are ignored
pub const MAX_TEXT_CUES: usize = 8;

/// Palette color for the `index`-th cue of a tag
pub fn palette_color(index: usize) -> &'static str {
    CUE_PALETTE[index % CUE_PALETTE.len()]
}

/// Hot-cue slot for the `index`-th cue of a tag (0 past the last slot)
pub fn hotcue_slot(index: usize) -> u8 {
    if index < MAX_HOTCUE_INDEX as usize {
        index as u8 + 1
    } else {
        0
    }
}

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+\.[0-9]+").expect("decimal pattern is valid"))
}

/// Every `digits.digits` substring of `text`, in order, at most `limit`
///
/// Any decimal number in the text counts, including ones that have nothing
/// to do with cue points.
pub fn decimal_numbers(text: &str, limit: usize) -> Vec<&str> {
    decimal_pattern()
        .find_iter(text)
        .take(limit)
        .map(|m| m.as_str())
        .collect()
}

/// Cues from the decimal substrings of a free-text vendor tag
///
/// Returns nothing unless the uppercased text contains one of `triggers`.
/// Each of the first [`MAX_TEXT_CUES`] matches keeps its match index for the
/// color, slot and name, so a skipped non-positive value leaves a gap.
pub fn numbered_text_cues(
    text: &str,
    triggers: &[&str],
    name_prefix: &str,
    software: Software,
) -> Vec<CuePoint> {
    let upper = text.to_uppercase();
    if !triggers.iter().any(|t| upper.contains(t)) {
        return Vec::new();
    }

    decimal_numbers(text, MAX_TEXT_CUES)
        .into_iter()
        .enumerate()
        .filter_map(|(i, token)| {
            let position: f64 = token.parse().ok()?;
            (position > 0.0).then(|| {
                CuePoint::embedded(
                    position,
                    palette_color(i),
                    format!("{} {}", name_prefix, i + 1),
                    hotcue_slot(i),
                    software,
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(0), "#FF0000");
        assert_eq!(palette_color(7), "#FF00CC");
        assert_eq!(palette_color(8), "#FF0000");
    }

    #[test]
    fn test_hotcue_slots() {
        assert_eq!(hotcue_slot(0), 1);
        assert_eq!(hotcue_slot(7), 8);
        assert_eq!(hotcue_slot(8), 0);
    }

    #[test]
    fn test_decimal_numbers_limit() {
        let text = "1.0 2.0 3 4.5 x5.25y 6.0 7.0 8.0 9.0 10.0";
        let found = decimal_numbers(text, 8);
        assert_eq!(found.len(), 8);
        assert_eq!(found[0], "1.0");
        assert_eq!(found[3], "5.25");
    }

    #[test]
    fn test_numbered_cues_need_trigger() {
        let none = numbered_text_cues("12.5 30.0", &["CUE"], "X", Software::Traktor);
        assert!(none.is_empty());

        let cues = numbered_text_cues("hotcue 0.0 12.5", &["CUE"], "X", Software::Traktor);
        assert_eq!(cues.len(), 1);
        // Index 0 was zero and skipped; the survivor keeps index 1
        assert_eq!(cues[0].name, "X 2");
        assert_eq!(cues[0].hotcue_index, 2);
        assert_eq!(cues[0].color, "#FF6600");
    }
}
