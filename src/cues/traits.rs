//! Vendor cue parser abstraction
//!
//! Each DJ application gets one implementation. The dispatcher runs them in
//! registry order over the same tag set.

use crate::tags::TagSet;
use crate::types::{CuePoint, Software};

/// Decoder for one vendor's embedded cue format
pub trait CueParser: Send + Sync {
    /// Decode cue points from a file's tags
    ///
    /// Never fails: missing or garbled vendor data yields an empty list.
    fn parse(&self, tags: &TagSet) -> Vec<CuePoint>;

    /// Vendor this parser decodes
    fn software(&self) -> Software;

    /// Get the name of this parser (for logging)
    fn name(&self) -> &'static str;
}
