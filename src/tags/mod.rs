//! Tag container access
//!
//! Produces a flat, container-neutral list of `(key, payload)` tags that the
//! cue parsers look vendor keys up in.

pub mod cursor;
pub mod frame;
pub mod id3v2;
mod reader;

pub use frame::{TagFrame, TagPayload, TagSet};
pub use reader::read_tags;
