//! Embedded cue point extraction
//!
//! One parser per DJ application, all behind [`CueParser`]. The
//! [`EmbeddedCueReader`] runs them in order (Serato, Mixed In Key, Traktor,
//! Rekordbox) and keeps the first cue in each 0.1 s slot.

pub mod heuristics;
pub mod mixinkey;
pub mod reader;
pub mod rekordbox;
pub mod serato;
pub mod traits;
pub mod traktor;

pub use mixinkey::MixInKeyParser;
pub use reader::{dedupe_cues, detect_software, EmbeddedCueReader};
pub use rekordbox::RekordboxParser;
pub use serato::{encode_markers, parse_markers, SeratoParser};
pub use traits::CueParser;
pub use traktor::TraktorParser;
