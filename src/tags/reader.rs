//! Read every tag of an audio file into a [`TagSet`]
//!
//! ID3v2 tags (MP3, WAV, AIFF) are mapped frame by frame so GEOB and PRIV
//! payloads survive. Everything else (Vorbis comments, MP4 atoms, APE, RIFF
//! INFO) comes from lofty's unified tag items.

use super::frame::{TagFrame, TagSet};
use super::id3v2;
use crate::error::TagReadError;
use lofty::error::{ErrorKind, LoftyError};
use lofty::iff::aiff::AiffFile;
use lofty::iff::wav::WavFile;
use lofty::mpeg::MpegFile;
use lofty::{
    AudioFile, FileType, ItemKey, ItemValue, ParseOptions, Probe, Tag, TagType, TaggedFile,
    TaggedFileExt,
};
use std::io::{Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

/// Read all tags from `path`
///
/// A file with no recognizable container but a leading ID3v2 tag still
/// yields that tag. A file nothing can be read from is an error.
pub fn read_tags(path: &Path) -> Result<TagSet, TagReadError> {
    let probe = Probe::open(path)?.guess_file_type()?;
    let file_type = probe.file_type();
    let mut reader = probe.into_inner();
    let options = ParseOptions::new().read_properties(false);

    let mut tags = TagSet::default();
    let tagged_file: TaggedFile = match file_type {
        Some(FileType::Mpeg) => {
            let file = MpegFile::read_from(&mut reader, options)?;
            tags.extend(file.id3v2().map(id3v2::tag_frames).unwrap_or_default());
            file.into()
        }
        Some(FileType::Wav) => {
            let file = WavFile::read_from(&mut reader, options)?;
            tags.extend(file.id3v2().map(id3v2::tag_frames).unwrap_or_default());
            file.into()
        }
        Some(FileType::Aiff) => {
            let file = AiffFile::read_from(&mut reader, options)?;
            tags.extend(file.id3v2().map(id3v2::tag_frames).unwrap_or_default());
            file.into()
        }
        Some(other) => Probe::with_file_type(reader, other).options(options).read()?,
        None => {
            // A bare ID3v2 tag with no audio after it
            reader.seek(SeekFrom::Start(0))?;
            return match MpegFile::read_from(&mut reader, options) {
                Ok(file) if file.id3v2().is_some() => {
                    tags.extend(file.id3v2().map(id3v2::tag_frames).unwrap_or_default());
                    debug!("Container unknown for {}, using its ID3v2 tag", path.display());
                    Ok(tags)
                }
                _ => Err(LoftyError::new(ErrorKind::UnknownFormat).into()),
            };
        }
    };
    trace!("{} ID3v2 frames in {}", tags.len(), path.display());

    for tag in tagged_file.tags() {
        if tag.tag_type() == TagType::Id3v2 {
            continue;
        }
        tags.extend(item_frames(tag));
    }

    Ok(tags)
}

fn item_frames(tag: &Tag) -> impl Iterator<Item = TagFrame> + '_ {
    let tag_type = tag.tag_type();
    tag.items().filter_map(move |item| {
        let key = item_key_name(item.key(), tag_type)?;
        let frame = match item.value() {
            ItemValue::Text(text) | ItemValue::Locator(text) => TagFrame::text(key, text.as_str()),
            ItemValue::Binary(data) => TagFrame::binary(key, data.as_slice()),
        };
        Some(frame)
    })
}

/// Native key of an item in its own container (`COMMENT`, `©cmt`, ...)
fn item_key_name(key: &ItemKey, tag_type: TagType) -> Option<String> {
    match key {
        ItemKey::Unknown(name) => Some(name.clone()),
        other => other.map_key(tag_type, true).map(str::to_string),
    }
}
