//! ID3v2 frames through lofty's format-specific files
//!
//! The unified `Tag` view drops GEOB and PRIV frames, which is where DJ
//! software keeps cue data, so ID3v2 tags are taken from the concrete
//! `MpegFile` / `WavFile` / `AiffFile` and mapped frame by frame.

use super::frame::TagFrame;
use lofty::id3::v2::{Frame, FrameValue, GeneralEncapsulatedObject, Id3v2Tag};
use tracing::trace;

/// Map every frame of `tag` to a [`TagFrame`]
///
/// Keys follow `FRAME:description`: `GEOB:Serato Markers2`,
/// `PRIV:www.native-instruments.com`, `TXXX:TRAKTOR`, `COMM:desc:eng`.
pub fn tag_frames(tag: &Id3v2Tag) -> Vec<TagFrame> {
    tag.into_iter().filter_map(map_frame).collect()
}

fn map_frame(frame: &Frame<'_>) -> Option<TagFrame> {
    let id = frame.id_str();
    let mapped = match frame.content() {
        FrameValue::Binary(data) if id == "GEOB" => match GeneralEncapsulatedObject::parse(data) {
            Ok(object) => TagFrame::binary(
                format!("GEOB:{}", object.descriptor.unwrap_or_default()),
                object.data,
            ),
            Err(e) => {
                trace!("Skipping undecodable GEOB frame: {}", e);
                return None;
            }
        },
        FrameValue::Private(private) => TagFrame::binary(
            format!("PRIV:{}", private.owner),
            private.private_data.as_slice(),
        ),
        FrameValue::UserText(text) => {
            TagFrame::text(format!("TXXX:{}", text.description), text.content.as_str())
        }
        FrameValue::Comment(comment) => TagFrame::text(
            format!(
                "COMM:{}:{}",
                comment.description,
                String::from_utf8_lossy(&comment.language)
            ),
            comment.content.as_str(),
        ),
        FrameValue::Text(text) => TagFrame::text(id, text.value.as_str()),
        FrameValue::Binary(data) => TagFrame::binary(id, data.as_slice()),
        _ => return None,
    };
    Some(mapped)
}
