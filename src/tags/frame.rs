//! Container-neutral view of a file's tags

/// Raw content of one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagPayload {
    Text(String),
    Binary(Vec<u8>),
}

impl TagPayload {
    /// Payload as text, decoding binary content as lossy UTF-8
    pub fn to_text(&self) -> String {
        match self {
            TagPayload::Text(text) => text.clone(),
            TagPayload::Binary(data) => String::from_utf8_lossy(data).into_owned(),
        }
    }

    /// Payload as bytes, encoding text content as UTF-8
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            TagPayload::Text(text) => text.as_bytes().to_vec(),
            TagPayload::Binary(data) => data.clone(),
        }
    }
}

/// One tag, keyed the way DJ tooling names them
///
/// ID3v2 frames use `FRAME:description` (`GEOB:Serato Markers2`,
/// `PRIV:www.native-instruments.com`, `COMM:desc:eng`); other containers use
/// their native key (`COMMENT`, `----:com.serato.dj:markersv2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFrame {
    pub key: String,
    pub payload: TagPayload,
}

impl TagFrame {
    pub fn text(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            payload: TagPayload::Text(text.into()),
        }
    }

    pub fn binary(key: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            payload: TagPayload::Binary(data.into()),
        }
    }
}

/// All tags read from one file, in container order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    frames: Vec<TagFrame>,
}

impl TagSet {
    pub fn new(frames: Vec<TagFrame>) -> Self {
        Self { frames }
    }

    pub fn push(&mut self, frame: TagFrame) {
        self.frames.push(frame);
    }

    pub fn extend(&mut self, frames: impl IntoIterator<Item = TagFrame>) {
        self.frames.extend(frames);
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagFrame> {
        self.frames.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(|f| f.key.as_str())
    }

    /// First tag whose key matches `key`
    ///
    /// Matching ignores ASCII case and treats `_` and space as the same
    /// character, so `GEOB:Serato_Markers2` finds `GEOB:Serato Markers2`.
    pub fn get(&self, key: &str) -> Option<&TagPayload> {
        self.frames
            .iter()
            .find(|f| keys_match(&f.key, key))
            .map(|f| &f.payload)
    }
}

impl FromIterator<TagFrame> for TagSet {
    fn from_iter<I: IntoIterator<Item = TagFrame>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn keys_match(a: &str, b: &str) -> bool {
    let norm = |c: char| if c == '_' { ' ' } else { c.to_ascii_lowercase() };
    a.chars().count() == b.chars().count() && a.chars().map(norm).eq(b.chars().map(norm))
}
