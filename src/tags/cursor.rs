//! Bounds-checked reader over a byte slice
//!
//! Every read either returns the requested bytes and advances, or returns
//! `None` and leaves the cursor where it was.

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Advance by `n` bytes
    pub fn skip(&mut self, n: usize) -> Option<()> {
        if n > self.remaining() {
            return None;
        }
        self.pos += n;
        Some(())
    }

    /// Look at the next `n` bytes without consuming them
    pub fn peek(&self, n: usize) -> Option<&'a [u8]> {
        if n > self.remaining() {
            return None;
        }
        Some(&self.data[self.pos..self.pos + n])
    }

    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let bytes = self.peek(n)?;
        self.pos += n;
        Some(bytes)
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    pub fn peek_u32_be(&self) -> Option<u32> {
        self.peek(4).map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u32_be(&mut self) -> Option<u32> {
        let value = self.peek_u32_be()?;
        self.pos += 4;
        Some(value)
    }
}
