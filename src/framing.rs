use bytes::{Buf, BytesMut};

/// Incremental line framer over a raw byte stream.
///
/// Input arrives in arbitrary chunks; a message unit ends at `\n`. Partial
/// trailing data stays buffered until more bytes arrive, and [`finish`]
/// flushes whatever remains when the stream ends without a terminator.
/// Blank lines are dropped.
///
/// [`finish`]: LineFramer::finish
pub struct LineFramer {
    buffer: BytesMut,
}

impl LineFramer {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
        }
    }

    /// Feed a chunk of raw bytes and extract every complete unit it finishes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut units = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.split_to(pos);
            self.buffer.advance(1); // consume the terminator
            if let Some(unit) = Self::to_unit(&line) {
                units.push(unit);
            }
        }
        units
    }

    /// Flush the unterminated remainder at end of input, if any.
    pub fn finish(&mut self) -> Option<String> {
        let rest = self.buffer.split();
        Self::to_unit(&rest)
    }

    /// Number of bytes currently buffered waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    // Lines are expected to be UTF-8; anything else is replaced rather than
    // dropped so the parse failure surfaces downstream with the raw text.
    fn to_unit(raw: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(raw);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}
