//! Recursive chunk framing.
//!
//! Every format in this crate shares one container layout, repeated at every
//! nesting level until the buffer is exhausted:
//!
//! ```text
//! +------------------+
//! | Tag              |  4 bytes (u32 LE)
//! +------------------+
//! | Payload size     |  4 bytes (u32 LE)
//! +------------------+
//! | Payload          |  size bytes, raw data or nested chunks
//! +------------------+
//! ```

use crate::util::{Error, Result};

use super::PackedWriter;

/// Lazy iterator over `(tag, payload)` pairs of a chunked buffer.
///
/// Payloads are borrowed slices into the source buffer, yielded in file
/// order. Iteration itself never rejects a tag; recognizing tags is the
/// caller's concern.
#[derive(Clone)]
pub struct ChunkedReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ChunkedReader<'a> {
    /// Create a reader over a chunk-framed buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Number of bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn read_header(&mut self) -> Result<(u32, usize)> {
        let h = &self.data[self.offset..];
        if h.len() < 8 {
            return Err(Error::truncated(self.offset));
        }
        let tag = u32::from_le_bytes([h[0], h[1], h[2], h[3]]);
        let size = u32::from_le_bytes([h[4], h[5], h[6], h[7]]);
        self.offset += 8;
        if size as usize > self.remaining() {
            return Err(Error::MalformedChunk {
                tag,
                size,
                remaining: self.remaining(),
            });
        }
        Ok((tag, size as usize))
    }

    /// Read the next chunk, failing with `MissingChunk` if its tag is not
    /// `expected`. Used for chunks the format mandates in a fixed position.
    pub fn expect(&mut self, expected: u32) -> Result<&'a [u8]> {
        let (tag, size) = self.read_header()?;
        if tag != expected {
            return Err(Error::MissingChunk { expected, found: tag });
        }
        let payload = &self.data[self.offset..self.offset + size];
        self.offset += size;
        Ok(payload)
    }
}

impl<'a> Iterator for ChunkedReader<'a> {
    type Item = Result<(u32, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_empty() {
            return None;
        }
        match self.read_header() {
            Ok((tag, size)) => {
                let payload = &self.data[self.offset..self.offset + size];
                self.offset += size;
                Some(Ok((tag, payload)))
            }
            Err(e) => {
                // Poison the reader so a malformed tail yields exactly one error.
                self.offset = self.data.len();
                Some(Err(e))
            }
        }
    }
}

/// Builder for a chunk-framed buffer.
///
/// Chunks are emitted in `put` call order; nesting is achieved by encoding a
/// child writer and using its bytes as a parent payload.
#[derive(Default)]
pub struct ChunkedWriter {
    data: Vec<u8>,
}

impl ChunkedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far, headers included.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append one chunk with a raw payload.
    pub fn put_bytes(&mut self, tag: u32, payload: &[u8]) -> &mut Self {
        self.data.extend_from_slice(&tag.to_le_bytes());
        self.data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.data.extend_from_slice(payload);
        self
    }

    /// Append one chunk whose payload is a packed field stream.
    pub fn put(&mut self, tag: u32, payload: PackedWriter) -> &mut Self {
        self.put_bytes(tag, payload.as_bytes())
    }

    /// Append one chunk whose payload is itself a chunk sequence.
    pub fn put_chunked(&mut self, tag: u32, payload: ChunkedWriter) -> &mut Self {
        self.put_bytes(tag, &payload.data)
    }

    /// Consume the writer, returning the framed buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
