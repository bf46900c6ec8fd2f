//! Primitive field codec.
//!
//! [`PackedReader`] walks a borrowed byte buffer with a cursor, decoding
//! fixed-width little-endian primitives, null-terminated strings and
//! variable-length integers. [`PackedWriter`] mirrors every read operation
//! byte-exactly, building an owned buffer.

use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Vec2, Vec3};

use crate::util::{Error, Result};

/// Cursor-based reader over an in-memory byte buffer.
#[derive(Clone)]
pub struct PackedReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> PackedReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current cursor position.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Reposition the cursor. Positions past the end fail on the next read,
    /// not here, matching plain cursor semantics.
    #[inline]
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Number of bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow everything from the cursor to the end of the buffer.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.offset.min(self.data.len())..]
    }

    /// Allocation hint for a count-prefixed sequence of elements at least
    /// `stride` bytes wide: never more than the remaining bytes can hold,
    /// so a corrupt count cannot drive an oversized reservation.
    #[inline]
    pub fn capacity_hint(&self, count: usize, stride: usize) -> usize {
        count.min(self.remaining() / stride.max(1))
    }

    /// Advance the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(Error::truncated(self.offset));
        }
        self.offset += n;
        Ok(())
    }

    /// Take `n` raw bytes, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::truncated(self.offset));
        }
        let out = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let b = self.read_bytes(1)?;
        Ok(b[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let b = self.read_bytes(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_vec2(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    /// Read `N` consecutive f32 values.
    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        let mut out = [0.0f32; N];
        for v in out.iter_mut() {
            *v = self.read_f32()?;
        }
        Ok(out)
    }

    /// Read a null-terminated UTF-8 string; the terminator is consumed but
    /// excluded from the result. Fails with `TruncatedData` if the buffer
    /// ends before a terminator.
    pub fn read_string(&mut self) -> Result<String> {
        let rest = self.rest();
        let end = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::truncated(self.offset))?;
        let s = String::from_utf8(rest[..end].to_vec())?;
        self.offset += end + 1;
        Ok(s)
    }

    /// Read a variable-length integer: 7 bits per byte, low groups first,
    /// high bit set on every byte except the last.
    pub fn read_varint(&mut self) -> Result<u64> {
        let start = self.offset;
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= 64 {
                return Err(Error::MalformedVarint { offset: start });
            }
        }
    }
}

/// Write-side mirror of [`PackedReader`], building a `Vec<u8>`.
#[derive(Default)]
pub struct PackedWriter {
    data: Vec<u8>,
}

impl PackedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View of the accumulated bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the writer, returning the accumulated bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    pub fn write_u16(&mut self, value: u16) -> &mut Self {
        // Vec<u8> as io::Write cannot fail
        self.data.write_u16::<LittleEndian>(value).unwrap();
        self
    }

    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.data.write_u32::<LittleEndian>(value).unwrap();
        self
    }

    pub fn write_f32(&mut self, value: f32) -> &mut Self {
        self.data.write_f32::<LittleEndian>(value).unwrap();
        self
    }

    pub fn write_vec2(&mut self, value: Vec2) -> &mut Self {
        self.write_f32(value.x).write_f32(value.y)
    }

    pub fn write_vec3(&mut self, value: Vec3) -> &mut Self {
        self.write_f32(value.x).write_f32(value.y).write_f32(value.z)
    }

    pub fn write_f32_slice(&mut self, values: &[f32]) -> &mut Self {
        for &v in values {
            self.write_f32(v);
        }
        self
    }

    /// Write a string followed by a null terminator.
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self
    }

    /// Write a variable-length integer, mirror of `read_varint`.
    pub fn write_varint(&mut self, mut value: u64) -> &mut Self {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.data.push(byte);
                return self;
            }
            self.data.push(byte | 0x80);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_round_trip() {
        let mut pw = PackedWriter::new();
        pw.write_u8(0xab)
            .write_u16(0x1234)
            .write_u32(0xdead_beef)
            .write_f32(1.5)
            .write_vec3(Vec3::new(1.0, -2.0, 3.5))
            .write_vec2(Vec2::new(0.25, 0.75));
        let buf = pw.into_vec();

        let mut pr = PackedReader::new(&buf);
        assert_eq!(pr.read_u8().unwrap(), 0xab);
        assert_eq!(pr.read_u16().unwrap(), 0x1234);
        assert_eq!(pr.read_u32().unwrap(), 0xdead_beef);
        assert_eq!(pr.read_f32().unwrap(), 1.5);
        assert_eq!(pr.read_vec3().unwrap(), Vec3::new(1.0, -2.0, 3.5));
        assert_eq!(pr.read_vec2().unwrap(), Vec2::new(0.25, 0.75));
        assert!(pr.is_empty());
    }

    #[test]
    fn test_truncated_primitive() {
        let buf = [0u8; 3];
        let mut pr = PackedReader::new(&buf);
        assert!(matches!(
            pr.read_u32(),
            Err(Error::TruncatedData { offset: 0 })
        ));
    }

    #[test]
    fn test_string_round_trip() {
        let mut pw = PackedWriter::new();
        pw.write_string("abc").write_string("");
        let buf = pw.into_vec();
        assert_eq!(buf, b"abc\0\0");

        let mut pr = PackedReader::new(&buf);
        assert_eq!(pr.read_string().unwrap(), "abc");
        assert_eq!(pr.read_string().unwrap(), "");
        assert!(pr.is_empty());
    }

    #[test]
    fn test_string_without_terminator() {
        let mut pr = PackedReader::new(b"ab\0cde");
        assert_eq!(pr.read_string().unwrap(), "ab");
        // Error reports the cursor position where the string began.
        assert!(matches!(
            pr.read_string(),
            Err(Error::TruncatedData { offset: 3 })
        ));
    }

    #[test]
    fn test_overlong_varint() {
        // Continuation bit set on every byte: never terminates within 64 bits.
        let buf = [0xffu8; 10];
        let mut pr = PackedReader::new(&buf);
        assert!(matches!(
            pr.read_varint(),
            Err(Error::MalformedVarint { offset: 0 })
        ));
    }

    #[test]
    fn test_capacity_hint_clamps_to_remaining() {
        let buf = [0u8; 24];
        let mut pr = PackedReader::new(&buf);
        assert_eq!(pr.capacity_hint(2, 12), 2);
        assert_eq!(pr.capacity_hint(u32::MAX as usize, 12), 2);
        pr.skip(12).unwrap();
        assert_eq!(pr.capacity_hint(u32::MAX as usize, 12), 1);
        assert_eq!(pr.capacity_hint(5, 0), 5); // stride floor
    }

    #[test]
    fn test_varint_round_trip() {
        for value in [0u64, 1, 127, 128, 300, 0xffff, u64::from(u32::MAX), u64::MAX] {
            let mut pw = PackedWriter::new();
            pw.write_varint(value);
            let buf = pw.into_vec();
            let mut pr = PackedReader::new(&buf);
            assert_eq!(pr.read_varint().unwrap(), value, "value {value}");
            assert!(pr.is_empty());
        }
    }

    #[test]
    fn test_varint_encoding() {
        let mut pw = PackedWriter::new();
        pw.write_varint(300);
        // 300 = 0b10_0101100 -> 0xac 0x02
        assert_eq!(pw.into_vec(), vec![0xac, 0x02]);
    }

    #[test]
    fn test_cursor_seek_and_skip() {
        let buf: Vec<u8> = (0..16).collect();
        let mut pr = PackedReader::new(&buf);
        pr.skip(4).unwrap();
        assert_eq!(pr.offset(), 4);
        assert_eq!(pr.read_u8().unwrap(), 4);
        pr.set_offset(12);
        assert_eq!(pr.remaining(), 4);
        assert!(pr.skip(5).is_err());
        assert_eq!(pr.rest(), &buf[12..]);
    }
}
