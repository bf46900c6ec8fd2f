//! Motion container index for `.skls` files.
//!
//! A container holds a count-prefixed sequence of named animation clips and
//! can reach multiple gigabytes, so opening one must not decode any clip.
//! [`SklsFile`] keeps the whole byte buffer for its lifetime and builds an
//! offset index by skipping clip bodies, so a clip can later be decoded on
//! demand by repositioning a reader at its recorded offset.
//!
//! Measuring a clip body without decoding it depends on the keyframe layout,
//! which lives outside this crate; the [`MotionBodyLength`] trait is that
//! seam.

use std::collections::HashMap;
#[cfg(feature = "mmap")]
use std::fs::File;
#[cfg(feature = "mmap")]
use std::path::Path;

use tracing::debug;

use crate::chunked::PackedReader;
use crate::util::{Error, Result};

/// External skip-length calculator.
///
/// `body` starts at a clip's keyframe body, immediately after the clip name;
/// the returned length spans the whole body up to the next clip header
/// (the frame-range pair included). The value must be exact: under- or
/// over-skipping corrupts every subsequent index entry.
pub trait MotionBodyLength {
    fn body_len(&self, body: &[u8]) -> Result<u64>;
}

impl<F> MotionBodyLength for F
where
    F: Fn(&[u8]) -> Result<u64>,
{
    fn body_len(&self, body: &[u8]) -> Result<u64> {
        self(body)
    }
}

/// Index entry for one clip. Immutable once the container is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEntry {
    /// Byte offset of the clip (start of its name) in the container buffer.
    pub offset: u64,
    /// `end_frame - start_frame` from the clip header.
    pub frames: u32,
}

#[derive(Debug)]
enum SklsBuf {
    Owned(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mapped(memmap2::Mmap),
}

impl SklsBuf {
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Owned(v) => v,
            #[cfg(feature = "mmap")]
            Self::Mapped(m) => m,
        }
    }
}

/// An opened motion container: the source buffer plus its clip index.
///
/// The buffer is held for the whole lifetime of the handle so recorded
/// offsets stay valid; dropping the handle releases it.
#[derive(Debug)]
pub struct SklsFile {
    buf: SklsBuf,
    entries: HashMap<String, MotionEntry>,
    names: Vec<String>,
}

impl SklsFile {
    /// Open a container by memory-mapping the file.
    #[cfg(feature = "mmap")]
    pub fn open(path: impl AsRef<Path>, calc: &dyn MotionBodyLength) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        // Safety: mapped read-only; the handle owns the map for its lifetime.
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| Error::MmapFailed(e.to_string()))?;
        Self::build(SklsBuf::Mapped(mmap), calc)
    }

    /// Open a container over an in-memory buffer.
    pub fn from_bytes(data: Vec<u8>, calc: &dyn MotionBodyLength) -> Result<Self> {
        Self::build(SklsBuf::Owned(data), calc)
    }

    fn build(buf: SklsBuf, calc: &dyn MotionBodyLength) -> Result<Self> {
        let (entries, names) = Self::index(buf.bytes(), calc)?;
        Ok(Self { buf, entries, names })
    }

    /// Build the clip index in one pass, skipping clip bodies instead of
    /// decoding them; work is proportional to the clip count.
    fn index(
        data: &[u8],
        calc: &dyn MotionBodyLength,
    ) -> Result<(HashMap<String, MotionEntry>, Vec<String>)> {
        let mut pr = PackedReader::new(data);
        let count = pr.read_u32()?;
        // Smallest possible clip: an empty name plus the frame-range pair.
        let cap = pr.capacity_hint(count as usize, 9);
        let mut entries = HashMap::with_capacity(cap);
        let mut names = Vec::with_capacity(cap);

        for _ in 0..count {
            let offset = pr.offset();
            let name = pr.read_string()?;
            let body_offset = pr.offset();
            let start_frame = pr.read_u32()?;
            let end_frame = pr.read_u32()?;
            let entry = MotionEntry {
                offset: offset as u64,
                frames: end_frame.wrapping_sub(start_frame),
            };
            debug!(name = %name, offset, frames = entry.frames, "indexed clip");
            if entries.insert(name.clone(), entry).is_some() {
                return Err(Error::DuplicateClipName(name));
            }
            names.push(name);

            pr.set_offset(body_offset);
            let body_len = calc.body_len(pr.rest())?;
            pr.skip(body_len as usize)?;
        }
        Ok((entries, names))
    }

    /// Number of indexed clips.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Clip names in file order.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The full index.
    #[inline]
    pub fn entries(&self) -> &HashMap<String, MotionEntry> {
        &self.entries
    }

    /// Look up one clip.
    pub fn entry(&self, name: &str) -> Option<MotionEntry> {
        self.entries.get(name).copied()
    }

    /// A reader positioned at the named clip, ready for a full per-clip
    /// decode. Independent of any previous access: re-reading or reading out
    /// of file order yields an identical view.
    pub fn clip_reader(&self, name: &str) -> Result<PackedReader<'_>> {
        let entry = self
            .entry(name)
            .ok_or_else(|| Error::ClipNotFound(name.to_string()))?;
        let mut pr = PackedReader::new(self.buf.bytes());
        pr.set_offset(entry.offset as usize);
        Ok(pr)
    }
}
