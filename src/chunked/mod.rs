//! Low-level binary layer shared by every format in the crate.
//!
//! Two pieces: the primitive field codec ([`PackedReader`]/[`PackedWriter`])
//! and the recursive chunk framer ([`ChunkedReader`]/[`ChunkedWriter`]).
//! Higher layers compose them: a chunk payload is either a packed field
//! stream or another chunk sequence.

mod chunks;
mod packed;

pub use chunks::{ChunkedReader, ChunkedWriter};
pub use packed::{PackedReader, PackedWriter};
