//! # xray-formats
//!
//! Codec for the chunked binary asset formats of the X-Ray engine pipeline.
//!
//! Original formats developed by GSC Game World for the S.T.A.L.K.E.R.
//! series; this is an independent implementation aiming for byte-exact
//! compatibility with the layouts its tools read and write.
//!
//! ## Modules
//!
//! - [`util`] - Error types
//! - [`chunked`] - Chunk framing and the primitive field codec
//! - [`object`] - `.object` source format decoding (meshes, bones, surfaces)
//! - [`ogf`] - Compiled `.ogf` geometry encoding
//! - [`skls`] - `.skls` motion container indexing and random access
//!
//! ## Example
//!
//! ```ignore
//! use xray_formats::object::read_object;
//!
//! let data = std::fs::read("stalker.object")?;
//! let object = read_object(&data)?;
//!
//! for mesh in &object.meshes {
//!     println!("{}: {} faces", mesh.name, mesh.live_face_count());
//! }
//! ```

pub mod chunked;
pub mod object;
pub mod ogf;
pub mod skls;
pub mod util;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::chunked::{ChunkedReader, ChunkedWriter, PackedReader, PackedWriter};
    pub use crate::object::{read_object, Object};
    pub use crate::ogf::{write_ogf, ExportObject};
    pub use crate::skls::{MotionBodyLength, SklsFile};
    pub use crate::util::{Error, Result};
}
