//! Chunk identifiers and layout constants of the compiled `.ogf` format.

pub const HEADER: u32 = 0x1;
pub const TEXTURE: u32 = 0x2;
pub const VERTICES: u32 = 0x3;
pub const INDICES: u32 = 0x4;
pub const CHILDREN: u32 = 0x9;
pub const S_BONE_NAMES: u32 = 0xd;
pub const S_IKDATA: u32 = 0x10;
pub const S_USERDATA: u32 = 0x11;
pub const S_DESC: u32 = 0x12;
pub const S_MOTION_REFS: u32 = 0x13;

/// Format version written into every header chunk.
pub const FORMAT_VERSION: u8 = 4;

/// Model type of the root object (animated skeleton).
pub const MODEL_TYPE_SKELETON_ANIM: u8 = 3;
/// Model type of a child mesh (skinned geometry definition).
pub const MODEL_TYPE_SKELETON_GEOMDEF: u8 = 5;

/// Vertex-format id of the two-link skinned vertex layout.
pub const VERTEX_FORMAT_2L: u32 = 0x240e3300;

/// Version word of each per-bone IK data record.
pub const IKDATA_VERSION: u32 = 0x1;
