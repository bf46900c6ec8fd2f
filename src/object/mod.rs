//! `.object` source format: chunk tables, decoded records and the decoder.

pub mod fmt;
mod read;
mod types;

pub use read::read_object;
pub use types::{
    bind_transforms, Bone, BoneShape, BreakParams, Edge, Face, IkJoint, Mass, Mesh, Object,
    Partition, Revision, Surface, Transform, UvEntry, UvMap, WeightMap,
};
