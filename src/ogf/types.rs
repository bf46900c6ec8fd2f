//! Input records of the OGF encoder.
//!
//! The host supplies pre-triangulated geometry as per-corner attribute
//! tuples plus per-source-vertex bone influences; the encoder owns
//! deduplication and weight packing.

use glam::{Vec2, Vec3};
use smallvec::SmallVec;

use crate::object::BoneShape;

/// Bone influences of one source vertex, in a deterministic encounter
/// order. `(bone index, weight)` pairs.
pub type Influences = SmallVec<[(u16, f32); 4]>;

/// One corner of a triangle, carrying the full attribute tuple.
///
/// `source_vertex` is part of the deduplication identity: corners that agree
/// on every geometric attribute but come from different source vertices stay
/// distinct in the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    pub source_vertex: u32,
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub uv: Vec2,
}

/// One mesh to compile: triangles of corners plus its surface binding.
#[derive(Debug, Default, Clone)]
pub struct ExportMesh {
    pub texture: String,
    pub shader: String,
    pub faces: Vec<[Corner; 3]>,
    /// Influence list per source vertex, indexed by `Corner::source_vertex`.
    pub weights: Vec<Influences>,
}

/// Per-axis IK limit of an exported bone.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AxisLimit {
    pub min: f32,
    pub max: f32,
    pub spring: f32,
    pub damping: f32,
}

/// IK joint parameters in the compiled per-axis layout.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExportIkJoint {
    pub kind: u32,
    /// X, Y, Z axis limits, in that serialization order.
    pub limits: [AxisLimit; 3],
    pub spring: f32,
    pub damping: f32,
}

/// One bone to compile. Fields are serialized byte-for-byte; the encoder
/// performs no interpretation.
#[derive(Debug, Default, Clone)]
pub struct ExportBone {
    pub name: String,
    /// Empty for root bones.
    pub parent: String,
    pub gamemtl: String,
    pub shape: BoneShape,
    pub ik_joint: ExportIkJoint,
    pub ik_flags: u32,
    pub break_force: f32,
    pub break_torque: f32,
    pub friction: f32,
    pub rotation: Vec3,
    pub position: Vec3,
    pub mass: f32,
    pub mass_center: Vec3,
}

/// A complete export unit: one root with child meshes and an armature.
#[derive(Debug, Default, Clone)]
pub struct ExportObject {
    pub name: String,
    /// Creator tool string written into the description chunk.
    pub creator: String,
    pub userdata: String,
    pub motion_refs: String,
    pub meshes: Vec<ExportMesh>,
    pub bones: Vec<ExportBone>,
}

impl ExportMesh {
    /// Largest influence count on any source vertex of this mesh.
    pub fn max_influences(&self) -> usize {
        self.weights.iter().map(|w| w.len()).max().unwrap_or(0)
    }
}
