//! Decoded `.object` records.
//!
//! These are flat data records: the decoder fills them from chunk payloads
//! and the host builds whatever native representation it needs from them.

use std::collections::HashMap;

use glam::{EulerRot, Mat4, Vec2, Vec3};
use tracing::warn;

use crate::util::{Error, Result};

/// A fully decoded `.object` file.
#[derive(Debug, Default)]
pub struct Object {
    pub flags: u32,
    pub meshes: Vec<Mesh>,
    pub surfaces: Vec<Surface>,
    pub bones: Vec<Bone>,
    pub transform: Option<Transform>,
    pub userdata: String,
    pub lod_ref: String,
    pub motion_refs: String,
    pub revision: Option<Revision>,
    pub partitions: Vec<Partition>,
}

impl Object {
    /// Index of the bone with the given name.
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Bind transforms for all bones, in bone order. See [`bind_transforms`].
    pub fn bind_transforms(&self) -> Result<Vec<Mat4>> {
        bind_transforms(&self.bones)
    }
}

/// One triangle, referencing mesh vertices by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Position indices of the three corners.
    pub verts: [u32; 3],
    /// Vmap-ref indices of the three corners (interleaved in the face
    /// chunk; carried through for per-corner attribute chunks).
    pub refs: [u32; 3],
}

/// An undirected edge, stored with the smaller vertex index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge(pub u32, pub u32);

impl Edge {
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

/// One decoded mesh.
///
/// `faces` keeps a slot per face in file order; a slot is `None` when the
/// face was degenerate or a duplicate. Everything that references faces by
/// index has already been filtered against those null slots.
#[derive(Debug, Default)]
pub struct Mesh {
    pub name: String,
    pub flags: u8,
    pub options: [u32; 2],
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Option<Face>>,
    /// Per-face smooth flag, parallel to `faces` (always false for null slots).
    pub smooth_faces: Vec<bool>,
    /// Edges where two incident faces disagree on smoothing group.
    pub seams: Vec<Edge>,
    /// Surface (material) name to the faces it covers.
    pub surface_faces: Vec<(String, Vec<u32>)>,
    pub uv_maps: Vec<UvMap>,
    pub weight_maps: Vec<WeightMap>,
}

impl Mesh {
    /// Number of non-null faces.
    pub fn live_face_count(&self) -> usize {
        self.faces.iter().filter(|f| f.is_some()).count()
    }
}

/// One UV value of a [`UvMap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvEntry {
    pub vertex: u32,
    /// Set for disconnected maps: the value only applies to this vertex's
    /// corner on this face.
    pub face: Option<u32>,
    /// UV coordinate, V already flipped to `1 - v`.
    pub uv: Vec2,
}

/// A named UV map.
#[derive(Debug, Default)]
pub struct UvMap {
    pub name: String,
    pub dimension: u8,
    pub entries: Vec<UvEntry>,
}

/// A named vertex-weight map; the name is the bone it drives.
///
/// Disconnected weight maps are decoded and retained, but their per-corner
/// values have no defined application; consumers should only apply maps with
/// `disconnected == false`.
#[derive(Debug, Default)]
pub struct WeightMap {
    pub bone: String,
    pub disconnected: bool,
    /// `(vertex index, weight)` pairs.
    pub entries: Vec<(u32, f32)>,
}

/// A surface (material binding) record. The texture path is passed through
/// verbatim; resolving it against a content root is the host's job.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Surface {
    pub name: String,
    pub eshader: String,
    pub cshader: String,
    pub gamemtl: String,
    pub texture: String,
    pub vmap: String,
    pub flags: u32,
    pub fvf: u32,
    pub tc_count: u32,
}

/// Collision shape parameters of a bone.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BoneShape {
    pub kind: u16,
    pub flags: u16,
    pub box_rotation: [f32; 9],
    pub box_translation: Vec3,
    pub box_half_size: Vec3,
    pub sphere_position: Vec3,
    pub sphere_radius: f32,
    pub cylinder_position: Vec3,
    pub cylinder_direction: Vec3,
    pub cylinder_height: f32,
    pub cylinder_radius: f32,
}

/// IK joint parameters of a bone.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IkJoint {
    pub kind: u32,
    pub limits: Vec3,
    pub limit_spring: f32,
    pub limit_damping: f32,
    pub spring: f32,
    pub damping: f32,
}

/// Mass parameters of a bone.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Mass {
    pub value: f32,
    pub center: Vec3,
}

/// Breaking thresholds of a bone.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BreakParams {
    pub force: f32,
    pub torque: f32,
}

/// One decoded bone: identity, bind pose and flat physical properties.
/// Parent references are by name; resolve with [`Object::bone_index`].
#[derive(Debug, Default)]
pub struct Bone {
    pub name: String,
    /// Empty for root bones.
    pub parent: String,
    pub vmap_name: String,
    pub offset: Vec3,
    /// Euler angles, applied Z then X then Y.
    pub rotation: Vec3,
    pub length: f32,
    pub gamemtl: String,
    pub shape: BoneShape,
    pub ik_joint: IkJoint,
    pub mass: Mass,
    pub ik_flags: u32,
    pub break_params: BreakParams,
    pub friction: f32,
}

/// Rotation matrix for bind-pose Euler angles: Z applied first, then X,
/// then Y.
pub(crate) fn euler_zxy(rotation: Vec3) -> Mat4 {
    Mat4::from_euler(EulerRot::YXZ, rotation.y, rotation.x, rotation.z)
}

/// Compute bind transforms for a flat bone list, in bone order.
///
/// Each bone's transform is
/// `parent_bind ∘ Translation(offset) ∘ EulerZXY(rotation)`; root bones use
/// identity as the incoming transform. A parent name that resolves to no
/// bone warns and is treated as a root; a parent cycle fails with
/// `BoneCycle`.
pub fn bind_transforms(bones: &[Bone]) -> Result<Vec<Mat4>> {
    let index: HashMap<&str, usize> =
        bones.iter().enumerate().map(|(i, b)| (b.name.as_str(), i)).collect();

    let mut out: Vec<Option<Mat4>> = vec![None; bones.len()];
    for i in 0..bones.len() {
        resolve(bones, &index, i, &mut out, &mut Vec::new())?;
    }
    Ok(out.into_iter().map(|m| m.unwrap_or(Mat4::IDENTITY)).collect())
}

fn resolve(
    bones: &[Bone],
    index: &HashMap<&str, usize>,
    i: usize,
    out: &mut Vec<Option<Mat4>>,
    stack: &mut Vec<usize>,
) -> Result<Mat4> {
    if let Some(m) = out[i] {
        return Ok(m);
    }
    if stack.contains(&i) {
        return Err(Error::BoneCycle(bones[i].name.clone()));
    }
    stack.push(i);

    let bone = &bones[i];
    let parent = if bone.parent.is_empty() {
        Mat4::IDENTITY
    } else {
        match index.get(bone.parent.as_str()) {
            Some(&p) => resolve(bones, index, p, out, stack)?,
            None => {
                warn!(bone = %bone.name, parent = %bone.parent, "parent bone not found, treating as root");
                Mat4::IDENTITY
            }
        }
    };

    stack.pop();
    let m = parent * Mat4::from_translation(bone.offset) * euler_zxy(bone.rotation);
    out[i] = Some(m);
    Ok(m)
}

/// Object placement stored in the TRANSFORM chunk, kept raw.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
}

/// Edit history stored in the REVISION chunk.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Revision {
    pub owner: String,
    pub created: u32,
    pub modifier: String,
    pub modified: u32,
}

/// A named bone group.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Partition {
    pub name: String,
    pub bones: Vec<String>,
}
