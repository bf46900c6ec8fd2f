//! `.object` decoder.
//!
//! Walks the chunk tree and fills the flat records in [`super::types`].
//! Unknown chunk tags are reported at warn level and skipped; recognized
//! tags with an unexpected version word are fatal for that record.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use tracing::{debug, warn};

use crate::chunked::{ChunkedReader, PackedReader};
use crate::util::{Error, Result};

use super::fmt;
use super::types::{
    Bone, BreakParams, Edge, Face, Mass, Mesh, Object, Partition, Revision, Surface, Transform,
    UvEntry, UvMap, WeightMap,
};

/// Decode a whole `.object` buffer.
///
/// The buffer must contain a MAIN chunk at the top level; any other
/// top-level tag is skipped with a warning.
pub fn read_object(data: &[u8]) -> Result<Object> {
    let mut object = None;
    for chunk in ChunkedReader::new(data) {
        let (tag, payload) = chunk?;
        match tag {
            fmt::object::MAIN => object = Some(read_main(payload)?),
            _ => warn!(tag = format_args!("{tag:#x}"), "unknown chunk in root"),
        }
    }
    object.ok_or(Error::MissingChunk { expected: fmt::object::MAIN, found: 0 })
}

fn read_main(data: &[u8]) -> Result<Object> {
    let mut cr = ChunkedReader::new(data);
    let version = PackedReader::new(cr.expect(fmt::object::VERSION)?).read_u16()?;
    if version != fmt::object::SUPPORTED_VERSION {
        return Err(Error::UnsupportedVersion { what: "object", found: version });
    }

    let mut object = Object::default();
    for chunk in cr {
        let (tag, payload) = chunk?;
        match tag {
            fmt::object::MESHES => {
                for mesh_chunk in ChunkedReader::new(payload) {
                    let (_, mesh_data) = mesh_chunk?;
                    object.meshes.push(read_mesh(mesh_data)?);
                }
            }
            fmt::object::SURFACES2 => object.surfaces = read_surfaces(payload)?,
            fmt::object::BONES1 => {
                for bone_chunk in ChunkedReader::new(payload) {
                    let (_, bone_data) = bone_chunk?;
                    object.bones.push(read_bone(bone_data)?);
                }
            }
            fmt::object::TRANSFORM => {
                let mut pr = PackedReader::new(payload);
                object.transform = Some(Transform {
                    position: pr.read_vec3()?,
                    rotation: pr.read_vec3()?,
                });
            }
            fmt::object::FLAGS => object.flags = PackedReader::new(payload).read_u32()?,
            fmt::object::USERDATA => {
                object.userdata = PackedReader::new(payload).read_string()?;
            }
            fmt::object::LOD_REF => {
                object.lod_ref = PackedReader::new(payload).read_string()?;
            }
            fmt::object::REVISION => {
                let mut pr = PackedReader::new(payload);
                object.revision = Some(Revision {
                    owner: pr.read_string()?,
                    created: pr.read_u32()?,
                    modifier: pr.read_string()?,
                    modified: pr.read_u32()?,
                });
            }
            fmt::object::PARTITIONS1 => object.partitions = read_partitions(payload)?,
            fmt::object::MOTION_REFS => {
                object.motion_refs = PackedReader::new(payload).read_string()?;
            }
            fmt::object::SURFACES
            | fmt::object::SURFACES1
            | fmt::object::BONES
            | fmt::object::MOTIONS
            | fmt::object::PARTITIONS0 => {
                warn!(tag = format_args!("{tag:#x}"), "legacy chunk revision skipped");
            }
            _ => warn!(tag = format_args!("{tag:#x}"), "unknown chunk in main"),
        }
    }
    Ok(object)
}

fn read_mesh(data: &[u8]) -> Result<Mesh> {
    let mut cr = ChunkedReader::new(data);
    let version = PackedReader::new(cr.expect(fmt::mesh::VERSION)?).read_u16()?;
    if version != fmt::mesh::SUPPORTED_VERSION {
        return Err(Error::UnsupportedVersion { what: "mesh", found: version });
    }

    let mut mesh = Mesh::default();
    for chunk in cr {
        let (tag, payload) = chunk?;
        match tag {
            fmt::mesh::VERTS => {
                let mut pr = PackedReader::new(payload);
                let count = pr.read_u32()?;
                mesh.vertices.reserve(pr.capacity_hint(count as usize, 12));
                for _ in 0..count {
                    mesh.vertices.push(pr.read_vec3()?);
                }
            }
            fmt::mesh::FACES => read_faces(payload, &mut mesh)?,
            fmt::mesh::MESHNAME => mesh.name = PackedReader::new(payload).read_string()?,
            fmt::mesh::SG => read_smoothing_groups(payload, &mut mesh)?,
            fmt::mesh::SFACE => read_surface_faces(payload, &mut mesh)?,
            fmt::mesh::VMAPS2 => read_vmaps(payload, &mut mesh)?,
            fmt::mesh::FLAGS => mesh.flags = PackedReader::new(payload).read_u8()?,
            fmt::mesh::OPTIONS => {
                let mut pr = PackedReader::new(payload);
                mesh.options = [pr.read_u32()?, pr.read_u32()?];
            }
            // The bounding box is derived data; consumers recompute it.
            fmt::mesh::BBOX => {}
            // Vmap references duplicate what the vmaps themselves carry.
            fmt::mesh::VMREFS => {}
            _ => warn!(tag = format_args!("{tag:#x}"), "unknown chunk in mesh"),
        }
    }
    Ok(mesh)
}

/// Read the face list. Each face is six u32 values: three position indices
/// interleaved with three vmap-ref indices. A face that is out of range,
/// repeats a vertex or duplicates an earlier face gets a null slot instead
/// of failing the mesh.
fn read_faces(payload: &[u8], mesh: &mut Mesh) -> Result<()> {
    let mut pr = PackedReader::new(payload);
    let count = pr.read_u32()?;
    let vertex_count = mesh.vertices.len() as u32;
    let cap = pr.capacity_hint(count as usize, 24);
    let mut seen = HashSet::with_capacity(cap);

    mesh.faces.reserve(cap);
    for fi in 0..count {
        let raw: [u32; 6] = [
            pr.read_u32()?,
            pr.read_u32()?,
            pr.read_u32()?,
            pr.read_u32()?,
            pr.read_u32()?,
            pr.read_u32()?,
        ];
        let verts = [raw[0], raw[2], raw[4]];
        let refs = [raw[1], raw[3], raw[5]];

        let degenerate = verts[0] == verts[1] || verts[1] == verts[2] || verts[0] == verts[2];
        let out_of_range = verts.iter().any(|&v| v >= vertex_count);
        let mut key = verts;
        key.sort_unstable();
        let duplicate = !seen.insert(key);

        if degenerate || out_of_range || duplicate {
            debug!(face = fi, "rejected face");
            mesh.faces.push(None);
        } else {
            mesh.faces.push(Some(Face { verts, refs }));
        }
    }
    Ok(())
}

/// Apply the smoothing-group chunk: one group id per face, in face order.
///
/// Single pass: each non-null face is marked smooth and records its group
/// on each of its edges; a later face recording a different group on an
/// already-recorded edge marks that edge a seam and overwrites the record.
fn read_smoothing_groups(payload: &[u8], mesh: &mut Mesh) -> Result<()> {
    let mut pr = PackedReader::new(payload);
    mesh.smooth_faces = vec![false; mesh.faces.len()];
    let mut edge_groups: HashMap<Edge, u32> = HashMap::new();
    let mut seams: HashSet<Edge> = HashSet::new();

    for fi in 0..payload.len() / 4 {
        let group = pr.read_u32()?;
        let face = match mesh.faces.get(fi) {
            Some(Some(face)) => face,
            Some(None) => {
                debug!(face = fi, "skip null face");
                continue;
            }
            None => {
                warn!(face = fi, "smoothing group for out-of-range face");
                continue;
            }
        };
        mesh.smooth_faces[fi] = true;
        for corner in 0..3 {
            let edge = Edge::new(face.verts[corner], face.verts[(corner + 1) % 3]);
            match edge_groups.get(&edge) {
                None => {
                    edge_groups.insert(edge, group);
                }
                Some(&recorded) if recorded != group => {
                    edge_groups.insert(edge, group);
                    seams.insert(edge);
                }
                Some(_) => {}
            }
        }
    }

    mesh.seams = seams.into_iter().collect();
    mesh.seams.sort_unstable();
    Ok(())
}

fn read_surface_faces(payload: &[u8], mesh: &mut Mesh) -> Result<()> {
    let mut pr = PackedReader::new(payload);
    let surface_count = pr.read_u16()?;
    for _ in 0..surface_count {
        let name = pr.read_string()?;
        let count = pr.read_u32()?;
        let mut faces = Vec::with_capacity(pr.capacity_hint(count as usize, 4));
        for _ in 0..count {
            let fi = pr.read_u32()?;
            match mesh.faces.get(fi as usize) {
                Some(Some(_)) => faces.push(fi),
                _ => debug!(face = fi, "skip null face"),
            }
        }
        mesh.surface_faces.push((name, faces));
    }
    Ok(())
}

/// Vmap type discriminator values (low two bits of the type byte).
const VMAP_TYPE_UV: u8 = 0;
const VMAP_TYPE_WEIGHT: u8 = 1;

fn read_vmaps(payload: &[u8], mesh: &mut Mesh) -> Result<()> {
    let mut pr = PackedReader::new(payload);
    let count = pr.read_u32()?;
    for _ in 0..count {
        let name = pr.read_string()?;
        let dimension = pr.read_u8()?;
        let disconnected = pr.read_u8()? != 0;
        let kind = pr.read_u8()? & 0x3;
        let size = pr.read_u32()? as usize;

        match kind {
            VMAP_TYPE_UV => {
                let cap = pr.capacity_hint(size, 8);
                let mut uvs = Vec::with_capacity(cap);
                for _ in 0..size {
                    let uv = pr.read_vec2()?;
                    // Stored image-space; flip V to the consumer convention.
                    uvs.push(Vec2::new(uv.x, 1.0 - uv.y));
                }
                let mut vertices = Vec::with_capacity(cap);
                for _ in 0..size {
                    vertices.push(pr.read_u32()?);
                }

                let mut map = UvMap { name, dimension, entries: Vec::with_capacity(cap) };
                if disconnected {
                    for i in 0..size {
                        let face = pr.read_u32()?;
                        match mesh.faces.get(face as usize) {
                            Some(Some(_)) => map.entries.push(UvEntry {
                                vertex: vertices[i],
                                face: Some(face),
                                uv: uvs[i],
                            }),
                            _ => debug!(face, "skip null face"),
                        }
                    }
                } else {
                    for i in 0..size {
                        map.entries.push(UvEntry { vertex: vertices[i], face: None, uv: uvs[i] });
                    }
                }
                mesh.uv_maps.push(map);
            }
            VMAP_TYPE_WEIGHT => {
                let cap = pr.capacity_hint(size, 4);
                let mut weights = Vec::with_capacity(cap);
                for _ in 0..size {
                    weights.push(pr.read_f32()?);
                }
                let mut entries = Vec::with_capacity(cap);
                for &w in &weights {
                    entries.push((pr.read_u32()?, w));
                }
                if disconnected {
                    // Per-corner weights have no defined application; the
                    // face keys are consumed but not attached to entries.
                    pr.skip(size * 4)?;
                    warn!(bone = %name, "disconnected weight map retained but not applied");
                }
                mesh.weight_maps.push(WeightMap { bone: name, disconnected, entries });
            }
            other => return Err(Error::UnknownVmapType(other)),
        }
    }
    Ok(())
}

fn read_surfaces(payload: &[u8]) -> Result<Vec<Surface>> {
    let mut pr = PackedReader::new(payload);
    let count = pr.read_u32()?;
    // Smallest possible surface record: six empty strings plus three u32s.
    let mut surfaces = Vec::with_capacity(pr.capacity_hint(count as usize, 18));
    for _ in 0..count {
        surfaces.push(Surface {
            name: pr.read_string()?,
            eshader: pr.read_string()?,
            cshader: pr.read_string()?,
            gamemtl: pr.read_string()?,
            texture: pr.read_string()?,
            vmap: pr.read_string()?,
            flags: pr.read_u32()?,
            fvf: pr.read_u32()?,
            tc_count: pr.read_u32()?,
        });
    }
    Ok(surfaces)
}

fn read_partitions(payload: &[u8]) -> Result<Vec<Partition>> {
    let mut pr = PackedReader::new(payload);
    let count = pr.read_u32()?;
    let mut partitions = Vec::with_capacity(pr.capacity_hint(count as usize, 5));
    for _ in 0..count {
        let name = pr.read_string()?;
        let bone_count = pr.read_u32()?;
        let mut bones = Vec::with_capacity(pr.capacity_hint(bone_count as usize, 1));
        for _ in 0..bone_count {
            bones.push(pr.read_string()?);
        }
        partitions.push(Partition { name, bones });
    }
    Ok(partitions)
}

fn read_bone(data: &[u8]) -> Result<Bone> {
    let mut cr = ChunkedReader::new(data);
    let version = PackedReader::new(cr.expect(fmt::bone::VERSION)?).read_u16()?;
    if version != fmt::bone::SUPPORTED_VERSION {
        return Err(Error::UnsupportedVersion { what: "bone", found: version });
    }

    let mut pr = PackedReader::new(cr.expect(fmt::bone::DEF)?);
    let mut bone = Bone {
        name: pr.read_string()?,
        parent: pr.read_string()?,
        vmap_name: pr.read_string()?,
        ..Bone::default()
    };
    if bone.name != bone.vmap_name {
        warn!(name = %bone.name, vmap = %bone.vmap_name, "bone name differs from its vmap name");
    }

    let mut pr = PackedReader::new(cr.expect(fmt::bone::BIND_POSE)?);
    bone.offset = pr.read_vec3()?;
    bone.rotation = pr.read_vec3()?;
    bone.length = pr.read_f32()?;

    for chunk in cr {
        let (tag, payload) = chunk?;
        let mut pr = PackedReader::new(payload);
        match tag {
            fmt::bone::DEF => {
                let echo = pr.read_string()?;
                if echo != bone.name {
                    warn!(name = %bone.name, echo = %echo, "bone def chunk repeats a different name");
                }
            }
            fmt::bone::MATERIAL => bone.gamemtl = pr.read_string()?,
            fmt::bone::SHAPE => {
                bone.shape.kind = pr.read_u16()?;
                bone.shape.flags = pr.read_u16()?;
                bone.shape.box_rotation = pr.read_f32_array()?;
                bone.shape.box_translation = pr.read_vec3()?;
                bone.shape.box_half_size = pr.read_vec3()?;
                bone.shape.sphere_position = pr.read_vec3()?;
                bone.shape.sphere_radius = pr.read_f32()?;
                bone.shape.cylinder_position = pr.read_vec3()?;
                bone.shape.cylinder_direction = pr.read_vec3()?;
                bone.shape.cylinder_height = pr.read_f32()?;
                bone.shape.cylinder_radius = pr.read_f32()?;
            }
            fmt::bone::IK_JOINT => {
                bone.ik_joint.kind = pr.read_u32()?;
                bone.ik_joint.limits = pr.read_vec3()?;
                bone.ik_joint.limit_spring = pr.read_f32()?;
                bone.ik_joint.limit_damping = pr.read_f32()?;
                bone.ik_joint.spring = pr.read_f32()?;
                bone.ik_joint.damping = pr.read_f32()?;
            }
            fmt::bone::MASS_PARAMS => {
                bone.mass = Mass { value: pr.read_f32()?, center: pr.read_vec3()? };
            }
            fmt::bone::IK_FLAGS => bone.ik_flags = pr.read_u32()?,
            fmt::bone::BREAK_PARAMS => {
                bone.break_params = BreakParams { force: pr.read_f32()?, torque: pr.read_f32()? };
            }
            fmt::bone::FRICTION => bone.friction = pr.read_f32()?,
            _ => warn!(tag = format_args!("{tag:#x}"), "unknown chunk in bone"),
        }
    }
    Ok(bone)
}
