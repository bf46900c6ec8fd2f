//! OGF encoder.
//!
//! Compiles host-supplied geometry and bone records into the chunked `.ogf`
//! byte stream: bounding volumes, vertex deduplication, two-link weight
//! packing and byte-exact bone serialization.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use ordered_float::OrderedFloat;
use tracing::warn;

use crate::chunked::{ChunkedWriter, PackedWriter};
use crate::util::{Error, Result};

use super::fmt;
use super::types::{Corner, ExportBone, ExportMesh, ExportObject, Influences};

/// Axis-aligned bounding box as min/max corners.
fn bounding_box<'a>(corners: impl Iterator<Item = &'a Corner>) -> (Vec3, Vec3) {
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    let mut any = false;
    for corner in corners {
        min = min.min(corner.position);
        max = max.max(corner.position);
        any = true;
    }
    if !any {
        return (Vec3::ZERO, Vec3::ZERO);
    }
    (min, max)
}

/// Enclosing sphere of a bounding box: centered at the box center with the
/// radius reaching the minimum corner. A cheap enclosure, not a minimal one.
fn bounding_sphere(bbox: (Vec3, Vec3)) -> (Vec3, f32) {
    let center = (bbox.0 + bbox.1) / 2.0;
    (center, (bbox.0 - center).length())
}

fn put_header(cw: &mut ChunkedWriter, model_type: u8, bbox: (Vec3, Vec3)) {
    let (center, radius) = bounding_sphere(bbox);
    let mut pw = PackedWriter::new();
    pw.write_u8(fmt::FORMAT_VERSION);
    pw.write_u8(model_type);
    pw.write_u16(0); // shader id
    pw.write_vec3(bbox.0);
    pw.write_vec3(bbox.1);
    pw.write_vec3(center);
    pw.write_f32(radius);
    cw.put(fmt::HEADER, pw);
}

/// Deduplication key: the source vertex id plus the full attribute tuple,
/// compared bit-exactly.
type VertexKey = (
    u32,
    [OrderedFloat<f32>; 3],
    [OrderedFloat<f32>; 3],
    [OrderedFloat<f32>; 3],
    [OrderedFloat<f32>; 3],
    [OrderedFloat<f32>; 2],
);

fn vertex_key(c: &Corner) -> VertexKey {
    fn v3(v: Vec3) -> [OrderedFloat<f32>; 3] {
        [OrderedFloat(v.x), OrderedFloat(v.y), OrderedFloat(v.z)]
    }
    fn v2(v: Vec2) -> [OrderedFloat<f32>; 2] {
        [OrderedFloat(v.x), OrderedFloat(v.y)]
    }
    (
        c.source_vertex,
        v3(c.position),
        v3(c.normal),
        v3(c.tangent),
        v3(c.bitangent),
        v2(c.uv),
    )
}

/// Re-express the mesh's triangles as indices into a deduplicated vertex
/// list. First lookup or insertion per corner assigns output indices.
fn deduplicate(mesh: &ExportMesh) -> (Vec<Corner>, Vec<[u32; 3]>) {
    let mut map: HashMap<VertexKey, u32> = HashMap::new();
    let mut vertices = Vec::new();
    let mut triangles = Vec::with_capacity(mesh.faces.len());

    for face in &mesh.faces {
        let mut tri = [0u32; 3];
        for (slot, corner) in tri.iter_mut().zip(face.iter()) {
            *slot = *map.entry(vertex_key(corner)).or_insert_with(|| {
                vertices.push(*corner);
                (vertices.len() - 1) as u32
            });
        }
        triangles.push(tri);
    }
    (vertices, triangles)
}

/// Keep the two largest influences, largest first, preserving nothing else.
/// Lists of two or fewer come back in their original order.
fn two_largest(influences: &Influences) -> Influences {
    if influences.len() <= 2 {
        return influences.clone();
    }
    let first = influences
        .iter()
        .enumerate()
        .max_by(|a, b| a.1 .1.total_cmp(&b.1 .1))
        .map(|(i, _)| i)
        .unwrap();
    let second = influences
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != first)
        .max_by(|a, b| a.1 .1.total_cmp(&b.1 .1))
        .map(|(i, _)| i)
        .unwrap();
    let mut out = Influences::new();
    out.push(influences[first]);
    out.push(influences[second]);
    out
}

fn influences_for(mesh: &ExportMesh, vertex: &Corner) -> Result<Influences> {
    let list = mesh
        .weights
        .get(vertex.source_vertex as usize)
        .filter(|w| !w.is_empty())
        .ok_or(Error::EmptyWeights { vertex: vertex.source_vertex })?;
    Ok(list.clone())
}

fn put_vertices(cw: &mut ChunkedWriter, mesh: &ExportMesh, vertices: &[Corner]) -> Result<()> {
    let max_influences = mesh.max_influences();
    let mut pw = PackedWriter::new();

    if max_influences == 1 {
        // Compact rigid layout: one bone per vertex, no format header.
        for vertex in vertices {
            let influences = influences_for(mesh, vertex)?;
            pw.write_vec3(vertex.position);
            pw.write_vec3(vertex.normal);
            pw.write_vec3(vertex.tangent);
            pw.write_vec3(vertex.bitangent);
            pw.write_vec2(vertex.uv);
            pw.write_u32(u32::from(influences[0].0));
        }
    } else {
        if max_influences > 2 {
            warn!(max_influences, "more than two bone influences, keeping the two largest");
        }
        pw.write_u32(fmt::VERTEX_FORMAT_2L);
        pw.write_u32(vertices.len() as u32);
        for vertex in vertices {
            let influences = two_largest(&influences_for(mesh, vertex)?);
            let blend;
            if influences.len() == 2 {
                let (b0, w0) = influences[0];
                let (b1, w1) = influences[1];
                pw.write_u16(b0);
                pw.write_u16(b1);
                blend = 1.0 - w0 / (w0 + w1);
            } else {
                let (b0, _) = influences[0];
                pw.write_u16(b0);
                pw.write_u16(b0);
                blend = 0.0;
            }
            pw.write_vec3(vertex.position);
            pw.write_vec3(vertex.normal);
            pw.write_vec3(vertex.tangent);
            pw.write_vec3(vertex.bitangent);
            pw.write_f32(blend);
            pw.write_vec2(vertex.uv);
        }
    }
    cw.put(fmt::VERTICES, pw);
    Ok(())
}

fn put_indices(cw: &mut ChunkedWriter, vertex_count: usize, triangles: &[[u32; 3]]) {
    if vertex_count > usize::from(u16::MAX) {
        warn!(vertex_count, "vertex count exceeds the u16 index range");
    }
    let mut pw = PackedWriter::new();
    pw.write_u32(3 * triangles.len() as u32);
    for tri in triangles {
        for &index in tri {
            pw.write_u16(index as u16);
        }
    }
    cw.put(fmt::INDICES, pw);
}

fn write_child(mesh: &ExportMesh) -> Result<ChunkedWriter> {
    let mut cw = ChunkedWriter::new();
    put_header(
        &mut cw,
        fmt::MODEL_TYPE_SKELETON_GEOMDEF,
        bounding_box(mesh.faces.iter().flatten()),
    );

    let mut pw = PackedWriter::new();
    pw.write_string(&mesh.texture);
    pw.write_string(&mesh.shader);
    cw.put(fmt::TEXTURE, pw);

    let (vertices, triangles) = deduplicate(mesh);
    put_vertices(&mut cw, mesh, &vertices)?;
    put_indices(&mut cw, vertices.len(), &triangles);
    Ok(cw)
}

fn put_bone_names(cw: &mut ChunkedWriter, bones: &[ExportBone]) {
    let mut pw = PackedWriter::new();
    pw.write_u32(bones.len() as u32);
    for bone in bones {
        pw.write_string(&bone.name);
        pw.write_string(&bone.parent);
        pw.write_f32_slice(&bone.shape.box_rotation);
        pw.write_vec3(bone.shape.box_translation);
        pw.write_vec3(bone.shape.box_half_size);
    }
    cw.put(fmt::S_BONE_NAMES, pw);
}

fn put_ik_data(cw: &mut ChunkedWriter, bones: &[ExportBone]) {
    let mut pw = PackedWriter::new();
    for bone in bones {
        pw.write_u32(fmt::IKDATA_VERSION);
        pw.write_string(&bone.gamemtl);
        pw.write_u16(bone.shape.kind);
        pw.write_u16(bone.shape.flags);
        pw.write_f32_slice(&bone.shape.box_rotation);
        pw.write_vec3(bone.shape.box_translation);
        pw.write_vec3(bone.shape.box_half_size);
        pw.write_vec3(bone.shape.sphere_position);
        pw.write_f32(bone.shape.sphere_radius);
        pw.write_vec3(bone.shape.cylinder_position);
        pw.write_vec3(bone.shape.cylinder_direction);
        pw.write_f32(bone.shape.cylinder_height);
        pw.write_f32(bone.shape.cylinder_radius);
        pw.write_u32(bone.ik_joint.kind);
        for limit in &bone.ik_joint.limits {
            pw.write_f32(limit.min);
            pw.write_f32(limit.max);
            pw.write_f32(limit.spring);
            pw.write_f32(limit.damping);
        }
        pw.write_f32(bone.ik_joint.spring);
        pw.write_f32(bone.ik_joint.damping);
        pw.write_u32(bone.ik_flags);
        pw.write_f32(bone.break_force);
        pw.write_f32(bone.break_torque);
        pw.write_f32(bone.friction);
        pw.write_vec3(bone.rotation);
        pw.write_vec3(bone.position);
        pw.write_f32(bone.mass);
        pw.write_vec3(bone.mass_center);
    }
    cw.put(fmt::S_IKDATA, pw);
}

/// Encode a complete export unit into an `.ogf` byte stream.
pub fn write_ogf(object: &ExportObject) -> Result<Vec<u8>> {
    let mut cw = ChunkedWriter::new();
    put_header(
        &mut cw,
        fmt::MODEL_TYPE_SKELETON_ANIM,
        bounding_box(object.meshes.iter().flat_map(|m| m.faces.iter().flatten())),
    );

    let mut pw = PackedWriter::new();
    pw.write_string(&object.name);
    pw.write_string(&object.creator);
    pw.write_u32(0).write_u32(0).write_u32(0);
    cw.put(fmt::S_DESC, pw);

    let mut children = ChunkedWriter::new();
    for (index, mesh) in object.meshes.iter().enumerate() {
        children.put_chunked(index as u32, write_child(mesh)?);
    }
    cw.put_chunked(fmt::CHILDREN, children);

    put_bone_names(&mut cw, &object.bones);
    put_ik_data(&mut cw, &object.bones);

    let mut pw = PackedWriter::new();
    pw.write_string(&object.userdata);
    cw.put(fmt::S_USERDATA, pw);

    let mut pw = PackedWriter::new();
    pw.write_string(&object.motion_refs);
    cw.put(fmt::S_MOTION_REFS, pw);

    Ok(cw.into_vec())
}
