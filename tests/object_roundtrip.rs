//! End-to-end tests: synthesize `.object` buffers with the chunk writer,
//! decode them, and feed decoded geometry back through the OGF encoder.

use glam::{Vec2, Vec3};
use smallvec::smallvec;

use xray_formats::chunked::{ChunkedReader, ChunkedWriter, PackedReader, PackedWriter};
use xray_formats::object::{self, fmt, read_object};
use xray_formats::ogf::{self, write_ogf, Corner, ExportMesh, ExportObject, Influences};

fn version_chunk(version: u16) -> PackedWriter {
    let mut pw = PackedWriter::new();
    pw.write_u16(version);
    pw
}

/// A cube-less minimal object: one two-triangle mesh, one surface, two bones.
fn build_object_file() -> Vec<u8> {
    let mut mesh = ChunkedWriter::new();
    mesh.put(fmt::mesh::VERSION, version_chunk(fmt::mesh::SUPPORTED_VERSION));

    let mut pw = PackedWriter::new();
    pw.write_string("body");
    mesh.put(fmt::mesh::MESHNAME, pw);

    let mut pw = PackedWriter::new();
    pw.write_u32(4);
    for v in [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ] {
        pw.write_vec3(v);
    }
    mesh.put(fmt::mesh::VERTS, pw);

    let mut pw = PackedWriter::new();
    pw.write_u32(2);
    for verts in [[0u32, 1, 2], [0, 2, 3]] {
        for &v in &verts {
            pw.write_u32(v);
            pw.write_u32(v); // vmap-ref index
        }
    }
    mesh.put(fmt::mesh::FACES, pw);

    let mut pw = PackedWriter::new();
    pw.write_u32(8).write_u32(16);
    mesh.put(fmt::mesh::SG, pw);

    let mut pw = PackedWriter::new();
    pw.write_u16(1);
    pw.write_string("wood");
    pw.write_u32(2);
    pw.write_u32(0).write_u32(1);
    mesh.put(fmt::mesh::SFACE, pw);

    let mut pw = PackedWriter::new();
    pw.write_u32(2);
    // Connected UV map over all four vertices.
    pw.write_string("uvs");
    pw.write_u8(2).write_u8(0).write_u8(0);
    pw.write_u32(4);
    for uv in [[0.0f32, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
        pw.write_f32(uv[0]).write_f32(uv[1]);
    }
    for vi in 0u32..4 {
        pw.write_u32(vi);
    }
    // Weight map for the second bone over the top edge.
    pw.write_string("spine");
    pw.write_u8(1).write_u8(0).write_u8(1);
    pw.write_u32(2);
    pw.write_f32(1.0).write_f32(1.0);
    pw.write_u32(2).write_u32(3);
    mesh.put(fmt::mesh::VMAPS2, pw);

    let mut bones = ChunkedWriter::new();
    for (i, (name, parent)) in [("root", ""), ("spine", "root")].iter().enumerate() {
        let mut bone = ChunkedWriter::new();
        bone.put(fmt::bone::VERSION, version_chunk(fmt::bone::SUPPORTED_VERSION));
        let mut pw = PackedWriter::new();
        pw.write_string(name).write_string(parent).write_string(name);
        bone.put(fmt::bone::DEF, pw);
        let mut pw = PackedWriter::new();
        pw.write_vec3(Vec3::new(0.0, 0.4 * i as f32, 0.0));
        pw.write_vec3(Vec3::ZERO);
        pw.write_f32(0.4);
        bone.put(fmt::bone::BIND_POSE, pw);
        bones.put_chunked(i as u32, bone);
    }

    let mut main = ChunkedWriter::new();
    main.put(fmt::object::VERSION, version_chunk(fmt::object::SUPPORTED_VERSION));
    let mut meshes = ChunkedWriter::new();
    meshes.put_chunked(0, mesh);
    main.put_chunked(fmt::object::MESHES, meshes);
    main.put_chunked(fmt::object::BONES1, bones);

    let mut pw = PackedWriter::new();
    pw.write_u32(1);
    pw.write_string("wood")
        .write_string("models\\model")
        .write_string("default")
        .write_string("default_object")
        .write_string("props\\crate")
        .write_string("uvs");
    pw.write_u32(0).write_u32(0x112).write_u32(1);
    main.put(fmt::object::SURFACES2, pw);

    let mut root = ChunkedWriter::new();
    root.put_chunked(fmt::object::MAIN, main);
    root.into_vec()
}

#[test]
fn decode_synthesized_object() {
    let object = read_object(&build_object_file()).unwrap();

    assert_eq!(object.meshes.len(), 1);
    let mesh = &object.meshes[0];
    assert_eq!(mesh.name, "body");
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.live_face_count(), 2);
    // The two triangles disagree on smoothing group across their shared edge.
    assert_eq!(mesh.seams, vec![object::Edge(0, 2)]);
    assert_eq!(mesh.surface_faces, vec![("wood".to_string(), vec![0, 1])]);
    assert_eq!(mesh.uv_maps[0].entries.len(), 4);
    assert_eq!(mesh.uv_maps[0].entries[2].uv, Vec2::new(1.0, 0.0)); // flipped
    assert_eq!(mesh.weight_maps[0].bone, "spine");

    assert_eq!(object.bones.len(), 2);
    assert_eq!(object.surfaces[0].texture, "props\\crate");

    let transforms = object.bind_transforms().unwrap();
    let spine_head = transforms[1].transform_point3(Vec3::ZERO);
    assert!((spine_head - Vec3::new(0.0, 0.4, 0.0)).length() < 1e-6);
}

/// Rebuild OGF export input from a decoded object and check the compiled
/// stream decodes back into consistent chunks.
#[test]
fn decoded_object_compiles_to_ogf() {
    let object = read_object(&build_object_file()).unwrap();
    let mesh = &object.meshes[0];
    let surface = &object.surfaces[0];

    // Per-vertex UVs from the connected map; bone 0 unless the weight map
    // claims the vertex for bone 1.
    let mut uvs = vec![Vec2::ZERO; mesh.vertices.len()];
    for entry in &mesh.uv_maps[0].entries {
        uvs[entry.vertex as usize] = entry.uv;
    }
    let mut weights: Vec<Influences> = vec![smallvec![(0u16, 1.0f32)]; mesh.vertices.len()];
    for &(vertex, weight) in &mesh.weight_maps[0].entries {
        weights[vertex as usize] = smallvec![(1u16, weight)];
    }

    let faces = mesh
        .faces
        .iter()
        .flatten()
        .map(|face| {
            face.verts.map(|vi| Corner {
                source_vertex: vi,
                position: mesh.vertices[vi as usize],
                normal: Vec3::Z,
                tangent: Vec3::X,
                bitangent: Vec3::Y,
                uv: uvs[vi as usize],
            })
        })
        .collect();

    let export = ExportObject {
        name: "crate".to_string(),
        creator: "tests".to_string(),
        userdata: String::new(),
        motion_refs: String::new(),
        meshes: vec![ExportMesh {
            texture: surface.texture.clone(),
            shader: surface.eshader.clone(),
            faces,
            weights,
        }],
        bones: object
            .bones
            .iter()
            .map(|b| ogf::ExportBone {
                name: b.name.clone(),
                parent: b.parent.clone(),
                gamemtl: b.gamemtl.clone(),
                position: b.offset,
                rotation: b.rotation,
                ..ogf::ExportBone::default()
            })
            .collect(),
    };

    let compiled = write_ogf(&export).unwrap();
    let top: Vec<(u32, Vec<u8>)> = ChunkedReader::new(&compiled)
        .map(|c| c.map(|(t, p)| (t, p.to_vec())))
        .collect::<xray_formats::Result<_>>()
        .unwrap();

    assert_eq!(top[0].0, ogf::fmt::HEADER);
    let mut pr = PackedReader::new(&top[0].1);
    assert_eq!(pr.read_u8().unwrap(), ogf::fmt::FORMAT_VERSION);
    assert_eq!(pr.read_u8().unwrap(), ogf::fmt::MODEL_TYPE_SKELETON_ANIM);
    pr.skip(2).unwrap();
    assert_eq!(pr.read_vec3().unwrap(), Vec3::ZERO);
    assert_eq!(pr.read_vec3().unwrap(), Vec3::new(1.0, 1.0, 0.0));

    let children: Vec<(u32, Vec<u8>)> = ChunkedReader::new(&top[2].1)
        .map(|c| c.map(|(t, p)| (t, p.to_vec())))
        .collect::<xray_formats::Result<_>>()
        .unwrap();
    assert_eq!(children.len(), 1);

    let child: Vec<(u32, Vec<u8>)> = ChunkedReader::new(&children[0].1)
        .map(|c| c.map(|(t, p)| (t, p.to_vec())))
        .collect::<xray_formats::Result<_>>()
        .unwrap();

    // TEXTURE carries the surface binding through unchanged.
    let mut pr = PackedReader::new(&child[1].1);
    assert_eq!(pr.read_string().unwrap(), "props\\crate");
    assert_eq!(pr.read_string().unwrap(), "models\\model");

    // Mixed 1/1-influence vertices still pack as the two-link layout only
    // when some vertex has two influences; here every vertex has one, so the
    // compact layout applies: 4 dedup vertices * 60 bytes.
    assert_eq!(child[2].0, ogf::fmt::VERTICES);
    assert_eq!(child[2].1.len(), 4 * 60);

    // 2 triangles * 3 u16 indices + u32 count.
    assert_eq!(child[3].0, ogf::fmt::INDICES);
    assert_eq!(child[3].1.len(), 4 + 12);
}
