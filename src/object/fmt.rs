//! Chunk identifiers and version words of the `.object` format.

/// Top-level and object-body chunk ids.
pub mod object {
    pub const MAIN: u32 = 0x7777;
    pub const VERSION: u32 = 0x0900;
    pub const FLAGS: u32 = 0x0903;
    pub const SURFACES: u32 = 0x0905;
    pub const SURFACES1: u32 = 0x0906;
    pub const SURFACES2: u32 = 0x0907;
    pub const MESHES: u32 = 0x0910;
    pub const REVISION: u32 = 0x0911;
    pub const USERDATA: u32 = 0x0912;
    pub const BONES: u32 = 0x0913;
    pub const MOTIONS: u32 = 0x0916;
    pub const MOTION_REFS: u32 = 0x0917;
    pub const LOD_REF: u32 = 0x0918;
    pub const PARTITIONS0: u32 = 0x0919;
    pub const TRANSFORM: u32 = 0x0920;
    pub const BONES1: u32 = 0x0921;
    pub const PARTITIONS1: u32 = 0x0923;

    /// The only supported object body version.
    pub const SUPPORTED_VERSION: u16 = 0x10;
}

/// Mesh sub-chunk ids.
pub mod mesh {
    pub const VERSION: u32 = 0x1000;
    pub const MESHNAME: u32 = 0x1001;
    pub const FLAGS: u32 = 0x1002;
    pub const BBOX: u32 = 0x1004;
    pub const VERTS: u32 = 0x1005;
    pub const FACES: u32 = 0x1006;
    pub const VMREFS: u32 = 0x1008;
    pub const SFACE: u32 = 0x1009;
    pub const OPTIONS: u32 = 0x1010;
    pub const VMAPS2: u32 = 0x1012;
    pub const SG: u32 = 0x1013;

    /// The only supported mesh version.
    pub const SUPPORTED_VERSION: u16 = 0x11;
}

/// Bone sub-chunk ids.
pub mod bone {
    pub const VERSION: u32 = 0x0001;
    pub const DEF: u32 = 0x0002;
    pub const BIND_POSE: u32 = 0x0003;
    pub const MATERIAL: u32 = 0x0004;
    pub const SHAPE: u32 = 0x0005;
    pub const IK_JOINT: u32 = 0x0006;
    pub const MASS_PARAMS: u32 = 0x0007;
    pub const IK_FLAGS: u32 = 0x0008;
    pub const BREAK_PARAMS: u32 = 0x0009;
    pub const FRICTION: u32 = 0x0010;

    /// The only supported bone version.
    pub const SUPPORTED_VERSION: u16 = 0x2;
}
