//! Compiled `.ogf` geometry format: chunk tables, export records and the
//! encoder.

pub mod fmt;
mod types;
mod write;

pub use types::{
    AxisLimit, Corner, ExportBone, ExportIkJoint, ExportMesh, ExportObject, Influences,
};
pub use write::write_ogf;
