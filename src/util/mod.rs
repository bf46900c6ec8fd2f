//! Shared utility types.

mod error;

pub use error::{Error, Result};
