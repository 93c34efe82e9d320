//! Shared types for the cube viewer.
//!
//! # Invariants
//! - Mesh data is immutable once built; there is no re-upload path.
//! - `Vertex` is tightly packed: 3 position floats then 2 texture floats.

pub mod mesh;
pub mod types;

pub use mesh::CubeMesh;
pub use types::{SurfaceDesc, Vertex, generate_id};
