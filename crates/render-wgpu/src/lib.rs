//! wgpu render backend for the cube viewer.
//!
//! Maps the GL-style program model of `cubeview-render` onto wgpu: WGSL
//! stages are reflected with naga so attributes and uniforms can be looked
//! up by name, and each uniform lives in its own buffer binding.
//!
//! # Invariants
//! - Clip-space depth is zero-to-one; the scene builds its projection to match.
//! - Every shader module and pipeline is created inside a validation error
//!   scope, so failures come back as diagnostics instead of panics.

mod context;
mod gpu;
pub mod reflect;
mod shaders;

pub use context::WgpuContext;
pub use gpu::WgpuBackend;
pub use reflect::{ResourceKind, ShaderInterface, ShaderResource, StageVarying, reflect_source};
pub use shaders::{CUBE_FRAGMENT_SHADER, CUBE_VERTEX_SHADER};
