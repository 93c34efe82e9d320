//! Rendering Adapter: backend-agnostic cube scene.
//!
//! # Invariants
//! - Initialization is all-or-nothing: the first failing step aborts and no
//!   later graphics call is issued.
//! - The render tick reads interaction state, never writes it.
//! - Only the world uniform is written after startup.
//!
//! The [`RecordingBackend`] stands in for a GPU so the full startup sequence
//! and render loop can run headless.

mod backend;
mod recording;
mod scene;

pub use backend::{
    BufferHandle, BufferKind, ContextError, ContextProvider, FilterMode, FrameError, FramePass,
    ProgramHandle, RenderBackend, SamplerDesc, ShaderHandle, ShaderStage, TextureHandle,
    UniformLocation, VertexAttribute, VertexLayout, WrapMode,
};
pub use recording::{
    Command, CommandLog, InjectedFailure, ProgramInterface, RecordingBackend, RecordingProvider,
};
pub use scene::{
    ATTR_POSITION, ATTR_TEX_COORD, CubeScene, InitError, ProgramBindings, SceneAssets,
    SceneSettings, UNIFORM_PROJ, UNIFORM_VIEW, UNIFORM_WORLD,
};

pub fn crate_info() -> &'static str {
    "cubeview-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
