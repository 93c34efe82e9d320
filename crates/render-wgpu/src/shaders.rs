/// Vertex stage of the textured cube: world, view and projection uniforms.
pub const CUBE_VERTEX_SHADER: &str = include_str!("../shaders/cube.vert.wgsl");

/// Fragment stage of the textured cube: samples one 2D texture.
pub const CUBE_FRAGMENT_SHADER: &str = include_str!("../shaders/cube.frag.wgsl");
