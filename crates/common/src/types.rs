use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default drawable surface width in pixels.
pub const DEFAULT_WIDTH: u32 = 800;
/// Default drawable surface height in pixels.
pub const DEFAULT_HEIGHT: u32 = 600;

/// Generate an identifier of the form `id-<uuid>`.
pub fn generate_id() -> String {
    format!("id-{}", Uuid::new_v4().simple())
}

/// One interleaved cube vertex: position followed by texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Byte stride between consecutive vertices.
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;
    /// Byte offset of the texture coordinate inside a vertex.
    pub const TEX_COORD_OFFSET: u64 = std::mem::size_of::<[f32; 3]>() as u64;

    pub const fn new(position: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            tex_coord,
        }
    }
}

/// Description of the drawable surface to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceDesc {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl SurfaceDesc {
    /// Build a description, falling back to a generated id and 800x600.
    pub fn new(id: Option<String>, width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            id: id.unwrap_or_else(generate_id),
            width: width.unwrap_or(DEFAULT_WIDTH),
            height: height.unwrap_or(DEFAULT_HEIGHT),
        }
    }

    /// Width over height. A zero height is treated as one pixel.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for SurfaceDesc {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 20);
        assert_eq!(Vertex::TEX_COORD_OFFSET, 12);
    }

    #[test]
    fn surface_defaults() {
        let s = SurfaceDesc::default();
        assert_eq!((s.width, s.height), (800, 600));
        assert!(s.id.starts_with("id-"));
        assert!((s.aspect() - 800.0 / 600.0).abs() < f32::EPSILON);
    }

    #[test]
    fn surface_keeps_supplied_values() {
        let s = SurfaceDesc::new(Some("viewer".into()), Some(1024), None);
        assert_eq!(s.id, "viewer");
        assert_eq!(s.width, 1024);
        assert_eq!(s.height, DEFAULT_HEIGHT);
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
