use crate::types::Vertex;

/// The fixed textured cube: 4 vertices per face, 2 triangles per face.
///
/// Faces wind counter-clockwise when seen from outside the cube.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl CubeMesh {
    /// Build the 2x2x2 cube centred on the origin.
    pub fn textured() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            // Top
            Vertex::new([-1.0,  1.0, -1.0], [0.0, 0.0]),
            Vertex::new([-1.0,  1.0,  1.0], [0.0, 1.0]),
            Vertex::new([ 1.0,  1.0,  1.0], [1.0, 1.0]),
            Vertex::new([ 1.0,  1.0, -1.0], [1.0, 0.0]),
            // Left
            Vertex::new([-1.0,  1.0,  1.0], [0.0, 0.0]),
            Vertex::new([-1.0, -1.0,  1.0], [1.0, 0.0]),
            Vertex::new([-1.0, -1.0, -1.0], [1.0, 1.0]),
            Vertex::new([-1.0,  1.0, -1.0], [0.0, 1.0]),
            // Right
            Vertex::new([ 1.0,  1.0,  1.0], [1.0, 1.0]),
            Vertex::new([ 1.0, -1.0,  1.0], [0.0, 1.0]),
            Vertex::new([ 1.0, -1.0, -1.0], [0.0, 0.0]),
            Vertex::new([ 1.0,  1.0, -1.0], [1.0, 0.0]),
            // Front
            Vertex::new([ 1.0,  1.0,  1.0], [1.0, 1.0]),
            Vertex::new([ 1.0, -1.0,  1.0], [1.0, 0.0]),
            Vertex::new([-1.0, -1.0,  1.0], [0.0, 0.0]),
            Vertex::new([-1.0,  1.0,  1.0], [0.0, 1.0]),
            // Back
            Vertex::new([ 1.0,  1.0, -1.0], [0.0, 0.0]),
            Vertex::new([ 1.0, -1.0, -1.0], [0.0, 1.0]),
            Vertex::new([-1.0, -1.0, -1.0], [1.0, 1.0]),
            Vertex::new([-1.0,  1.0, -1.0], [1.0, 0.0]),
            // Bottom
            Vertex::new([-1.0, -1.0, -1.0], [1.0, 1.0]),
            Vertex::new([-1.0, -1.0,  1.0], [1.0, 0.0]),
            Vertex::new([ 1.0, -1.0,  1.0], [0.0, 0.0]),
            Vertex::new([ 1.0, -1.0, -1.0], [0.0, 1.0]),
        ];
        #[rustfmt::skip]
        let indices: Vec<u16> = vec![
            0, 1, 2,    0, 2, 3,    // Top
            5, 4, 6,    6, 4, 7,    // Left
            8, 9, 10,   8, 10, 11,  // Right
            13, 12, 14, 15, 14, 12, // Front
            16, 17, 18, 16, 18, 19, // Back
            21, 20, 22, 22, 20, 23, // Bottom
        ];
        Self { vertices, indices }
    }

    /// Number of indices covered by one draw call.
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_six_quads() {
        let mesh = CubeMesh::textured();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(mesh.vertex_bytes().len(), 24 * 20);
        assert_eq!(mesh.index_bytes().len(), 36 * 2);
    }

    #[test]
    fn indices_stay_in_range() {
        let mesh = CubeMesh::textured();
        let count = mesh.vertices.len();
        assert!(mesh.indices.iter().all(|&i| (i as usize) < count));
    }

    #[test]
    fn faces_wind_outward() {
        // Counter-clockwise seen from outside means the triangle normal
        // points away from the centre.
        let mesh = CubeMesh::textured();
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize].position);
            let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let ac = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let n = [
                ab[1] * ac[2] - ab[2] * ac[1],
                ab[2] * ac[0] - ab[0] * ac[2],
                ab[0] * ac[1] - ab[1] * ac[0],
            ];
            let centroid = [
                (a[0] + b[0] + c[0]) / 3.0,
                (a[1] + b[1] + c[1]) / 3.0,
                (a[2] + b[2] + c[2]) / 3.0,
            ];
            let dot = n[0] * centroid[0] + n[1] * centroid[1] + n[2] * centroid[2];
            assert!(dot > 0.0, "triangle {tri:?} winds inward");
        }
    }
}
