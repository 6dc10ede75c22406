//! Vertex data structures for voxel rendering.
//!
//! The mesh builder keeps positions, UVs and colours in separate streams because that
//! is what a renderer upload takes. `Vertex` is the interleaved form for renderers that
//! want a single buffer.

use cgmath::Point3;

/// A vertex in chunk-local space.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Color: [f32; 4] (16 bytes)
///
/// Total size: 36 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position relative to the chunk's world origin
    pub position: [f32; 3],
    /// UV texture coordinates into the atlas (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
    /// Per-vertex colour multiplier
    pub color: [f32; 4],
}

impl Vertex {
    /// Creates a new vertex with the given parameters.
    ///
    /// # Arguments
    /// * `pos` - The position of the vertex in chunk space
    /// * `tex_coords` - Atlas UV coordinate
    /// * `color` - RGBA tint
    ///
    /// # Returns
    /// A new `Vertex` instance
    pub fn new(pos: Point3<f32>, tex_coords: [f32; 2], color: [f32; 4]) -> Self {
        Vertex {
            position: [pos.x, pos.y, pos.z],
            tex_coords,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
        let vertices = [Vertex::new(Point3::new(1.0, 2.0, 3.0), [0.5, 0.25], [1.0; 4]); 2];
        let floats: &[f32] = bytemuck::cast_slice(&vertices);
        assert_eq!(floats.len(), 18);
        assert_eq!(&floats[..5], &[1.0, 2.0, 3.0, 0.5, 0.25]);
    }
}
