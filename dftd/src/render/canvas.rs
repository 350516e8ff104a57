use crate::types::Pt2;

/// A vertex of the chart: where it is in real coordinates, and where
/// it samples the map texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapVertex {
    pub position: Pt2,
    pub texc: Pt2,
}

impl MapVertex {
    pub fn new(position: Pt2, texc: Pt2) -> MapVertex {
        MapVertex { position, texc }
    }
}

/// Whatever the map is being drawn onto.
///
/// The map only issues geometry; projection, zoom and colouring
/// are up to the implementation.
pub trait MapCanvas {
    /// A textured quad, corners counterclockwise from the bottom left.
    fn draw_quad(&mut self, corners: &[MapVertex; 4]);

    /// An indexed triangle list.
    fn draw_triangles(&mut self, vertices: &[MapVertex], indices: &[u32]);

    fn draw_line_strip(&mut self, points: &[Pt2]);
}
