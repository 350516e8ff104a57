use super::{MapCanvas, MapVertex};
use crate::types::Pt2;

/// Canvas that only tallies what it is asked to draw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CountingCanvas {
    pub quads: usize,
    pub triangles: usize,
    pub line_strips: usize,
    pub line_points: usize,
}

impl MapCanvas for CountingCanvas {
    fn draw_quad(&mut self, _corners: &[MapVertex; 4]) {
        self.quads += 1;
    }

    fn draw_triangles(&mut self, vertices: &[MapVertex], indices: &[u32]) {
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        self.triangles += indices.len() / 3;
    }

    fn draw_line_strip(&mut self, points: &[Pt2]) {
        self.line_strips += 1;
        self.line_points += points.len();
    }
}
