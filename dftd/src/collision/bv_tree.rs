use slog::Logger;

use super::BoundingSphere;
use crate::na;
use crate::types::*;

/// One triangle to build a tree over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafData {
    /// Index of the triangle in whatever mesh it came from.
    pub triangle: usize,
    pub vertices: [Pt3; 3],
}

impl LeafData {
    pub fn new(triangle: usize, vertices: [Pt3; 3]) -> LeafData {
        LeafData { triangle, vertices }
    }

    pub fn centroid(&self) -> Pt3 {
        let [a, b, c] = self.vertices;
        Pt3::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0, (a.z + b.z + c.z) / 3.0)
    }

    /// One leaf per triangle of an indexed triangle list.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range.
    pub fn from_mesh(vertices: &[Pt3], indices: &[u32]) -> Vec<LeafData> {
        indices
            .chunks(3)
            .filter(|tri| tri.len() == 3)
            .enumerate()
            .map(|(triangle, tri)| {
                LeafData::new(
                    triangle,
                    [
                        vertices[tri[0] as usize],
                        vertices[tri[1] as usize],
                        vertices[tri[2] as usize],
                    ],
                )
            })
            .collect()
    }
}

/// Counts work done by a collision query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionStats {
    pub sphere_tests: usize,
}

/// Bounding sphere tree over triangles.
///
/// Every node's sphere encloses all vertices of all triangles below it.
/// Spheres are only a conservative approximation of the triangles:
/// two leaves whose spheres touch are reported as colliding.
#[derive(Clone, Debug, PartialEq)]
pub enum BvTree {
    Leaf {
        volume: BoundingSphere,
        triangle: usize,
    },
    Node {
        volume: BoundingSphere,
        left: Box<BvTree>,
        right: Box<BvTree>,
    },
}

impl BvTree {
    /// Build a tree over `leaves`, or `None` if there are none.
    ///
    /// Each node's sphere is centered on the bounding box of its
    /// vertices, with the radius of the furthest vertex. Triangles are
    /// split by centroid across the middle of the box's longest axis.
    pub fn create(mut leaves: Vec<LeafData>) -> Option<BvTree> {
        if leaves.is_empty() {
            return None;
        }

        let first = leaves[0].vertices[0];
        let (mut min, mut max) = (first, first);
        for v in leaves.iter().flat_map(|leaf| leaf.vertices.iter()) {
            for i in 0..3 {
                min[i] = min[i].min(v[i]);
                max[i] = max[i].max(v[i]);
            }
        }
        let center = na::center(&min, &max);
        let radius = leaves
            .iter()
            .flat_map(|leaf| leaf.vertices.iter())
            .map(|v| na::distance(&center, v))
            .fold(0.0, Real::max);
        let volume = BoundingSphere::new(center, radius);

        if leaves.len() == 1 {
            return Some(BvTree::Leaf {
                volume,
                triangle: leaves[0].triangle,
            });
        }

        let extent = max - min;
        let axis = if extent.y > extent.x {
            if extent.z > extent.y {
                2
            } else {
                1
            }
        } else if extent.z > extent.x {
            2
        } else {
            0
        };
        let (mut left, mut right): (Vec<LeafData>, Vec<LeafData>) =
            leaves.drain(..).partition(|leaf| leaf.centroid()[axis] < center[axis]);
        if left.is_empty() || right.is_empty() {
            // All centroids on one side; split by list order instead.
            let mut full = if left.is_empty() { right } else { left };
            let second_half = full.split_off(full.len() / 2);
            left = full;
            right = second_half;
        }

        match (BvTree::create(left), BvTree::create(right)) {
            (Some(left), Some(right)) => Some(BvTree::Node {
                volume,
                left: Box::new(left),
                right: Box::new(right),
            }),
            _ => unreachable!("Both halves of a split have at least one leaf"),
        }
    }

    pub fn volume(&self) -> &BoundingSphere {
        match *self {
            BvTree::Leaf { ref volume, .. } => volume,
            BvTree::Node { ref volume, .. } => volume,
        }
    }

    pub fn is_leaf(&self) -> bool {
        match *self {
            BvTree::Leaf { .. } => true,
            BvTree::Node { .. } => false,
        }
    }

    pub fn children(&self) -> Option<(&BvTree, &BvTree)> {
        match *self {
            BvTree::Leaf { .. } => None,
            BvTree::Node {
                ref left, ref right, ..
            } => Some((&**left, &**right)),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self.children() {
            None => 1,
            Some((left, right)) => left.leaf_count() + right.leaf_count(),
        }
    }

    pub fn depth(&self) -> usize {
        match self.children() {
            None => 1,
            Some((left, right)) => 1 + left.depth().max(right.depth()),
        }
    }

    /// Whether `p` is inside some leaf's sphere.
    pub fn is_inside(&self, p: &Pt3) -> bool {
        if !self.volume().contains(p) {
            return false;
        }
        match self.children() {
            None => true,
            Some((left, right)) => left.is_inside(p) || right.is_inside(p),
        }
    }

    /// Whether any leaf of this tree touches any leaf of `other`.
    ///
    /// For every pair of touching leaves, the midpoint between
    /// their sphere centers is added to `contacts`.
    pub fn collides(&self, other: &BvTree, contacts: &mut Vec<Pt3>) -> bool {
        let mut stats = CollisionStats::default();
        self.collides_with_stats(other, contacts, &mut stats)
    }

    /// As `collides`, counting the sphere tests made into `stats`.
    pub fn collides_with_stats(&self, other: &BvTree, contacts: &mut Vec<Pt3>, stats: &mut CollisionStats) -> bool {
        stats.sphere_tests += 1;
        if !self.volume().intersects(other.volume()) {
            return false;
        }

        match (self.children(), other.children()) {
            (None, None) => {
                contacts.push(na::center(&self.volume().center, &other.volume().center));
                true
            }
            (None, Some((other_left, other_right))) => {
                // Visit both sides to collect every contact.
                let hit_left = other_left.collides_with_stats(self, contacts, stats);
                let hit_right = other_right.collides_with_stats(self, contacts, stats);
                hit_left || hit_right
            }
            (Some((left, right)), other_children) => {
                let descend_self = other_children.is_none() || self.volume().radius >= other.volume().radius;
                match other_children {
                    Some((other_left, other_right)) if !descend_self => {
                        let hit_left = other_left.collides_with_stats(self, contacts, stats);
                        let hit_right = other_right.collides_with_stats(self, contacts, stats);
                        hit_left || hit_right
                    }
                    _ => {
                        let hit_left = left.collides_with_stats(other, contacts, stats);
                        let hit_right = right.collides_with_stats(other, contacts, stats);
                        hit_left || hit_right
                    }
                }
            }
        }
    }

    /// As `collides`, with `other` moved by `other_transform` first.
    pub fn collides_transformed(&self, other: &BvTree, other_transform: &Mat4, contacts: &mut Vec<Pt3>) -> bool {
        let mut moved = other.clone();
        moved.transform(other_transform);
        self.collides(&moved, contacts)
    }

    /// Move every sphere by `mat`, which should be a rigid transform.
    pub fn transform(&mut self, mat: &Mat4) {
        match *self {
            BvTree::Leaf { ref mut volume, .. } => volume.transform(mat),
            BvTree::Node {
                ref mut volume,
                ref mut left,
                ref mut right,
            } => {
                volume.transform(mat);
                left.transform(mat);
                right.transform(mat);
            }
        }
    }

    /// Box enclosing every sphere in the tree.
    pub fn compute_min_max(&self) -> (Pt3, Pt3) {
        let c = self.volume().center;
        let (mut min, mut max) = (c, c);
        self.extend_min_max(&mut min, &mut max);
        (min, max)
    }

    fn extend_min_max(&self, min: &mut Pt3, max: &mut Pt3) {
        self.volume().extend_min_max(min, max);
        if let Some((left, right)) = self.children() {
            left.extend_min_max(min, max);
            right.extend_min_max(min, max);
        }
    }

    /// Log the tree's spheres, one line per node.
    pub fn debug_dump(&self, log: &Logger) {
        self.debug_dump_level(log, 0);
    }

    fn debug_dump_level(&self, log: &Logger, level: usize) {
        let volume = self.volume();
        debug!(log, "BV tree node";
            "level" => level,
            "center" => format!("{:?}", volume.center.coords.as_slice()),
            "radius" => volume.radius);
        if let Some((left, right)) = self.children() {
            left.debug_dump_level(log, level + 1);
            right.debug_dump_level(log, level + 1);
        }
    }
}
