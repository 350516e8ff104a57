use crate::types::{Pt2, Real};

/// Splits a simple polygon into triangles.
pub trait Triangulator {
    /// Triangulate the polygon with the given outline, returning indices
    /// into `points`, three per triangle, each triangle counterclockwise.
    ///
    /// Either winding is accepted. Polygons with fewer than three
    /// points yield nothing.
    fn compute(&self, points: &[Pt2]) -> Vec<u32>;
}

/// Twice the signed area of a polygon; positive if counterclockwise.
pub fn signed_area2(points: &[Pt2]) -> Real {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum()
}

fn cross(a: Pt2, b: Pt2, c: Pt2) -> Real {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn in_triangle(p: Pt2, a: Pt2, b: Pt2, c: Pt2) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

/// Plain ear clipping. Quadratic, but segment polygons are small.
#[derive(Clone, Copy, Debug, Default)]
pub struct EarClipping;

impl EarClipping {
    fn is_ear(points: &[Pt2], remaining: &[usize], ia: usize, ib: usize, ic: usize) -> bool {
        let (a, b, c) = (points[ia], points[ib], points[ic]);
        if cross(a, b, c) <= 0.0 {
            return false;
        }
        remaining.iter().all(|&j| {
            let p = points[j];
            j == ia || j == ib || j == ic || p == a || p == b || p == c || !in_triangle(p, a, b, c)
        })
    }
}

impl Triangulator for EarClipping {
    fn compute(&self, points: &[Pt2]) -> Vec<u32> {
        let n = points.len();
        if n < 3 {
            return Vec::new();
        }
        let mut remaining: Vec<usize> = if signed_area2(points) >= 0.0 {
            (0..n).collect()
        } else {
            (0..n).rev().collect()
        };

        let mut indices = Vec::with_capacity(3 * (n - 2));
        let mut i = 0;
        let mut misses = 0;
        while remaining.len() > 3 {
            let m = remaining.len();
            let (ia, ib, ic) = (remaining[(i + m - 1) % m], remaining[i], remaining[(i + 1) % m]);
            if EarClipping::is_ear(points, &remaining, ia, ib, ic) {
                indices.extend_from_slice(&[ia as u32, ib as u32, ic as u32]);
                remaining.remove(i);
                misses = 0;
            } else {
                misses += 1;
                if misses > m {
                    // No ear left. Drop a flat vertex if there is one;
                    // otherwise the outline intersects itself and we give up.
                    let flat = (0..m).find(|&k| {
                        let (a, b, c) = (
                            points[remaining[(k + m - 1) % m]],
                            points[remaining[k]],
                            points[remaining[(k + 1) % m]],
                        );
                        cross(a, b, c).abs() <= Real::EPSILON
                    });
                    match flat {
                        Some(k) => {
                            remaining.remove(k);
                            misses = 0;
                        }
                        None => return indices,
                    }
                } else {
                    i += 1;
                }
            }
            if i >= remaining.len() {
                i = 0;
            }
        }

        let (ia, ib, ic) = (remaining[0], remaining[1], remaining[2]);
        if cross(points[ia], points[ib], points[ic]) > 0.0 {
            indices.extend_from_slice(&[ia as u32, ib as u32, ic as u32]);
        }
        indices
    }
}
