use crate::na;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Pt3,
    pub radius: Real,
}

impl BoundingSphere {
    pub fn new(center: Pt3, radius: Real) -> BoundingSphere {
        BoundingSphere { center, radius }
    }

    /// Touching counts as intersecting.
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let reach = self.radius + other.radius;
        na::distance_squared(&self.center, &other.center) <= reach * reach
    }

    pub fn contains(&self, p: &Pt3) -> bool {
        na::distance_squared(&self.center, p) <= self.radius * self.radius
    }

    /// Move the center by an affine transform. The radius is kept,
    /// so `mat` shouldn't scale.
    pub fn transform(&mut self, mat: &Mat4) {
        let h = mat * self.center.to_homogeneous();
        self.center = Pt3::new(h.x, h.y, h.z);
    }

    /// Grow the box `min..max` to include this sphere.
    pub fn extend_min_max(&self, min: &mut Pt3, max: &mut Pt3) {
        for i in 0..3 {
            min[i] = min[i].min(self.center[i] - self.radius);
            max[i] = max[i].max(self.center[i] + self.radius);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_spheres_intersect() {
        let a = BoundingSphere::new(Pt3::origin(), 1.0);
        let b = BoundingSphere::new(Pt3::new(2.0, 0.0, 0.0), 1.0);
        let c = BoundingSphere::new(Pt3::new(2.0, 0.1, 0.0), 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn transform_moves_center_only() {
        let mut sphere = BoundingSphere::new(Pt3::new(1.0, 2.0, 3.0), 0.5);
        sphere.transform(&Mat4::new_translation(&Vec3::new(10.0, 0.0, -3.0)));
        assert_relative_eq!(Pt3::new(11.0, 2.0, 0.0), sphere.center);
        assert_relative_eq!(0.5, sphere.radius);
    }
}
