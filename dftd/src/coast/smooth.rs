use crate::grid::{MapPoint, RasterPoint};
use crate::types::{Pt2, Real};

/// Maximum degree of the smoothing spline.
pub const BSPLINE_SMOOTH_FACTOR: usize = 16;

/// Samples taken per control point when resampling the spline.
pub const BSPLINE_DETAIL: f64 = 4.0;

/// Clamped uniform B-spline curve.
///
/// The curve starts exactly at the first control point and ends exactly
/// at the last one.
#[derive(Clone, Debug)]
pub struct BSpline {
    degree: usize,
    control_points: Vec<Pt2>,
    knots: Vec<Real>,
}

impl BSpline {
    /// # Panics
    ///
    /// Panics if there are not more control points than `degree`.
    pub fn new(degree: usize, control_points: Vec<Pt2>) -> BSpline {
        assert!(
            control_points.len() > degree,
            "B-spline of degree {} needs more than {} control points",
            degree,
            control_points.len()
        );
        let m = control_points.len() - 1;
        let n = degree;
        let interior_spans = (m - n + 1) as Real;
        let mut knots = Vec::with_capacity(m + n + 2);
        for i in 0..(m + n + 2) {
            let knot = if i <= n {
                0.0
            } else if i > m {
                1.0
            } else {
                (i - n) as Real / interior_spans
            };
            knots.push(knot);
        }
        BSpline {
            degree,
            control_points,
            knots,
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn control_points(&self) -> &[Pt2] {
        &self.control_points
    }

    /// Evaluate the curve at `t` in `[0, 1]`, using de Boor's algorithm.
    pub fn value(&self, t: Real) -> Pt2 {
        let n = self.degree;
        let m = self.control_points.len() - 1;
        let t = t.max(0.0).min(1.0);

        // Find the knot span: knots[k] <= t < knots[k + 1], with `t == 1`
        // belonging to the last non-empty span.
        let mut k = n;
        while k < m && self.knots[k + 1] <= t {
            k += 1;
        }

        let mut d: Vec<Pt2> = (0..=n).map(|j| self.control_points[j + k - n]).collect();
        for r in 1..=n {
            for j in (r..=n).rev() {
                let left = self.knots[j + k - n];
                let right = self.knots[j + 1 + k - r];
                let alpha = if right > left { (t - left) / (right - left) } else { 0.0 };
                let (a, b) = (d[j - 1], d[j]);
                d[j] = Pt2::new(a.x * (1.0 - alpha) + b.x * alpha, a.y * (1.0 - alpha) + b.y * alpha);
            }
        }
        d[n]
    }
}

/// Turns traced raster contours into smooth curves in map-wide
/// segment-scaled coordinates.
pub struct CurveSmoother {
    /// Raster vertex to segment-scaled units.
    scale: Real,
}

impl CurveSmoother {
    pub fn new(scale: Real) -> CurveSmoother {
        CurveSmoother { scale }
    }

    /// Spline degree used for a contour with `len` control points.
    pub fn degree_for(len: usize) -> usize {
        BSPLINE_SMOOTH_FACTOR.min(len.saturating_sub(1)).min(len / 4)
    }

    /// Smooth `points` and resample them.
    ///
    /// A cyclic contour gets its first point repeated at the end so the
    /// curve closes. Consecutive samples that round to the same point are
    /// dropped.
    pub fn smooth(&self, points: &[RasterPoint], cyclic: bool) -> Vec<MapPoint> {
        if points.is_empty() {
            return Vec::new();
        }
        let mut control_points: Vec<Pt2> =
            points.iter().map(|p| Pt2::new(p.x as Real, p.y as Real)).collect();
        if cyclic {
            control_points.push(control_points[0]);
        }
        let len = control_points.len();
        let curve = BSpline::new(CurveSmoother::degree_for(len), control_points);

        // NOTE: Samples are uniform in the curve parameter, not arc length,
        // so density is uneven on small islands.
        let sample_count = ((len as Real * BSPLINE_DETAIL).ceil() as usize).max(2);
        let mut smoothed: Vec<MapPoint> = Vec::with_capacity(sample_count);
        for i in 0..sample_count {
            let v = curve.value(i as Real / (sample_count - 1) as Real);
            let p = MapPoint::new(
                (v.x * self.scale).round() as i64,
                (v.y * self.scale).round() as i64,
            );
            if smoothed.last() != Some(&p) {
                smoothed.push(p);
            }
        }
        smoothed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_curve_hits_end_points() {
        let points = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 2.0),
            Pt2::new(3.0, 3.0),
            Pt2::new(4.0, 0.0),
            Pt2::new(6.0, 1.0),
        ];
        let curve = BSpline::new(3, points.clone());
        assert_relative_eq!(points[0], curve.value(0.0));
        assert_relative_eq!(points[4], curve.value(1.0));
    }

    #[test]
    fn degree_one_interpolates_linearly() {
        let curve = BSpline::new(1, vec![Pt2::new(0.0, 0.0), Pt2::new(2.0, 0.0), Pt2::new(2.0, 2.0)]);
        assert_relative_eq!(Pt2::new(1.0, 0.0), curve.value(0.25));
        assert_relative_eq!(Pt2::new(2.0, 0.0), curve.value(0.5));
        assert_relative_eq!(Pt2::new(2.0, 1.0), curve.value(0.75));
    }

    #[test]
    fn degree_zero_samples_control_points() {
        let curve = BSpline::new(0, vec![Pt2::new(0.0, 0.0), Pt2::new(5.0, 5.0)]);
        assert_relative_eq!(Pt2::new(0.0, 0.0), curve.value(0.2));
        assert_relative_eq!(Pt2::new(5.0, 5.0), curve.value(0.8));
        assert_relative_eq!(Pt2::new(5.0, 5.0), curve.value(1.0));
    }

    #[test]
    fn curve_stays_in_control_hull() {
        let points: Vec<Pt2> = (0..20)
            .map(|i| Pt2::new(i as Real, if i % 2 == 0 { 0.0 } else { 3.0 }))
            .collect();
        let curve = BSpline::new(4, points);
        for i in 0..=100 {
            let v = curve.value(i as Real / 100.0);
            assert!(v.x > -1e-9 && v.x < 19.0 + 1e-9);
            assert!(v.y > -1e-9 && v.y < 3.0 + 1e-9);
        }
    }

    #[test]
    fn degree_is_bounded_for_small_contours() {
        assert_eq!(0, CurveSmoother::degree_for(2));
        assert_eq!(2, CurveSmoother::degree_for(9));
        assert_eq!(16, CurveSmoother::degree_for(1000));
    }

    #[test]
    fn smoothing_closes_cyclic_contours() {
        let square = vec![
            RasterPoint::new(1, 1),
            RasterPoint::new(2, 1),
            RasterPoint::new(3, 1),
            RasterPoint::new(3, 2),
            RasterPoint::new(3, 3),
            RasterPoint::new(2, 3),
            RasterPoint::new(1, 3),
            RasterPoint::new(1, 2),
        ];
        let smoothed = CurveSmoother::new(100.0).smooth(&square, true);
        assert_eq!(MapPoint::new(100, 100), smoothed[0]);
        assert_eq!(smoothed[0], *smoothed.last().unwrap());
        assert!(smoothed.len() > square.len());
        for pair in smoothed.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }
}
