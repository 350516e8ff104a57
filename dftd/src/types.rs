use crate::na;

// TODO: Rename; this is too likely to end up in too
// many scopes to have such a general name.
//
// _OR_ just really discourage importing everything
// from here, and encourage using as, e.g., `dftd::Real`.
pub type Real = f64;

// Common types for the whole engine.
//
// Map coordinates are in meters and the Atlantic is big;
// `f32` runs out of precision well before the far edge.
pub type Vec2 = na::Vector2<f64>;
pub type Vec3 = na::Vector3<f64>;
pub type Pt2 = na::Point2<f64>;
pub type Pt3 = na::Point3<f64>;

pub type Mat4 = na::Matrix4<f64>;
