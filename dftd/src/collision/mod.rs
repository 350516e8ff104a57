//! Coarse collision queries over triangle soups, such as ship hulls.

mod bv_tree;
mod sphere;

pub use self::bv_tree::{BvTree, CollisionStats, LeafData};
pub use self::sphere::BoundingSphere;
