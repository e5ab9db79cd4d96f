//! Geometry utilities
//!
//! Pure polygon math: area/centroid/AABB primitives, Ramer-Douglas-Peucker
//! simplification, and the boolean-op wrappers with their fragmentation
//! tie-break policy. No engine state lives here.

pub mod boolean;
pub mod polygon;
pub mod simplify;

pub use boolean::{
    convex_decompose, difference, intersection, intersection_area, largest,
    touches_or_overlaps, union, union_keep_largest,
};
pub use polygon::{ring_signed_area, Aabb, Polygon, AREA_EPSILON};
pub use simplify::{point_segment_distance, simplify_polygon, simplify_polyline};
