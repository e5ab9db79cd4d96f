//! Boolean polygon operations
//!
//! Thin wrappers around `geo`'s boolean ops plus the fragmentation policy
//! the drawing engines rely on: an operation may return zero, one, or many
//! polygons, and wherever a single polygon is expected the largest piece by
//! area wins. Also hosts the earcut-based convex decomposition used for
//! collision generation.

use glam::Vec2;
use geo::BooleanOps;

use super::polygon::{Polygon, AREA_EPSILON};

fn from_multi(multi: geo::MultiPolygon<f64>) -> Vec<Polygon> {
    multi
        .iter()
        .filter_map(Polygon::from_geo)
        .filter(|p| p.area() > AREA_EPSILON)
        .collect()
}

/// Union of two polygons. Disjoint inputs come back as separate pieces.
pub fn union(a: &Polygon, b: &Polygon) -> Vec<Polygon> {
    from_multi(a.to_geo().union(&b.to_geo()))
}

/// `a` minus `b`. Empty when `b` fully covers `a`.
pub fn difference(a: &Polygon, b: &Polygon) -> Vec<Polygon> {
    from_multi(a.to_geo().difference(&b.to_geo()))
}

/// Overlap of two polygons. Empty when they are disjoint.
pub fn intersection(a: &Polygon, b: &Polygon) -> Vec<Polygon> {
    from_multi(a.to_geo().intersection(&b.to_geo()))
}

/// Largest piece by area, consuming the fragment list.
pub fn largest(pieces: Vec<Polygon>) -> Option<Polygon> {
    pieces
        .into_iter()
        .max_by(|a, b| a.area().total_cmp(&b.area()))
}

/// Union keeping only the largest result piece. This is the tie-break the
/// stroke accumulator uses when a union fragments; the accumulating shape
/// must stay a single polygon.
pub fn union_keep_largest(a: &Polygon, b: &Polygon) -> Option<Polygon> {
    largest(union(a, b))
}

/// Total overlap area of two polygons.
pub fn intersection_area(a: &Polygon, b: &Polygon) -> f32 {
    intersection(a, b).iter().map(|p| p.area()).sum()
}

/// True when the polygons overlap or touch. Touching counts: two shapes
/// whose union collapses to a single polygon belong to the same connected
/// piece even at zero overlap area.
pub fn touches_or_overlaps(a: &Polygon, b: &Polygon) -> bool {
    if !a.aabb().grown(AREA_EPSILON).overlaps(&b.aabb()) {
        return false;
    }
    union(a, b).len() == 1
}

/// Convex decomposition via ear-clipping triangulation (triangles are
/// convex). Sliver triangles below the area epsilon are discarded.
pub fn convex_decompose(polygon: &Polygon) -> Vec<Polygon> {
    let mut vertices: Vec<f64> = Vec::new();
    let mut hole_indices: Vec<usize> = Vec::new();
    for p in polygon.outer() {
        vertices.push(p.x as f64);
        vertices.push(p.y as f64);
    }
    for hole in polygon.holes() {
        hole_indices.push(vertices.len() / 2);
        for p in hole {
            vertices.push(p.x as f64);
            vertices.push(p.y as f64);
        }
    }

    let Ok(indices) = earcutr::earcut(&vertices, &hole_indices, 2) else {
        return Vec::new();
    };

    let point_at = |i: usize| Vec2::new(vertices[2 * i] as f32, vertices[2 * i + 1] as f32);
    let mut pieces = Vec::with_capacity(indices.len() / 3);
    for tri in indices.chunks_exact(3) {
        let piece = Polygon::new(vec![point_at(tri[0]), point_at(tri[1]), point_at(tri[2])]);
        if piece.area() > AREA_EPSILON {
            pieces.push(piece);
        }
    }
    pieces
}
