//! Polyline simplification
//!
//! Ramer-Douglas-Peucker over closed rings, used to bound vertex growth of
//! the accumulating stroke polygon. Also hosts the point/segment distance
//! helper shared with the connector engine.

use glam::Vec2;

use super::polygon::Polygon;

/// Distance from `p` to the segment `a..b`.
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}

fn rdp_recurse(points: &[Vec2], epsilon: f32, keep: &mut Vec<bool>, first: usize, last: usize) {
    if last <= first + 1 {
        return;
    }
    let a = points[first];
    let b = points[last];
    let mut max_dist = 0.0;
    let mut max_idx = first;
    for i in (first + 1)..last {
        let d = point_segment_distance(points[i], a, b);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }
    if max_dist > epsilon {
        keep[max_idx] = true;
        rdp_recurse(points, epsilon, keep, first, max_idx);
        rdp_recurse(points, epsilon, keep, max_idx, last);
    }
}

/// Ramer-Douglas-Peucker on an open polyline. Keeps the endpoints; every
/// retained point is within `epsilon` perpendicular deviation of the input.
pub fn simplify_polyline(points: &[Vec2], epsilon: f32) -> Vec<Vec2> {
    if points.len() < 4 {
        return points.to_vec();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    *keep.last_mut().unwrap() = true;
    rdp_recurse(points, epsilon, &mut keep, 0, points.len() - 1);
    points
        .iter()
        .zip(&keep)
        .filter(|(_, k)| **k)
        .map(|(p, _)| *p)
        .collect()
}

fn simplify_ring(ring: &[Vec2], epsilon: f32) -> Vec<Vec2> {
    if ring.len() < 4 {
        return ring.to_vec();
    }
    // Close the ring so the wrap-around edge is considered, then reopen.
    let mut closed: Vec<Vec2> = ring.to_vec();
    closed.push(ring[0]);
    let mut out = simplify_polyline(&closed, epsilon);
    out.pop();
    out
}

/// Simplify every ring of a polygon. Hole rings that collapse below three
/// points are dropped.
pub fn simplify_polygon(polygon: &Polygon, epsilon: f32) -> Polygon {
    let outer = simplify_ring(polygon.outer(), epsilon);
    let holes = polygon
        .holes()
        .iter()
        .map(|h| simplify_ring(h, epsilon))
        .filter(|h| h.len() >= 3)
        .collect();
    Polygon::with_holes(outer, holes)
}
