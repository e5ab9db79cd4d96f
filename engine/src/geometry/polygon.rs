//! Polygon primitives
//!
//! A polygon is an implicitly closed outer ring plus optional hole rings
//! (erasing can punch holes through a shape). Rings are normalized on
//! construction: outer counter-clockwise, holes clockwise, so signed-area
//! sums over all rings directly yield net area, centroid, and inertia.

use glam::Vec2;

/// Signed areas smaller than this are treated as degenerate.
pub const AREA_EPSILON: f32 = 1e-4;

/// Axis-aligned bounding box used as a fast-reject gate before boolean ops.
#[derive(Clone, Copy, Debug)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn grown(&self, margin: f32) -> Aabb {
        Aabb {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }
}

/// Closed polygon: one outer ring and zero or more hole rings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    outer: Vec<Vec2>,
    holes: Vec<Vec<Vec2>>,
}

/// Signed area of one ring via the shoelace formula.
/// Positive for counter-clockwise winding (math convention).
pub fn ring_signed_area(ring: &[Vec2]) -> f32 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    0.5 * sum
}

fn reverse_ring(ring: &mut [Vec2]) {
    ring.reverse();
}

impl Polygon {
    /// Build a polygon from an outer ring. Winding is normalized.
    pub fn new(outer: Vec<Vec2>) -> Self {
        Self::with_holes(outer, Vec::new())
    }

    /// Build a polygon from an outer ring and hole rings. Degenerate rings
    /// (< 3 points) are dropped; winding is normalized (outer CCW, holes CW).
    pub fn with_holes(mut outer: Vec<Vec2>, mut holes: Vec<Vec<Vec2>>) -> Self {
        if ring_signed_area(&outer) < 0.0 {
            reverse_ring(&mut outer);
        }
        holes.retain(|h| h.len() >= 3);
        for hole in &mut holes {
            if ring_signed_area(hole) > 0.0 {
                reverse_ring(hole);
            }
        }
        Self { outer, holes }
    }

    pub fn outer(&self) -> &[Vec2] {
        &self.outer
    }

    pub fn holes(&self) -> &[Vec<Vec2>] {
        &self.holes
    }

    /// A polygon needs at least three outer points to bound any area.
    pub fn is_valid(&self) -> bool {
        self.outer.len() >= 3 && self.area() > AREA_EPSILON
    }

    /// Net unsigned area (outer minus holes).
    pub fn area(&self) -> f32 {
        let mut sum = ring_signed_area(&self.outer);
        for hole in &self.holes {
            sum += ring_signed_area(hole); // holes wind CW, contribute negative
        }
        sum.abs()
    }

    /// Area-weighted centroid over all rings. Falls back to the arithmetic
    /// mean of the outer ring when the polygon is degenerate/near-colinear.
    pub fn centroid(&self) -> Vec2 {
        let mut area_sum = 0.0;
        let mut acc = Vec2::ZERO;
        for ring in std::iter::once(&self.outer).chain(self.holes.iter()) {
            for i in 0..ring.len() {
                let a = ring[i];
                let b = ring[(i + 1) % ring.len()];
                let cross = a.x * b.y - b.x * a.y;
                acc += (a + b) * cross;
                area_sum += cross;
            }
        }
        area_sum *= 0.5;
        if area_sum.abs() < AREA_EPSILON {
            if self.outer.is_empty() {
                return Vec2::ZERO;
            }
            let mut mean = Vec2::ZERO;
            for p in &self.outer {
                mean += *p;
            }
            return mean / self.outer.len() as f32;
        }
        acc / (6.0 * area_sum)
    }

    /// Bounding box of the outer ring (holes cannot extend it).
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.outer)
    }

    /// Even-odd containment test across all rings, so points inside a hole
    /// report outside.
    pub fn contains(&self, p: Vec2) -> bool {
        let mut inside = false;
        for ring in std::iter::once(&self.outer).chain(self.holes.iter()) {
            let n = ring.len();
            let mut j = n.wrapping_sub(1);
            for i in 0..n {
                let a = ring[i];
                let b = ring[j];
                if (a.y > p.y) != (b.y > p.y)
                    && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
                {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }

    /// Second moment of area about the centroid (per unit density).
    /// Ring formula; hole rings subtract through their winding.
    pub fn second_moment(&self) -> f32 {
        let mut j = 0.0;
        let mut area_sum = 0.0;
        for ring in std::iter::once(&self.outer).chain(self.holes.iter()) {
            for i in 0..ring.len() {
                let a = ring[i];
                let b = ring[(i + 1) % ring.len()];
                let cross = a.x * b.y - b.x * a.y;
                j += cross * (a.dot(a) + a.dot(b) + b.dot(b));
                area_sum += cross;
            }
        }
        let area = (0.5 * area_sum).abs();
        if area < AREA_EPSILON {
            return 0.0;
        }
        let about_origin = (j / 12.0).abs();
        let c = self.centroid();
        (about_origin - area * c.length_squared()).max(0.0)
    }

    fn map_points(&self, f: impl Fn(Vec2) -> Vec2) -> Polygon {
        Polygon {
            outer: self.outer.iter().map(|p| f(*p)).collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().map(|p| f(*p)).collect())
                .collect(),
        }
    }

    pub fn translated(&self, offset: Vec2) -> Polygon {
        self.map_points(|p| p + offset)
    }

    /// Local -> world: rotate by `angle` (radians), then translate.
    pub fn to_world(&self, translation: Vec2, angle: f32) -> Polygon {
        let (sin, cos) = angle.sin_cos();
        self.map_points(|p| {
            Vec2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos) + translation
        })
    }

    /// World -> local: inverse of [`Polygon::to_world`].
    pub fn to_local(&self, translation: Vec2, angle: f32) -> Polygon {
        let (sin, cos) = angle.sin_cos();
        self.map_points(|p| {
            let d = p - translation;
            Vec2::new(d.x * cos + d.y * sin, -d.x * sin + d.y * cos)
        })
    }

    /// Widen to a `geo` polygon for boolean operations.
    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let ring_to_geo = |ring: &[Vec2]| {
            geo::LineString::from(
                ring.iter()
                    .map(|p| (p.x as f64, p.y as f64))
                    .collect::<Vec<_>>(),
            )
        };
        geo::Polygon::new(
            ring_to_geo(&self.outer),
            self.holes.iter().map(|h| ring_to_geo(h)).collect(),
        )
    }

    /// Convert back from a `geo` polygon. Returns `None` when the result is
    /// degenerate (fewer than three distinct outer points).
    pub fn from_geo(poly: &geo::Polygon<f64>) -> Option<Polygon> {
        let ring_from_geo = |ls: &geo::LineString<f64>| {
            let mut pts: Vec<Vec2> = ls
                .coords()
                .map(|c| Vec2::new(c.x as f32, c.y as f32))
                .collect();
            // geo rings repeat the first coordinate at the end
            if pts.len() >= 2 && pts.first() == pts.last() {
                pts.pop();
            }
            pts
        };
        let outer = ring_from_geo(poly.exterior());
        if outer.len() < 3 {
            return None;
        }
        let holes = poly
            .interiors()
            .iter()
            .map(ring_from_geo)
            .filter(|h| h.len() >= 3)
            .collect();
        Some(Polygon::with_holes(outer, holes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f32) -> Polygon {
        Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(side, 0.0),
            Vec2::new(side, side),
            Vec2::new(0.0, side),
        ])
    }

    #[test]
    fn square_area_and_centroid() {
        let p = square(10.0);
        assert!((p.area() - 100.0).abs() < 1e-3);
        let c = p.centroid();
        assert!((c - Vec2::new(5.0, 5.0)).length() < 1e-3);
    }

    #[test]
    fn winding_is_normalized() {
        let cw = Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(4.0, 0.0),
        ]);
        assert!(ring_signed_area(cw.outer()) > 0.0);
        assert!((cw.area() - 16.0).abs() < 1e-4);
    }

    #[test]
    fn hole_reduces_area_and_containment() {
        let outer = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        let hole = vec![
            Vec2::new(4.0, 4.0),
            Vec2::new(6.0, 4.0),
            Vec2::new(6.0, 6.0),
            Vec2::new(4.0, 6.0),
        ];
        let p = Polygon::with_holes(outer, vec![hole]);
        assert!((p.area() - 96.0).abs() < 1e-3);
        assert!(p.contains(Vec2::new(1.0, 1.0)));
        assert!(!p.contains(Vec2::new(5.0, 5.0)));
        assert!(!p.contains(Vec2::new(11.0, 5.0)));
    }

    #[test]
    fn degenerate_centroid_falls_back_to_mean() {
        let line = Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(4.0, 0.0),
        ]);
        let c = line.centroid();
        assert!((c - Vec2::new(2.0, 0.0)).length() < 1e-4);
        assert!(!line.is_valid());
    }

    #[test]
    fn world_local_round_trip() {
        let p = square(6.0);
        let world = p.to_world(Vec2::new(20.0, -4.0), 0.7);
        let back = world.to_local(Vec2::new(20.0, -4.0), 0.7);
        for (a, b) in p.outer().iter().zip(back.outer()) {
            assert!((*a - *b).length() < 1e-3);
        }
    }

    #[test]
    fn second_moment_of_square_matches_closed_form() {
        // I = s^4 / 6 for a square about its centroid
        let p = square(4.0);
        let expected = 4.0f32.powi(4) / 6.0;
        assert!((p.second_moment() - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn geo_round_trip_preserves_rings() {
        let outer = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(8.0, 0.0),
            Vec2::new(8.0, 8.0),
            Vec2::new(0.0, 8.0),
        ];
        let hole = vec![
            Vec2::new(3.0, 3.0),
            Vec2::new(5.0, 3.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(3.0, 5.0),
        ];
        let p = Polygon::with_holes(outer, vec![hole]);
        let back = Polygon::from_geo(&p.to_geo()).unwrap();
        assert!((p.area() - back.area()).abs() < 1e-3);
        assert_eq!(back.holes().len(), 1);
    }
}
