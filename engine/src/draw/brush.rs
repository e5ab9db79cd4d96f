//! Brush footprints
//!
//! The polygon stamped at a pointer position, shared by the draw and erase
//! tools. Circles are N-gon approximations; every downstream operation is a
//! polygon boolean, so smoothness matters more than exact roundness.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Polygon;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushShape {
    Circle,
    Square,
}

/// Footprint polygon for a brush of the given diameter centered at `at`.
pub fn footprint(shape: BrushShape, at: Vec2, diameter: f32, circle_segments: usize) -> Polygon {
    let radius = diameter * 0.5;
    match shape {
        BrushShape::Circle => {
            let n = circle_segments.max(8);
            let points = (0..n)
                .map(|i| {
                    let a = i as f32 / n as f32 * std::f32::consts::TAU;
                    at + Vec2::new(a.cos(), a.sin()) * radius
                })
                .collect();
            Polygon::new(points)
        }
        BrushShape::Square => Polygon::new(vec![
            at + Vec2::new(-radius, -radius),
            at + Vec2::new(radius, -radius),
            at + Vec2::new(radius, radius),
            at + Vec2::new(-radius, radius),
        ]),
    }
}
