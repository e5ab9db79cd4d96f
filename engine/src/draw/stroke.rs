//! Stroke accumulation
//!
//! While the pointer is held, brush footprints are unioned into one growing
//! polygon. Fast pointer moves are bridged with interpolated sub-steps so the
//! stroke never gaps, and the vertex count is bounded by periodic
//! simplification. A union can fragment; the largest piece always wins so
//! the accumulator stays a single polygon.

use glam::Vec2;

use crate::body::PaintLayer;
use crate::config::DrawConfig;
use crate::draw::brush::{footprint, BrushShape};
use crate::geometry::{simplify_polygon, union_keep_largest, Polygon};
use crate::materials::MaterialId;

/// Transient state of one brush stroke between press and release.
pub struct StrokeInProgress {
    polygon: Polygon,
    pub material: Option<MaterialId>,
    pub is_static: bool,
    pub shape: BrushShape,
    pub brush_size: f32,
    pub layer: PaintLayer,
    last_point: Vec2,
    merges_since_simplify: u32,
}

impl StrokeInProgress {
    /// Start a stroke: the initial polygon is a single brush footprint.
    pub fn begin(
        config: &DrawConfig,
        shape: BrushShape,
        brush_size: f32,
        material: Option<MaterialId>,
        is_static: bool,
        layer: PaintLayer,
        at: Vec2,
    ) -> Self {
        Self {
            polygon: footprint(shape, at, brush_size, config.circle_segments),
            material,
            is_static,
            shape,
            brush_size,
            layer,
            last_point: at,
            merges_since_simplify: 0,
        }
    }

    /// Current accumulated outline (world space), for live preview.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Feed a new pointer position. Footprints are merged only after the
    /// pointer travels the merge threshold, with sub-steps capped at the
    /// maximum spacing so a fast swipe leaves no gaps.
    pub fn advance(&mut self, config: &DrawConfig, to: Vec2) {
        let travelled = (to - self.last_point).length();
        let threshold = self.brush_size * config.merge_threshold_ratio;
        if travelled < threshold {
            return;
        }

        let max_step = (self.brush_size * config.max_step_ratio).max(1e-3);
        let steps = (travelled / max_step).ceil().max(1.0) as u32;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let at = self.last_point.lerp(to, t);
            let stamp = footprint(self.shape, at, self.brush_size, config.circle_segments);
            if let Some(merged) = union_keep_largest(&self.polygon, &stamp) {
                self.polygon = merged;
            }
            self.merges_since_simplify += 1;
            if self.merges_since_simplify >= config.simplify_interval {
                self.polygon = simplify_polygon(&self.polygon, config.simplify_epsilon);
                self.merges_since_simplify = 0;
            }
        }
        self.last_point = to;
    }

    /// Finish the stroke. Returns the final simplified polygon, or `None`
    /// when the result is too small to matter.
    pub fn finish(self, config: &DrawConfig) -> Option<Polygon> {
        let polygon = simplify_polygon(&self.polygon, config.simplify_epsilon);
        if polygon.is_valid() && polygon.area() >= config.min_polygon_area {
            Some(polygon)
        } else {
            None
        }
    }
}
