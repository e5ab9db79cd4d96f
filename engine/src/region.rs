//! Material Regions
//!
//! A region is one polygon of painted material inside a body. Bodies own a
//! set of regions; overlapping paint is resolved by the draw engine so the
//! regions of a body never materially overlap. The convex decomposition is
//! cached here because collision regeneration asks for it far more often
//! than the polygon changes.

use glam::Vec2;

use crate::geometry::{convex_decompose, Polygon};
use crate::materials::MaterialId;

/// Density used for regions painted without a material.
const UNPAINTED_DENSITY: f32 = 0.5;

/// One material polygon in a body's local frame.
#[derive(Clone, Debug)]
pub struct MaterialRegion {
    polygon: Polygon,
    pub material: Option<MaterialId>,
    convex_cache: Option<Vec<Polygon>>,
}

impl MaterialRegion {
    pub fn new(polygon: Polygon, material: Option<MaterialId>) -> Self {
        Self {
            polygon,
            material,
            convex_cache: None,
        }
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Replace the region polygon, invalidating the cached decomposition.
    pub fn set_polygon(&mut self, polygon: Polygon) {
        self.polygon = polygon;
        self.convex_cache = None;
    }

    pub fn area(&self) -> f32 {
        self.polygon.area()
    }

    pub fn centroid(&self) -> Vec2 {
        self.polygon.centroid()
    }

    pub fn density(&self) -> f32 {
        self.material
            .map(MaterialId::density)
            .unwrap_or(UNPAINTED_DENSITY)
    }

    /// Mass this region adds to its body.
    pub fn mass_contribution(&self, mass_scale: f32) -> f32 {
        self.area() * self.density() * mass_scale
    }

    /// Convex pieces of the region polygon, computed on first use.
    pub fn convex_pieces(&mut self) -> &[Polygon] {
        if self.convex_cache.is_none() {
            self.convex_cache = Some(convex_decompose(&self.polygon));
        }
        self.convex_cache.as_deref().unwrap_or(&[])
    }
}
