//! Draw Engine
//!
//! Owns the in-progress stroke and turns finished strokes into bodies. A
//! finished stroke either spawns a fresh body, or - when it overlaps
//! existing bodies on its layer - merges everything it touched into one
//! body, with the new material overriding the old inside the stroke
//! footprint and surviving as separate patchwork regions outside it.

use glam::Vec2;

use crate::body::{BodyId, BodyStore, PaintLayer};
use crate::config::SandboxConfig;
use crate::draw::brush::BrushShape;
use crate::draw::stroke::StrokeInProgress;
use crate::events::SandboxEvent;
use crate::geometry::{difference, touches_or_overlaps, Polygon};
use crate::materials::MaterialId;
use crate::region::MaterialRegion;
use crate::world::PhysicsWorld;

pub struct DrawEngine {
    stroke: Option<StrokeInProgress>,
    erase_timer: f32,
}

impl Default for DrawEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawEngine {
    pub fn new() -> Self {
        Self {
            stroke: None,
            erase_timer: 0.0,
        }
    }

    pub fn stroke(&self) -> Option<&StrokeInProgress> {
        self.stroke.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn begin_stroke(
        &mut self,
        config: &SandboxConfig,
        shape: BrushShape,
        brush_size: f32,
        material: Option<MaterialId>,
        is_static: bool,
        layer: PaintLayer,
        at: Vec2,
    ) {
        self.stroke = Some(StrokeInProgress::begin(
            &config.draw,
            shape,
            brush_size,
            material,
            is_static,
            layer,
            at,
        ));
    }

    pub fn move_stroke(&mut self, config: &SandboxConfig, at: Vec2) {
        if let Some(stroke) = &mut self.stroke {
            stroke.advance(&config.draw, at);
        }
    }

    /// Drop the stroke without producing a body (tool switch, mode exit).
    pub fn cancel_stroke(&mut self) {
        self.stroke = None;
    }

    /// Finish the stroke and resolve it against the existing bodies.
    pub fn end_stroke(
        &mut self,
        config: &SandboxConfig,
        store: &mut BodyStore,
        world: &mut PhysicsWorld,
        events: &mut Vec<SandboxEvent>,
    ) -> Option<BodyId> {
        let stroke = self.stroke.take()?;
        let layer = stroke.layer;
        let material = stroke.material;
        let is_static = stroke.is_static;
        let polygon = stroke.finish(&config.draw)?;

        let overlapping = overlapping_bodies(store, world, &polygon, layer);
        if overlapping.is_empty() {
            let centroid = polygon.centroid();
            let local = polygon.translated(-centroid);
            let region = MaterialRegion::new(local, material);
            let id = store.spawn(
                world,
                &config.body,
                vec![region],
                centroid,
                0.0,
                layer,
                is_static,
                None,
            );
            events.push(SandboxEvent::BodySpawned { body: id });
            println!(
                "[Draw] new body {:?} ({:.0} px^2, {})",
                id,
                polygon.area(),
                material.map(|m| m.properties().name).unwrap_or("unpainted"),
            );
            Some(id)
        } else {
            Some(merge_stroke_into(
                config,
                store,
                world,
                events,
                polygon,
                material,
                overlapping,
            ))
        }
    }

    /// Advance the eraser throttle clock.
    pub fn tick_erase_timer(&mut self, dt: f32) {
        self.erase_timer = (self.erase_timer - dt).max(0.0);
    }

    /// True when enough time has passed for another eraser application.
    pub fn erase_ready(&self) -> bool {
        self.erase_timer <= 0.0
    }

    pub fn mark_erase_applied(&mut self, config: &SandboxConfig) {
        self.erase_timer = config.draw.erase_min_interval;
    }
}

/// Bodies on `layer` whose regions overlap or touch the stroke polygon,
/// AABB-gated, in deterministic id order.
fn overlapping_bodies(
    store: &BodyStore,
    world: &PhysicsWorld,
    polygon: &Polygon,
    layer: PaintLayer,
) -> Vec<BodyId> {
    let stroke_aabb = polygon.aabb();
    let mut hits = Vec::new();
    for body in store.iter() {
        if body.layer != layer {
            continue;
        }
        let Some(aabb) = body.world_aabb(world) else {
            continue;
        };
        if !aabb.overlaps(&stroke_aabb) {
            continue;
        }
        if body
            .regions_world(world)
            .iter()
            .any(|r| touches_or_overlaps(r, polygon))
        {
            hits.push(body.id);
        }
    }
    hits.sort();
    hits
}

/// Merge a finished stroke into the first overlapping body, absorbing the
/// other overlapping bodies first. Later paint wins inside the stroke
/// footprint; everything outside it is preserved as-is.
fn merge_stroke_into(
    config: &SandboxConfig,
    store: &mut BodyStore,
    world: &mut PhysicsWorld,
    events: &mut Vec<SandboxEvent>,
    stroke_world: Polygon,
    material: Option<MaterialId>,
    overlapping: Vec<BodyId>,
) -> BodyId {
    let target_id = overlapping[0];
    let target_handle = store.get(target_id).expect("target body exists").handle;
    let (target_pos, target_angle) = world
        .pose(target_handle)
        .expect("target body has a physics pose");

    // Re-express every absorbed body's regions in the target's local frame.
    let mut absorbed_regions: Vec<MaterialRegion> = Vec::new();
    let mut absorbed_ids: Vec<BodyId> = Vec::new();
    for other_id in overlapping.iter().skip(1).copied() {
        let Some(other) = store.get(other_id) else {
            continue;
        };
        let Some((pos, angle)) = world.pose(other.handle) else {
            continue;
        };
        for region in &other.regions {
            let local = region
                .polygon()
                .to_world(pos, angle)
                .to_local(target_pos, target_angle);
            absorbed_regions.push(MaterialRegion::new(local, region.material));
        }
        absorbed_ids.push(other_id);
    }
    for id in &absorbed_ids {
        store.despawn(world, *id);
    }

    let stroke_local = stroke_world.to_local(target_pos, target_angle);
    let stroke_aabb = stroke_local.aabb();

    let body = store.get_mut(target_id).expect("target body exists");
    body.regions.extend(absorbed_regions);

    // Clip the stroke footprint out of every existing region: the fresh
    // paint overrides whatever was underneath.
    let old_regions = std::mem::take(&mut body.regions);
    for region in old_regions {
        if !region.polygon().aabb().overlaps(&stroke_aabb) {
            body.regions.push(region);
            continue;
        }
        for piece in difference(region.polygon(), &stroke_local) {
            if piece.area() >= config.draw.min_region_area {
                body.regions
                    .push(MaterialRegion::new(piece, region.material));
            }
        }
    }
    if stroke_local.area() >= config.draw.min_region_area {
        body.regions
            .push(MaterialRegion::new(stroke_local, material));
    }
    body.rebuild_physics(world, &config.body);

    if !absorbed_ids.is_empty() {
        println!(
            "[Draw] merged {} bodies into {:?}",
            absorbed_ids.len() + 1,
            target_id
        );
    }
    events.push(SandboxEvent::BodiesMerged {
        into: target_id,
        absorbed: absorbed_ids,
    });
    target_id
}
