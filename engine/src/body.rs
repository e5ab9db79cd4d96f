//! Sketch Bodies
//!
//! A sketch body is one physics body plus the material regions painted into
//! it. The store is the single owner of body state; the draw engine is the
//! only mutator of region lists, everything else reads poses and geometry.

use std::collections::HashMap;

use glam::Vec2;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::BodyConfig;
use crate::geometry::{Aabb, Polygon, AREA_EPSILON};
use crate::region::MaterialRegion;
use crate::world::PhysicsWorld;

/// Paint depth plane. Affects collision filtering (same-plane only) and
/// frontend z-ordering; cross-plane bodies interact only through bolts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaintLayer {
    One,
    Two,
}

impl PaintLayer {
    pub fn interaction_groups(self) -> InteractionGroups {
        match self {
            PaintLayer::One => InteractionGroups::new(Group::GROUP_1, Group::GROUP_1),
            PaintLayer::Two => InteractionGroups::new(Group::GROUP_2, Group::GROUP_2),
        }
    }

    pub fn other(self) -> PaintLayer {
        match self {
            PaintLayer::One => PaintLayer::Two,
            PaintLayer::Two => PaintLayer::One,
        }
    }
}

/// Stable identifier for a sketch body. Handles into rapier are an
/// implementation detail; connectors and tools reference bodies by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

/// Kinematic state captured when the simulation is paused.
#[derive(Clone, Copy, Debug)]
pub struct FrozenSnapshot {
    pub gravity_scale: f32,
    pub linvel: Vec2,
    pub angvel: f32,
    /// Pose at the moment of pausing. Restore keeps the *current* pose so
    /// edits made while paused survive; this is kept for tools that want to
    /// show or revert the pre-pause placement.
    pub pose_at_pause: (Vec2, f32),
}

pub struct SketchBody {
    pub id: BodyId,
    pub handle: RigidBodyHandle,
    pub layer: PaintLayer,
    pub is_static: bool,
    pub regions: Vec<MaterialRegion>,
    pub frozen: Option<FrozenSnapshot>,
    collider_handles: Vec<ColliderHandle>,
}

impl SketchBody {
    /// Sum of region masses, floor-clamped.
    pub fn total_mass(&self, config: &BodyConfig) -> f32 {
        let sum: f32 = self
            .regions
            .iter()
            .map(|r| r.mass_contribution(config.mass_scale))
            .sum();
        sum.max(config.min_body_mass)
    }

    /// Mass-weighted centroid of the regions, in the body's local frame.
    pub fn center_of_mass_local(&self, config: &BodyConfig) -> Vec2 {
        let mut mass = 0.0;
        let mut weighted = Vec2::ZERO;
        for region in &self.regions {
            let m = region.mass_contribution(config.mass_scale);
            weighted += region.centroid() * m;
            mass += m;
        }
        if mass > AREA_EPSILON {
            weighted / mass
        } else if self.regions.is_empty() {
            Vec2::ZERO
        } else {
            let mut mean = Vec2::ZERO;
            for region in &self.regions {
                mean += region.centroid();
            }
            mean / self.regions.len() as f32
        }
    }

    /// World-space AABB over all regions.
    pub fn world_aabb(&self, world: &PhysicsWorld) -> Option<Aabb> {
        let (pos, angle) = world.pose(self.handle)?;
        let mut merged: Option<Aabb> = None;
        for region in &self.regions {
            let aabb = region.polygon().to_world(pos, angle).aabb();
            merged = Some(match merged {
                Some(m) => m.merged(&aabb),
                None => aabb,
            });
        }
        merged
    }

    /// Region polygons mapped into world space.
    pub fn regions_world(&self, world: &PhysicsWorld) -> Vec<Polygon> {
        let Some((pos, angle)) = world.pose(self.handle) else {
            return Vec::new();
        };
        self.regions
            .iter()
            .map(|r| r.polygon().to_world(pos, angle))
            .collect()
    }

    /// Does any region of this body contain the world point?
    pub fn contains_world_point(&self, world: &PhysicsWorld, point: Vec2) -> bool {
        let Some(local) = world.local_point(self.handle, point) else {
            return false;
        };
        self.regions.iter().any(|r| {
            r.polygon().aabb().contains(local) && r.polygon().contains(local)
        })
    }

    /// Regenerate colliders and mass properties from the current region set.
    ///
    /// One convex collider per cached decomposition piece; past the piece cap
    /// the body falls back to one closed boundary polyline per region.
    pub fn rebuild_physics(&mut self, world: &mut PhysicsWorld, config: &BodyConfig) {
        for handle in self.collider_handles.drain(..) {
            world.remove_collider(handle);
        }

        let groups = self.layer.interaction_groups();
        let total_pieces: usize = self
            .regions
            .iter_mut()
            .map(|r| r.convex_pieces().len())
            .sum();
        let use_fallback = total_pieces > config.max_convex_pieces;

        for region in &mut self.regions {
            let props = region.material.map(|m| m.properties());
            let friction = props.map(|p| p.friction).unwrap_or(0.5);
            let restitution = props.map(|p| p.bounce).unwrap_or(0.2);

            if use_fallback {
                let mut verts: Vec<Point<Real>> = region
                    .polygon()
                    .outer()
                    .iter()
                    .map(|p| point![p.x, p.y])
                    .collect();
                if let Some(first) = verts.first().copied() {
                    verts.push(first);
                }
                if verts.len() >= 3 {
                    let collider = ColliderBuilder::polyline(verts, None)
                        .friction(friction)
                        .restitution(restitution)
                        .density(0.0)
                        .collision_groups(groups)
                        .build();
                    self.collider_handles
                        .push(world.insert_collider(collider, self.handle));
                }
                continue;
            }

            for piece in region.convex_pieces().to_vec() {
                let verts: Vec<Point<Real>> = piece
                    .outer()
                    .iter()
                    .map(|p| point![p.x, p.y])
                    .collect();
                if let Some(builder) = ColliderBuilder::convex_hull(&verts) {
                    let collider = builder
                        .friction(friction)
                        .restitution(restitution)
                        .density(0.0)
                        .collision_groups(groups)
                        .build();
                    self.collider_handles
                        .push(world.insert_collider(collider, self.handle));
                }
            }
        }

        self.install_mass_properties(world, config);
    }

    fn install_mass_properties(&self, world: &mut PhysicsWorld, config: &BodyConfig) {
        let mass = self.total_mass(config);
        let com = self.center_of_mass_local(config);
        let mut inertia = 0.0;
        for region in &self.regions {
            let m = region.mass_contribution(config.mass_scale);
            let own = region.density() * config.mass_scale * region.polygon().second_moment();
            inertia += own + m * (region.centroid() - com).length_squared();
        }
        inertia = inertia.max(mass * 0.5);

        if let Some(body) = world.bodies.get_mut(self.handle) {
            body.set_additional_mass_properties(
                MassProperties::new(point![com.x, com.y], mass, inertia),
                true,
            );
        }
    }

    /// Per-region world polygons with material, for the frontend.
    pub fn visual_polygons(
        &self,
        world: &PhysicsWorld,
    ) -> Vec<(Polygon, Option<crate::materials::MaterialId>)> {
        let Some((pos, angle)) = world.pose(self.handle) else {
            return Vec::new();
        };
        self.regions
            .iter()
            .map(|r| (r.polygon().to_world(pos, angle), r.material))
            .collect()
    }
}

/// Owning container for all sketch bodies, keyed by stable id.
#[derive(Default)]
pub struct BodyStore {
    map: HashMap<BodyId, SketchBody>,
    next_id: u64,
}

impl BodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.map.contains_key(&id)
    }

    pub fn get(&self, id: BodyId) -> Option<&SketchBody> {
        self.map.get(&id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut SketchBody> {
        self.map.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SketchBody> {
        self.map.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SketchBody> {
        self.map.values_mut()
    }

    pub fn ids(&self) -> Vec<BodyId> {
        let mut ids: Vec<BodyId> = self.map.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Create a physics body and its sketch bookkeeping from a region set
    /// expressed in the new body's local frame.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        &mut self,
        world: &mut PhysicsWorld,
        config: &BodyConfig,
        regions: Vec<MaterialRegion>,
        position: Vec2,
        angle: f32,
        layer: PaintLayer,
        is_static: bool,
        velocity: Option<(Vec2, f32)>,
    ) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;

        let builder = if is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
                .linear_damping(config.linear_damping)
                .angular_damping(config.angular_damping)
        };
        let mut builder = builder
            .translation(vector![position.x, position.y])
            .rotation(angle);
        if let Some((linvel, angvel)) = velocity {
            builder = builder
                .linvel(vector![linvel.x, linvel.y])
                .angvel(angvel);
        }
        let handle = world.bodies.insert(builder.build());

        let mut body = SketchBody {
            id,
            handle,
            layer,
            is_static,
            regions,
            frozen: None,
            collider_handles: Vec::new(),
        };
        body.rebuild_physics(world, config);
        self.map.insert(id, body);
        id
    }

    /// Destroy a body and its physics state.
    pub fn despawn(&mut self, world: &mut PhysicsWorld, id: BodyId) -> bool {
        if let Some(body) = self.map.remove(&id) {
            world.remove_body(body.handle);
            true
        } else {
            false
        }
    }

    /// Body whose regions contain the world point, filtered by layer.
    /// Overlapping hits resolve to the oldest (lowest id) body.
    pub fn body_at_point(
        &self,
        world: &PhysicsWorld,
        point: Vec2,
        layer: Option<PaintLayer>,
    ) -> Option<BodyId> {
        let mut hit: Option<BodyId> = None;
        for body in self.map.values() {
            if let Some(wanted) = layer {
                if body.layer != wanted {
                    continue;
                }
            }
            if let Some(aabb) = body.world_aabb(world) {
                if aabb.contains(point) && body.contains_world_point(world, point) {
                    // deterministic pick: lowest id wins on overlap
                    hit = Some(match hit {
                        Some(prev) if prev < body.id => prev,
                        _ => body.id,
                    });
                }
            }
        }
        hit
    }

    /// Nearest body within `radius` of a world point, filtered by layer.
    /// Used for bolt reattachment where split pieces may have shifted.
    pub fn body_near_point(
        &self,
        world: &PhysicsWorld,
        point: Vec2,
        radius: f32,
        layer: Option<PaintLayer>,
    ) -> Option<BodyId> {
        if let Some(direct) = self.body_at_point(world, point, layer) {
            return Some(direct);
        }
        let mut best: Option<(f32, BodyId)> = None;
        for body in self.map.values() {
            if let Some(wanted) = layer {
                if body.layer != wanted {
                    continue;
                }
            }
            let Some(aabb) = body.world_aabb(world) else {
                continue;
            };
            if !aabb.grown(radius).contains(point) {
                continue;
            }
            for polygon in body.regions_world(world) {
                let ring = polygon.outer();
                for i in 0..ring.len() {
                    let d = crate::geometry::point_segment_distance(
                        point,
                        ring[i],
                        ring[(i + 1) % ring.len()],
                    );
                    if d <= radius && best.map(|(bd, _)| d < bd).unwrap_or(true) {
                        best = Some((d, body.id));
                    }
                }
            }
        }
        best.map(|(_, id)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PhysicsConfig, SandboxConfig};
    use crate::materials::MaterialId;

    fn rect_polygon(cx: f32, cy: f32, half: f32) -> Polygon {
        Polygon::new(vec![
            Vec2::new(cx - half, cy - half),
            Vec2::new(cx + half, cy - half),
            Vec2::new(cx + half, cy + half),
            Vec2::new(cx - half, cy + half),
        ])
    }

    fn spawn_square(
        store: &mut BodyStore,
        world: &mut PhysicsWorld,
        config: &SandboxConfig,
        material: MaterialId,
    ) -> BodyId {
        let region = MaterialRegion::new(rect_polygon(0.0, 0.0, 10.0), Some(material));
        store.spawn(
            world,
            &config.body,
            vec![region],
            Vec2::new(50.0, 50.0),
            0.0,
            PaintLayer::One,
            false,
            None,
        )
    }

    #[test]
    fn denser_material_means_more_mass() {
        let config = SandboxConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut store = BodyStore::new();
        let wood = spawn_square(&mut store, &mut world, &config, MaterialId::Wood);
        let metal = spawn_square(&mut store, &mut world, &config, MaterialId::Metal);
        let m_wood = store.get(wood).unwrap().total_mass(&config.body);
        let m_metal = store.get(metal).unwrap().total_mass(&config.body);
        assert!(m_metal > m_wood);
        assert!(m_wood >= config.body.min_body_mass);
    }

    #[test]
    fn body_at_point_respects_layer() {
        let config = SandboxConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut store = BodyStore::new();
        let id = spawn_square(&mut store, &mut world, &config, MaterialId::Stone);
        let p = Vec2::new(50.0, 50.0);
        assert_eq!(store.body_at_point(&world, p, Some(PaintLayer::One)), Some(id));
        assert_eq!(store.body_at_point(&world, p, Some(PaintLayer::Two)), None);
        assert_eq!(
            store.body_at_point(&world, Vec2::new(500.0, 500.0), None),
            None
        );
    }

    #[test]
    fn overlapping_hit_resolves_to_the_oldest_body() {
        let config = SandboxConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut store = BodyStore::new();
        let first = spawn_square(&mut store, &mut world, &config, MaterialId::Wood);
        spawn_square(&mut store, &mut world, &config, MaterialId::Stone);
        let p = Vec2::new(50.0, 50.0);
        assert_eq!(store.body_at_point(&world, p, None), Some(first));
    }

    #[test]
    fn despawn_removes_physics_body() {
        let config = SandboxConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut store = BodyStore::new();
        let id = spawn_square(&mut store, &mut world, &config, MaterialId::Brick);
        let handle = store.get(id).unwrap().handle;
        assert!(store.despawn(&mut world, id));
        assert!(world.bodies.get(handle).is_none());
        assert!(!store.despawn(&mut world, id));
    }
}
