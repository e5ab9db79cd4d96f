//! Physics Pause
//!
//! Global freeze/restore. Pausing snapshots each dynamic body's kinematic
//! state and parks it as a fixed body so nothing integrates; resuming gives
//! velocities and gravity back but keeps whatever pose the body has *now*,
//! so edits made while paused stick. Bodies created during the pause are
//! frozen on the spot and restored with the rest.

use glam::Vec2;
use rapier2d::prelude::RigidBodyType;

use crate::body::{BodyStore, FrozenSnapshot};
use crate::world::PhysicsWorld;

#[derive(Default)]
pub struct FreezeState {
    paused: bool,
}

impl FreezeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Toggle the pause, freezing or restoring every dynamic body.
    pub fn toggle(&mut self, store: &mut BodyStore, world: &mut PhysicsWorld) {
        if self.paused {
            self.resume(store, world);
        } else {
            self.pause(store, world);
        }
    }

    pub fn pause(&mut self, store: &mut BodyStore, world: &mut PhysicsWorld) {
        if self.paused {
            return;
        }
        self.paused = true;
        let mut frozen = 0;
        for sketch in store.iter_mut() {
            if sketch.is_static || sketch.frozen.is_some() {
                continue;
            }
            if let Some(body) = world.bodies.get_mut(sketch.handle) {
                let v = *body.linvel();
                let t = *body.translation();
                sketch.frozen = Some(FrozenSnapshot {
                    gravity_scale: body.gravity_scale(),
                    linvel: Vec2::new(v.x, v.y),
                    angvel: body.angvel(),
                    pose_at_pause: (Vec2::new(t.x, t.y), body.rotation().angle()),
                });
                body.set_linvel(rapier2d::prelude::vector![0.0, 0.0], false);
                body.set_angvel(0.0, false);
                body.set_body_type(RigidBodyType::Fixed, false);
                frozen += 1;
            }
        }
        println!("[Pause] froze {frozen} bodies");
    }

    pub fn resume(&mut self, store: &mut BodyStore, world: &mut PhysicsWorld) {
        if !self.paused {
            return;
        }
        self.paused = false;
        for sketch in store.iter_mut() {
            let Some(snapshot) = sketch.frozen.take() else {
                continue;
            };
            if let Some(body) = world.bodies.get_mut(sketch.handle) {
                // current pose is kept on purpose; only motion state returns
                body.set_body_type(RigidBodyType::Dynamic, true);
                body.set_gravity_scale(snapshot.gravity_scale, true);
                body.set_linvel(
                    rapier2d::prelude::vector![snapshot.linvel.x, snapshot.linvel.y],
                    true,
                );
                body.set_angvel(snapshot.angvel, true);
            }
        }
        println!("[Pause] resumed");
    }

    /// Freeze any dynamic body that appeared after the pause began (stroke
    /// finalized or split while paused) so it joins the restore set.
    pub fn freeze_new_bodies(&self, store: &mut BodyStore, world: &mut PhysicsWorld) {
        if !self.paused {
            return;
        }
        for sketch in store.iter_mut() {
            if sketch.is_static || sketch.frozen.is_some() {
                continue;
            }
            if let Some(body) = world.bodies.get_mut(sketch.handle) {
                let v = *body.linvel();
                let t = *body.translation();
                sketch.frozen = Some(FrozenSnapshot {
                    gravity_scale: body.gravity_scale(),
                    linvel: Vec2::new(v.x, v.y),
                    angvel: body.angvel(),
                    pose_at_pause: (Vec2::new(t.x, t.y), body.rotation().angle()),
                });
                body.set_linvel(rapier2d::prelude::vector![0.0, 0.0], false);
                body.set_angvel(0.0, false);
                body.set_body_type(RigidBodyType::Fixed, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::PaintLayer;
    use crate::config::{PhysicsConfig, SandboxConfig};
    use crate::geometry::Polygon;
    use crate::materials::MaterialId;
    use crate::region::MaterialRegion;

    fn setup() -> (SandboxConfig, PhysicsWorld, BodyStore, crate::body::BodyId) {
        let config = SandboxConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut store = BodyStore::new();
        let region = MaterialRegion::new(
            Polygon::new(vec![
                Vec2::new(-5.0, -5.0),
                Vec2::new(5.0, -5.0),
                Vec2::new(5.0, 5.0),
                Vec2::new(-5.0, 5.0),
            ]),
            Some(MaterialId::Wood),
        );
        let id = store.spawn(
            &mut world,
            &config.body,
            vec![region],
            Vec2::new(0.0, 0.0),
            0.0,
            PaintLayer::One,
            false,
            Some((Vec2::new(7.0, -3.0), 0.5)),
        );
        (config, world, store, id)
    }

    #[test]
    fn pause_zeroes_motion_and_resume_restores_it() {
        let (_config, mut world, mut store, id) = setup();
        let mut freeze = FreezeState::new();

        freeze.pause(&mut store, &mut world);
        let handle = store.get(id).unwrap().handle;
        assert!(world.bodies.get(handle).unwrap().is_fixed());
        for _ in 0..10 {
            world.step();
        }
        let (pos, _) = world.pose(handle).unwrap();
        assert!(pos.length() < 1e-3, "frozen body must not move");

        freeze.resume(&mut store, &mut world);
        let body = world.bodies.get(handle).unwrap();
        assert!(body.is_dynamic());
        assert!((body.linvel().x - 7.0).abs() < 1e-4);
        assert!((body.angvel() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn edits_during_pause_survive_resume() {
        let (_config, mut world, mut store, id) = setup();
        let mut freeze = FreezeState::new();
        freeze.pause(&mut store, &mut world);

        let handle = store.get(id).unwrap().handle;
        if let Some(body) = world.bodies.get_mut(handle) {
            body.set_translation(rapier2d::prelude::vector![40.0, 9.0], false);
        }
        freeze.resume(&mut store, &mut world);
        let (pos, _) = world.pose(handle).unwrap();
        assert!((pos - Vec2::new(40.0, 9.0)).length() < 1e-3);
    }

    #[test]
    fn toggle_round_trip_clears_snapshots() {
        let (_config, mut world, mut store, id) = setup();
        let mut freeze = FreezeState::new();
        freeze.toggle(&mut store, &mut world);
        assert!(freeze.is_paused());
        assert!(store.get(id).unwrap().frozen.is_some());
        freeze.toggle(&mut store, &mut world);
        assert!(!freeze.is_paused());
        assert!(store.get(id).unwrap().frozen.is_none());
    }
}
