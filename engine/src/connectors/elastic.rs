//! Elastics
//!
//! A spring between two anchor points with rest length fixed at creation.
//! Unlike a bolt the elastic is meant to stretch; it only snaps at an
//! extreme multiple of its rest length. The tension ratio also drives a
//! green-yellow-red feedback ramp for the frontend.

use glam::Vec2;
use rapier2d::prelude::{point, ImpulseJointHandle, SpringJointBuilder};

use crate::body::{BodyId, BodyStore};
use crate::config::ConnectorConfig;
use crate::connectors::ConnectorOutcome;
use crate::world::PhysicsWorld;

pub struct Elastic {
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub local_a: Vec2,
    pub local_b: Vec2,
    pub rest_length: f32,
    joint: Option<ImpulseJointHandle>,
}

impl Elastic {
    /// Create a spring between world points `at_a` on `body_a` and `at_b`
    /// on `body_b`; the current separation becomes the rest length.
    pub fn create(
        config: &ConnectorConfig,
        store: &BodyStore,
        world: &mut PhysicsWorld,
        body_a: BodyId,
        at_a: Vec2,
        body_b: BodyId,
        at_b: Vec2,
    ) -> Option<Elastic> {
        let a = store.get(body_a)?;
        let b = store.get(body_b)?;
        let local_a = world.local_point(a.handle, at_a)?;
        let local_b = world.local_point(b.handle, at_b)?;
        let rest_length = (at_a - at_b).length().max(1e-3);
        let joint = world.insert_joint(
            a.handle,
            b.handle,
            SpringJointBuilder::new(
                rest_length,
                config.elastic_stiffness,
                config.elastic_damping,
            )
            .local_anchor1(point![local_a.x, local_a.y])
            .local_anchor2(point![local_b.x, local_b.y]),
        );
        Some(Elastic {
            body_a,
            body_b,
            local_a,
            local_b,
            rest_length,
            joint: Some(joint),
        })
    }

    pub fn world_anchors(
        &self,
        store: &BodyStore,
        world: &PhysicsWorld,
    ) -> Option<(Vec2, Vec2)> {
        let a = world.world_point(store.get(self.body_a)?.handle, self.local_a)?;
        let b = world.world_point(store.get(self.body_b)?.handle, self.local_b)?;
        Some((a, b))
    }

    /// Current length over rest length; 1.0 is relaxed.
    pub fn tension_ratio(&self, store: &BodyStore, world: &PhysicsWorld) -> Option<f32> {
        let (a, b) = self.world_anchors(store, world)?;
        Some((a - b).length() / self.rest_length)
    }

    /// Feedback color: green at rest through yellow to red at the snap
    /// threshold.
    pub fn tension_color(&self, config: &ConnectorConfig, ratio: f32) -> [f32; 3] {
        let t = ((ratio - 1.0) / (config.elastic_snap_ratio - 1.0)).clamp(0.0, 1.0);
        if t < 0.5 {
            // green -> yellow
            [t * 2.0, 1.0, 0.0]
        } else {
            // yellow -> red
            [1.0, 2.0 - t * 2.0, 0.0]
        }
    }

    pub fn tick(
        &mut self,
        config: &ConnectorConfig,
        store: &BodyStore,
        world: &mut PhysicsWorld,
    ) -> ConnectorOutcome {
        if !store.contains(self.body_a) || !store.contains(self.body_b) {
            return ConnectorOutcome::Lost;
        }
        let Some((a, b)) = self.world_anchors(store, world) else {
            return ConnectorOutcome::Lost;
        };
        if (a - b).length() > self.rest_length * config.elastic_snap_ratio {
            if let Some(handle) = self.joint.take() {
                world.remove_joint(handle);
            }
            return ConnectorOutcome::Snapped((a + b) * 0.5);
        }
        ConnectorOutcome::Keep
    }

    pub fn destroy(&mut self, world: &mut PhysicsWorld) {
        if let Some(handle) = self.joint.take() {
            world.remove_joint(handle);
        }
    }
}
