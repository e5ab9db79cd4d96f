//! Bolts
//!
//! A bolt is a revolute joint pinning an anchor point on a layer-one body
//! to an anchor point on a layer-two body. Real joints are never infinitely
//! stiff, so the world-space gap between the two anchor points is measured
//! every physics tick; past the tension limit the bolt snaps. When a host
//! body disappears (erased or split away), the bolt waits a few ticks for
//! the replacement pieces to settle in, then re-queries that side's
//! original world position and either reattaches or gives up silently.

use glam::Vec2;
use rapier2d::prelude::{point, ImpulseJointHandle, RevoluteJointBuilder};

use crate::body::{BodyId, BodyStore, PaintLayer};
use crate::config::ConnectorConfig;
use crate::connectors::ConnectorOutcome;
use crate::world::PhysicsWorld;

#[derive(Clone, Copy, Debug)]
enum Side {
    A,
    B,
}

#[derive(Clone, Copy, Debug)]
struct Reattach {
    side: Side,
    ticks_left: u32,
}

pub struct Bolt {
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub local_a: Vec2,
    pub local_b: Vec2,
    layer_a: PaintLayer,
    layer_b: PaintLayer,
    /// World positions where the anchors were placed; reattachment queries
    /// the lost side's origin.
    origin_a: Vec2,
    origin_b: Vec2,
    joint: Option<ImpulseJointHandle>,
    reattach: Option<Reattach>,
}

impl Bolt {
    /// Pin an anchor at `at_a` on `body_a` to an anchor at `at_b` on
    /// `body_b`. The solver pulls the two anchor points together.
    pub fn create(
        store: &BodyStore,
        world: &mut PhysicsWorld,
        body_a: BodyId,
        at_a: Vec2,
        body_b: BodyId,
        at_b: Vec2,
    ) -> Option<Bolt> {
        let a = store.get(body_a)?;
        let b = store.get(body_b)?;
        let local_a = world.local_point(a.handle, at_a)?;
        let local_b = world.local_point(b.handle, at_b)?;
        let joint = world.insert_joint(
            a.handle,
            b.handle,
            RevoluteJointBuilder::new()
                .local_anchor1(point![local_a.x, local_a.y])
                .local_anchor2(point![local_b.x, local_b.y])
                .contacts_enabled(false),
        );
        Some(Bolt {
            body_a,
            body_b,
            local_a,
            local_b,
            layer_a: a.layer,
            layer_b: b.layer,
            origin_a: at_a,
            origin_b: at_b,
            joint: Some(joint),
            reattach: None,
        })
    }

    /// Per-tick drive: liveness, reattachment countdown, tension check.
    pub fn tick(
        &mut self,
        config: &ConnectorConfig,
        store: &BodyStore,
        world: &mut PhysicsWorld,
    ) -> ConnectorOutcome {
        // Lost hosts take priority over everything else.
        let a_alive = store.contains(self.body_a);
        let b_alive = store.contains(self.body_b);
        if !a_alive && !b_alive {
            return ConnectorOutcome::Lost;
        }
        if self.reattach.is_none() && (!a_alive || !b_alive) {
            // the joint died with its body; forget the stale handle
            if let Some(handle) = self.joint.take() {
                world.remove_joint(handle);
            }
            self.reattach = Some(Reattach {
                side: if a_alive { Side::B } else { Side::A },
                ticks_left: config.reattach_settle_ticks,
            });
        }

        if let Some(mut pending) = self.reattach.take() {
            if pending.ticks_left > 0 {
                pending.ticks_left -= 1;
                self.reattach = Some(pending);
                return ConnectorOutcome::Keep;
            }
            return self.try_reattach(config, store, world, pending.side);
        }

        // Tension: the joint should hold both anchors at the same world
        // point; a growing gap means the constraint is overstressed.
        let (Some(wa), Some(wb)) = (self.world_anchor_a(store, world), self.world_anchor_b(store, world))
        else {
            return ConnectorOutcome::Lost;
        };
        if (wa - wb).length() > config.max_tension_distance {
            if let Some(handle) = self.joint.take() {
                world.remove_joint(handle);
            }
            return ConnectorOutcome::Snapped((wa + wb) * 0.5);
        }
        ConnectorOutcome::Keep
    }

    fn try_reattach(
        &mut self,
        config: &ConnectorConfig,
        store: &BodyStore,
        world: &mut PhysicsWorld,
        side: Side,
    ) -> ConnectorOutcome {
        let (wanted_layer, origin) = match side {
            Side::A => (self.layer_a, self.origin_a),
            Side::B => (self.layer_b, self.origin_b),
        };
        let Some(found) =
            store.body_near_point(world, origin, config.reattach_radius, Some(wanted_layer))
        else {
            return ConnectorOutcome::Lost;
        };
        let Some(local) = store
            .get(found)
            .and_then(|b| world.local_point(b.handle, origin))
        else {
            return ConnectorOutcome::Lost;
        };
        match side {
            Side::A => {
                self.body_a = found;
                self.local_a = local;
            }
            Side::B => {
                self.body_b = found;
                self.local_b = local;
            }
        }
        let (Some(a), Some(b)) = (store.get(self.body_a), store.get(self.body_b)) else {
            return ConnectorOutcome::Lost;
        };
        self.joint = Some(world.insert_joint(
            a.handle,
            b.handle,
            RevoluteJointBuilder::new()
                .local_anchor1(point![self.local_a.x, self.local_a.y])
                .local_anchor2(point![self.local_b.x, self.local_b.y])
                .contacts_enabled(false),
        ));
        println!("[Bolt] reattached to body {:?}", found);
        ConnectorOutcome::Keep
    }

    pub fn world_anchor_a(&self, store: &BodyStore, world: &PhysicsWorld) -> Option<Vec2> {
        world.world_point(store.get(self.body_a)?.handle, self.local_a)
    }

    pub fn world_anchor_b(&self, store: &BodyStore, world: &PhysicsWorld) -> Option<Vec2> {
        world.world_point(store.get(self.body_b)?.handle, self.local_b)
    }

    /// Tear down physics state on removal.
    pub fn destroy(&mut self, world: &mut PhysicsWorld) {
        if let Some(handle) = self.joint.take() {
            world.remove_joint(handle);
        }
    }
}
