//! Physics World
//!
//! Wrapper that owns every rapier structure needed to step the simulation.
//! The construction toolkit treats the physics engine as a collaborator: it
//! creates and removes bodies, colliders, and joints at discrete edit events
//! and reads poses/velocities back; integration itself stays inside rapier.

use glam::Vec2;
use rapier2d::prelude::*;

use crate::config::PhysicsConfig;

pub struct PhysicsWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    gravity: Vector<Real>,
}

impl PhysicsWorld {
    pub fn new(config: &PhysicsConfig) -> Self {
        let mut params = IntegrationParameters::default();
        params.dt = config.fixed_dt;
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            pipeline: PhysicsPipeline::new(),
            params,
            gravity: vector![config.gravity[0], config.gravity[1]],
        }
    }

    /// Advance the simulation by one fixed timestep.
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    pub fn fixed_dt(&self) -> f32 {
        self.params.dt
    }

    /// Remove a rigid body along with its colliders and attached joints.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.colliders
            .remove(handle, &mut self.islands, &mut self.bodies, true);
    }

    pub fn remove_joint(&mut self, handle: ImpulseJointHandle) {
        self.impulse_joints.remove(handle, true);
    }

    pub fn insert_collider(
        &mut self,
        collider: Collider,
        parent: RigidBodyHandle,
    ) -> ColliderHandle {
        self.colliders
            .insert_with_parent(collider, parent, &mut self.bodies)
    }

    pub fn insert_joint(
        &mut self,
        a: RigidBodyHandle,
        b: RigidBodyHandle,
        joint: impl Into<GenericJoint>,
    ) -> ImpulseJointHandle {
        self.impulse_joints.insert(a, b, joint, true)
    }

    /// Translation and rotation angle of a body, if it still exists.
    pub fn pose(&self, handle: RigidBodyHandle) -> Option<(Vec2, f32)> {
        let body = self.bodies.get(handle)?;
        let t = body.translation();
        Some((Vec2::new(t.x, t.y), body.rotation().angle()))
    }

    /// Map a body-local point into world space.
    pub fn world_point(&self, handle: RigidBodyHandle, local: Vec2) -> Option<Vec2> {
        let body = self.bodies.get(handle)?;
        let p = body.position() * point![local.x, local.y];
        Some(Vec2::new(p.x, p.y))
    }

    /// Map a world point into a body's local frame.
    pub fn local_point(&self, handle: RigidBodyHandle, world: Vec2) -> Option<Vec2> {
        let body = self.bodies.get(handle)?;
        let p = body.position().inverse_transform_point(&point![world.x, world.y]);
        Some(Vec2::new(p.x, p.y))
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Vec2 {
        self.bodies
            .get(handle)
            .map(|b| {
                let v = b.linvel();
                Vec2::new(v.x, v.y)
            })
            .unwrap_or(Vec2::ZERO)
    }
}
