//! Ropes
//!
//! A rope is a chain of small capsule bodies linked by revolute joints,
//! pinned to a host body on one end and optionally to a second body on the
//! other. Ropes can also be spooled: extra segments are paid out one at a
//! time through a splice at the host anchor, driven by a kinematic anchor
//! that slides the splice point back into place.
//!
//! Segment pieces are physics bodies but not sketch bodies; they carry no
//! regions, cannot be painted on, and collide with nothing (see
//! [`rope_groups`](super::rope_groups)).

use glam::Vec2;
use rapier2d::prelude::{
    point, vector, ColliderBuilder, ImpulseJointHandle, RevoluteJointBuilder, RigidBodyBuilder,
    RigidBodyHandle,
};

use crate::body::{BodyId, BodyStore};
use crate::config::ConnectorConfig;
use crate::connectors::{rope_groups, ConnectorOutcome};
use crate::world::PhysicsWorld;

/// Hard cap on chain length; a rope asked to span further than this is
/// created truncated with a free end.
const MAX_SEGMENTS: usize = 120;

/// What the second click of rope placement landed on.
#[derive(Clone, Copy, Debug)]
pub enum RopeTarget {
    /// Attach to a body at this world point.
    Body(BodyId, Vec2),
    /// Empty space: the rope is laid out toward this point with a free end.
    Point(Vec2),
}

/// One chain link. `joint_next` connects this piece to the following one
/// and is `None` on the last piece.
struct RopeSegment {
    body: RigidBodyHandle,
    joint_next: Option<ImpulseJointHandle>,
}

/// State of the pay-out splice.
enum SpoolPhase {
    Idle,
    Sliding {
        /// Kinematic body temporarily holding the rope head.
        anchor: RigidBodyHandle,
        /// The segment being paid out.
        segment: RigidBodyHandle,
        joint_anchor: ImpulseJointHandle,
        /// Joint from the new segment to the old first segment.
        joint_tail: ImpulseJointHandle,
    },
}

pub struct Rope {
    pub body_a: BodyId,
    pub body_b: Option<BodyId>,
    pub local_a: Vec2,
    pub local_b: Option<Vec2>,
    segments: Vec<RopeSegment>,
    joint_head: Option<ImpulseJointHandle>,
    joint_tail: Option<ImpulseJointHandle>,
    /// Half of one segment length, fixed at creation.
    seg_half: f32,
    /// Endpoint span at creation time, stretched by spooling; the tension
    /// check compares against this.
    initial_span: f32,
    spool: SpoolPhase,
    pending_spool: u32,
}

impl Rope {
    /// Lay out and link a chain from a world point on `body_a` toward the
    /// target. Segment count is the span rounded to whole segments, at
    /// least one; a span past [`MAX_SEGMENTS`] truncates and frees the end.
    pub fn create(
        config: &ConnectorConfig,
        store: &BodyStore,
        world: &mut PhysicsWorld,
        body_a: BodyId,
        at_a: Vec2,
        target: RopeTarget,
    ) -> Option<Rope> {
        let a = store.get(body_a)?;
        let local_a = world.local_point(a.handle, at_a)?;

        let (end_world, mut body_b, mut local_b) = match target {
            RopeTarget::Body(id, at_b) => {
                let b = store.get(id)?;
                (at_b, Some(id), Some(world.local_point(b.handle, at_b)?))
            }
            RopeTarget::Point(p) => (p, None, None),
        };

        let span = (end_world - at_a).length();
        let dir = if span > 1e-3 {
            (end_world - at_a) / span
        } else {
            Vec2::Y
        };
        let seg_len = config.rope_segment_length;
        let wanted = ((span / seg_len).round() as usize).max(1);
        let count = wanted.min(MAX_SEGMENTS);
        if wanted > MAX_SEGMENTS {
            // cannot reach: dangle instead of attaching
            body_b = None;
            local_b = None;
        }
        let angle = dir.y.atan2(dir.x);
        let half = seg_len * 0.5;

        let mut segments: Vec<RopeSegment> = Vec::with_capacity(count);
        for i in 0..count {
            let center = at_a + dir * seg_len * (i as f32 + 0.5);
            let body = spawn_segment(config, world, center, angle);
            segments.push(RopeSegment {
                body,
                joint_next: None,
            });
        }

        let joint_head = Some(world.insert_joint(
            a.handle,
            segments[0].body,
            RevoluteJointBuilder::new()
                .local_anchor1(point![local_a.x, local_a.y])
                .local_anchor2(point![-half, 0.0])
                .contacts_enabled(false),
        ));
        for i in 0..count.saturating_sub(1) {
            let joint = world.insert_joint(
                segments[i].body,
                segments[i + 1].body,
                RevoluteJointBuilder::new()
                    .local_anchor1(point![half, 0.0])
                    .local_anchor2(point![-half, 0.0])
                    .contacts_enabled(false),
            );
            segments[i].joint_next = Some(joint);
        }
        let joint_tail = match (body_b, local_b) {
            (Some(id), Some(local)) => {
                let b = store.get(id)?;
                Some(world.insert_joint(
                    segments[count - 1].body,
                    b.handle,
                    RevoluteJointBuilder::new()
                        .local_anchor1(point![half, 0.0])
                        .local_anchor2(point![local.x, local.y])
                        .contacts_enabled(false),
                ))
            }
            _ => None,
        };

        println!("[Rope] created with {count} segments");
        Some(Rope {
            body_a,
            body_b,
            local_a,
            local_b,
            segments,
            joint_head,
            joint_tail,
            seg_half: half,
            initial_span: span.max(seg_len),
            spool: SpoolPhase::Idle,
            pending_spool: 0,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn pending(&self) -> u32 {
        self.pending_spool
    }

    pub fn is_spooling(&self) -> bool {
        matches!(self.spool, SpoolPhase::Sliding { .. })
    }

    /// Queue `n` additional segments to be paid out one per splice.
    pub fn spool(&mut self, n: u32) {
        self.pending_spool += n;
    }

    pub fn world_anchor_a(&self, store: &BodyStore, world: &PhysicsWorld) -> Option<Vec2> {
        world.world_point(store.get(self.body_a)?.handle, self.local_a)
    }

    pub fn world_anchor_b(&self, store: &BodyStore, world: &PhysicsWorld) -> Option<Vec2> {
        let id = self.body_b?;
        world.world_point(store.get(id)?.handle, self.local_b?)
    }

    /// Segment poses for the frontend.
    pub fn segment_poses(&self, world: &PhysicsWorld) -> Vec<(Vec2, f32)> {
        self.segments
            .iter()
            .filter_map(|s| world.pose(s.body))
            .collect()
    }

    /// Verify the chain is fully linked: head joint from the host to the
    /// first segment, each inter-segment joint between its neighbors, and
    /// the tail joint onto the second host when present.
    pub fn chain_intact(&self, store: &BodyStore, world: &PhysicsWorld) -> bool {
        let Some(host_a) = store.get(self.body_a).map(|b| b.handle) else {
            return false;
        };
        let Some(head) = self.joint_head.and_then(|h| world.impulse_joints.get(h)) else {
            return false;
        };
        if head.body1 != host_a || head.body2 != self.segments[0].body {
            return false;
        }
        for i in 0..self.segments.len() {
            let expect_next = i + 1 < self.segments.len();
            match self.segments[i].joint_next {
                Some(handle) => {
                    if !expect_next {
                        return false;
                    }
                    let Some(joint) = world.impulse_joints.get(handle) else {
                        return false;
                    };
                    if joint.body1 != self.segments[i].body
                        || joint.body2 != self.segments[i + 1].body
                    {
                        return false;
                    }
                }
                None => {
                    if expect_next {
                        return false;
                    }
                }
            }
        }
        if let Some(id) = self.body_b {
            let Some(host_b) = store.get(id).map(|b| b.handle) else {
                return false;
            };
            let Some(tail) = self.joint_tail.and_then(|h| world.impulse_joints.get(h)) else {
                return false;
            };
            let last = self.segments.last().map(|s| s.body);
            if Some(tail.body1) != last || tail.body2 != host_b {
                return false;
            }
        }
        true
    }

    /// Per-tick drive: host liveness, the spool splice machine, and the
    /// overstretch check.
    pub fn tick(
        &mut self,
        config: &ConnectorConfig,
        store: &BodyStore,
        world: &mut PhysicsWorld,
    ) -> ConnectorOutcome {
        if !store.contains(self.body_a) {
            self.destroy(world);
            return ConnectorOutcome::Lost;
        }
        if let Some(id) = self.body_b {
            if !store.contains(id) {
                // the far host died with its joint; fall back to dangling
                self.body_b = None;
                self.local_b = None;
                self.joint_tail = None;
            }
        }

        self.drive_spool(config, store, world);

        // Tension only applies to a both-ends rope between splices; a
        // mid-splice chain is intentionally short.
        if self.body_b.is_some() && matches!(self.spool, SpoolPhase::Idle) {
            let (Some(wa), Some(wb)) = (
                self.world_anchor_a(store, world),
                self.world_anchor_b(store, world),
            ) else {
                self.destroy(world);
                return ConnectorOutcome::Lost;
            };
            if (wa - wb).length() > self.initial_span * config.rope_tension_ratio {
                let mid = (wa + wb) * 0.5;
                self.destroy(world);
                return ConnectorOutcome::Snapped(mid);
            }
        }
        ConnectorOutcome::Keep
    }

    fn drive_spool(
        &mut self,
        config: &ConnectorConfig,
        store: &BodyStore,
        world: &mut PhysicsWorld,
    ) {
        let Some(target) = self.world_anchor_a(store, world) else {
            return;
        };

        match &self.spool {
            SpoolPhase::Idle => {
                if self.pending_spool > 0 {
                    self.begin_splice(config, world, target);
                }
            }
            SpoolPhase::Sliding { anchor, .. } => {
                let anchor = *anchor;
                let Some((pos, _)) = world.pose(anchor) else {
                    self.spool = SpoolPhase::Idle;
                    return;
                };
                if (pos - target).length() <= config.spool_arrive_tolerance {
                    self.finish_splice(store, world);
                    return;
                }
                let step = config.spool_slide_speed * world.fixed_dt();
                let next = pos + (target - pos).clamp_length_max(step);
                if let Some(body) = world.bodies.get_mut(anchor) {
                    body.set_next_kinematic_translation(vector![next.x, next.y]);
                }
            }
        }
    }

    /// Detach the first segment from the host, hang it from a kinematic
    /// anchor one segment length out, and thread a fresh segment between
    /// the anchor and the old chain head.
    fn begin_splice(&mut self, config: &ConnectorConfig, world: &mut PhysicsWorld, target: Vec2) {
        let first = self.segments[0].body;
        let seg_len = config.rope_segment_length;
        let half = self.seg_half;
        let head_world = world
            .world_point(first, Vec2::new(-half, 0.0))
            .unwrap_or(target);
        let mut away = (head_world - target).normalize_or_zero();
        if away.length_squared() < 0.5 {
            away = Vec2::Y;
        }
        // the anchor slides from one segment out back to the host anchor
        let start = target - away * seg_len;

        if let Some(old_head) = self.joint_head.take() {
            world.remove_joint(old_head);
        }

        let anchor = world.bodies.insert(
            RigidBodyBuilder::kinematic_position_based()
                .translation(vector![start.x, start.y])
                .build(),
        );
        let segment_center = (start + head_world) * 0.5;
        let dir = head_world - start;
        let segment = spawn_segment(config, world, segment_center, dir.y.atan2(dir.x));

        let joint_anchor = world.insert_joint(
            anchor,
            segment,
            RevoluteJointBuilder::new()
                .local_anchor2(point![-half, 0.0])
                .contacts_enabled(false),
        );
        let joint_tail = world.insert_joint(
            segment,
            first,
            RevoluteJointBuilder::new()
                .local_anchor1(point![half, 0.0])
                .local_anchor2(point![-half, 0.0])
                .contacts_enabled(false),
        );

        self.spool = SpoolPhase::Sliding {
            anchor,
            segment,
            joint_anchor,
            joint_tail,
        };
    }

    /// The anchor reached the host anchor point: swap it out for a direct
    /// joint and make the paid-out segment the new chain head.
    fn finish_splice(&mut self, store: &BodyStore, world: &mut PhysicsWorld) {
        let SpoolPhase::Sliding {
            anchor,
            segment,
            joint_anchor,
            joint_tail,
        } = std::mem::replace(&mut self.spool, SpoolPhase::Idle)
        else {
            return;
        };
        world.remove_joint(joint_anchor);
        world.remove_body(anchor);

        let Some(host) = store.get(self.body_a).map(|b| b.handle) else {
            return;
        };
        self.joint_head = Some(world.insert_joint(
            host,
            segment,
            RevoluteJointBuilder::new()
                .local_anchor1(point![self.local_a.x, self.local_a.y])
                .local_anchor2(point![-self.seg_half, 0.0])
                .contacts_enabled(false),
        ));
        self.segments.insert(
            0,
            RopeSegment {
                body: segment,
                joint_next: Some(joint_tail),
            },
        );
        self.initial_span += self.seg_half * 2.0;
        self.pending_spool = self.pending_spool.saturating_sub(1);
        println!("[Rope] spooled a segment, {} remaining", self.pending_spool);
    }

    /// Remove every piece, joint, and in-flight splice body.
    pub fn destroy(&mut self, world: &mut PhysicsWorld) {
        if let SpoolPhase::Sliding {
            anchor,
            segment,
            joint_anchor,
            joint_tail,
        } = std::mem::replace(&mut self.spool, SpoolPhase::Idle)
        {
            world.remove_joint(joint_anchor);
            world.remove_joint(joint_tail);
            world.remove_body(anchor);
            world.remove_body(segment);
        }
        if let Some(handle) = self.joint_head.take() {
            world.remove_joint(handle);
        }
        if let Some(handle) = self.joint_tail.take() {
            world.remove_joint(handle);
        }
        for segment in self.segments.drain(..) {
            if let Some(joint) = segment.joint_next {
                world.remove_joint(joint);
            }
            world.remove_body(segment.body);
        }
    }
}

/// Spawn one capsule chain link.
fn spawn_segment(
    config: &ConnectorConfig,
    world: &mut PhysicsWorld,
    center: Vec2,
    angle: f32,
) -> RigidBodyHandle {
    let handle = world.bodies.insert(
        RigidBodyBuilder::dynamic()
            .translation(vector![center.x, center.y])
            .rotation(angle)
            .linear_damping(0.3)
            .angular_damping(0.3)
            .build(),
    );
    world.insert_collider(
        ColliderBuilder::capsule_x(config.rope_segment_length * 0.5, config.rope_segment_radius)
            .collision_groups(rope_groups())
            .build(),
        handle,
    );
    handle
}
