//! Connector Engine
//!
//! Owns every placed connector and the two-click workflow that creates
//! them: the first click records a body and a local anchor, the second
//! completes the fastener. A bolt's second click must land on a body on
//! the opposite paint plane; an elastic's on any other body; a rope's may
//! also land in empty space for a free-hanging chain. Clicking the same
//! body again (or empty space where a body is required) cancels the
//! placement without comment.

use std::collections::HashMap;

use glam::Vec2;

use crate::body::{BodyId, BodyStore};
use crate::config::ConnectorConfig;
use crate::connectors::{
    Bolt, ConnectorId, ConnectorKind, ConnectorOutcome, Elastic, Rope, RopeTarget,
};
use crate::events::SandboxEvent;
use crate::world::PhysicsWorld;

/// First click of a two-click placement. The anchor is stored in the
/// body's local frame so it rides along while physics keeps stepping
/// between the two clicks.
#[derive(Clone, Copy, Debug)]
pub struct PendingAnchor {
    pub kind: ConnectorKind,
    pub body: BodyId,
    pub local: Vec2,
}

enum Connector {
    Bolt(Bolt),
    Elastic(Elastic),
    Rope(Rope),
}

impl Connector {
    fn kind(&self) -> ConnectorKind {
        match self {
            Connector::Bolt(_) => ConnectorKind::Bolt,
            Connector::Elastic(_) => ConnectorKind::Elastic,
            Connector::Rope(_) => ConnectorKind::Rope,
        }
    }
}

#[derive(Default)]
pub struct ConnectorEngine {
    connectors: HashMap<ConnectorId, Connector>,
    pending: Option<PendingAnchor>,
    next_id: u64,
}

impl ConnectorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    pub fn contains(&self, id: ConnectorId) -> bool {
        self.connectors.contains_key(&id)
    }

    pub fn kind_of(&self, id: ConnectorId) -> Option<ConnectorKind> {
        self.connectors.get(&id).map(|c| c.kind())
    }

    pub fn ids(&self) -> Vec<ConnectorId> {
        let mut ids: Vec<ConnectorId> = self.connectors.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn pending_anchor(&self) -> Option<PendingAnchor> {
        self.pending
    }

    /// Forget a half-placed connector (tool switched, stroke started).
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    fn begin_anchor(
        &mut self,
        store: &BodyStore,
        world: &PhysicsWorld,
        kind: ConnectorKind,
        at: Vec2,
    ) {
        let Some(body) = store.body_at_point(world, at, None) else {
            return;
        };
        let Some(local) = store
            .get(body)
            .and_then(|host| world.local_point(host.handle, at))
        else {
            return;
        };
        self.pending = Some(PendingAnchor { kind, body, local });
    }

    /// Feed one placement click for the active connector tool.
    pub fn handle_click(
        &mut self,
        config: &ConnectorConfig,
        store: &BodyStore,
        world: &mut PhysicsWorld,
        kind: ConnectorKind,
        at: Vec2,
        events: &mut Vec<SandboxEvent>,
    ) -> Option<ConnectorId> {
        let Some(anchor) = self.pending.take() else {
            // first click: any body can take the anchor
            self.begin_anchor(store, world, kind, at);
            return None;
        };
        if anchor.kind != kind || !store.contains(anchor.body) {
            // stale anchor; treat this as a first click
            self.begin_anchor(store, world, kind, at);
            return None;
        }

        // Second click: bolts must cross planes, the others take any body.
        let hit = match kind {
            ConnectorKind::Bolt => {
                let other = store.get(anchor.body)?.layer.other();
                store.body_at_point(world, at, Some(other))
            }
            _ => store.body_at_point(world, at, None),
        };
        if hit == Some(anchor.body) {
            return None;
        }

        // the anchor body may have moved since the first click
        let at_a = store
            .get(anchor.body)
            .and_then(|host| world.world_point(host.handle, anchor.local))?;

        let connector = match kind {
            ConnectorKind::Bolt => {
                let body_b = hit?;
                Connector::Bolt(Bolt::create(store, world, anchor.body, at_a, body_b, at)?)
            }
            ConnectorKind::Elastic => {
                let body_b = hit?;
                Connector::Elastic(Elastic::create(
                    config, store, world, anchor.body, at_a, body_b, at,
                )?)
            }
            ConnectorKind::Rope => {
                let target = match hit {
                    Some(body_b) => RopeTarget::Body(body_b, at),
                    None => RopeTarget::Point(at),
                };
                Connector::Rope(Rope::create(
                    config, store, world, anchor.body, at_a, target,
                )?)
            }
        };
        Some(self.install(connector, events))
    }

    fn install(&mut self, connector: Connector, events: &mut Vec<SandboxEvent>) -> ConnectorId {
        let id = ConnectorId(self.next_id);
        self.next_id += 1;
        let kind = connector.kind();
        self.connectors.insert(id, connector);
        events.push(SandboxEvent::ConnectorCreated {
            connector: id,
            kind,
        });
        println!("[Connector] placed {kind:?} as {id:?}");
        id
    }

    /// Drive every connector one tick; snapped and orphaned ones are
    /// removed here.
    pub fn tick(
        &mut self,
        config: &ConnectorConfig,
        store: &BodyStore,
        world: &mut PhysicsWorld,
        events: &mut Vec<SandboxEvent>,
    ) {
        // a half-placed connector dies with its anchor body
        if let Some(pending) = self.pending {
            if !store.contains(pending.body) {
                self.pending = None;
            }
        }

        let mut ids: Vec<ConnectorId> = self.connectors.keys().copied().collect();
        ids.sort();
        for id in ids {
            let Some(connector) = self.connectors.get_mut(&id) else {
                continue;
            };
            let kind = connector.kind();
            let outcome = match connector {
                Connector::Bolt(bolt) => bolt.tick(config, store, world),
                Connector::Elastic(elastic) => elastic.tick(config, store, world),
                Connector::Rope(rope) => rope.tick(config, store, world),
            };
            match outcome {
                ConnectorOutcome::Keep => {}
                ConnectorOutcome::Snapped(at) => {
                    self.connectors.remove(&id);
                    events.push(SandboxEvent::ConnectorSnapped {
                        connector: id,
                        kind,
                        at,
                    });
                    println!("[Connector] {kind:?} {id:?} snapped at {at}");
                }
                ConnectorOutcome::Lost => {
                    self.connectors.remove(&id);
                    events.push(SandboxEvent::ConnectorRemoved { connector: id });
                }
            }
        }
    }

    /// Delete a connector and its physics state.
    pub fn remove_connector(
        &mut self,
        world: &mut PhysicsWorld,
        id: ConnectorId,
        events: &mut Vec<SandboxEvent>,
    ) -> bool {
        let Some(mut connector) = self.connectors.remove(&id) else {
            return false;
        };
        match &mut connector {
            Connector::Bolt(bolt) => bolt.destroy(world),
            Connector::Elastic(elastic) => elastic.destroy(world),
            Connector::Rope(rope) => rope.destroy(world),
        }
        events.push(SandboxEvent::ConnectorRemoved { connector: id });
        true
    }

    /// Queue extra segments on a rope connector.
    pub fn spool_rope(&mut self, id: ConnectorId, segments: u32) -> bool {
        match self.connectors.get_mut(&id) {
            Some(Connector::Rope(rope)) => {
                rope.spool(segments);
                true
            }
            _ => false,
        }
    }

    pub fn rope(&self, id: ConnectorId) -> Option<&Rope> {
        match self.connectors.get(&id) {
            Some(Connector::Rope(rope)) => Some(rope),
            _ => None,
        }
    }

    pub fn bolt(&self, id: ConnectorId) -> Option<&Bolt> {
        match self.connectors.get(&id) {
            Some(Connector::Bolt(bolt)) => Some(bolt),
            _ => None,
        }
    }

    pub fn elastic(&self, id: ConnectorId) -> Option<&Elastic> {
        match self.connectors.get(&id) {
            Some(Connector::Elastic(elastic)) => Some(elastic),
            _ => None,
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

    fn square(half: f32) -> Polygon {
        Polygon::new(vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ])
    }

    fn spawn(
        store: &mut BodyStore,
        world: &mut PhysicsWorld,
        config: &SandboxConfig,
        at: Vec2,
        layer: PaintLayer,
        is_static: bool,
    ) -> BodyId {
        let region = MaterialRegion::new(square(10.0), Some(MaterialId::Wood));
        store.spawn(
            world,
            &config.body,
            vec![region],
            at,
            0.0,
            layer,
            is_static,
            None,
        )
    }

    #[test]
    fn bolt_second_click_must_cross_planes() {
        let config = SandboxConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut store = BodyStore::new();
        let mut engine = ConnectorEngine::new();
        let mut events = Vec::new();

        spawn(
            &mut store,
            &mut world,
            &config,
            Vec2::ZERO,
            PaintLayer::One,
            true,
        );
        engine.handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Bolt,
            Vec2::ZERO,
            &mut events,
        );
        assert!(engine.pending_anchor().is_some());
        // no plane-two body exists, so the second click cancels
        let miss = engine.handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Bolt,
            Vec2::new(2.0, 0.0),
            &mut events,
        );
        assert!(miss.is_none());
        assert!(engine.is_empty());

        spawn(
            &mut store,
            &mut world,
            &config,
            Vec2::ZERO,
            PaintLayer::Two,
            true,
        );
        engine.handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Bolt,
            Vec2::ZERO,
            &mut events,
        );
        let hit = engine.handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Bolt,
            Vec2::ZERO,
            &mut events,
        );
        assert!(hit.is_some());
        assert_eq!(engine.len(), 1);
        assert!(matches!(
            events.last(),
            Some(SandboxEvent::ConnectorCreated {
                kind: ConnectorKind::Bolt,
                ..
            })
        ));
    }

    #[test]
    fn elastic_second_click_on_same_body_cancels() {
        let config = SandboxConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut store = BodyStore::new();
        let mut engine = ConnectorEngine::new();
        let mut events = Vec::new();

        spawn(
            &mut store,
            &mut world,
            &config,
            Vec2::ZERO,
            PaintLayer::One,
            true,
        );
        engine.handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Elastic,
            Vec2::new(2.0, 0.0),
            &mut events,
        );
        assert!(engine.pending_anchor().is_some());
        engine.handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Elastic,
            Vec2::new(-2.0, 0.0),
            &mut events,
        );
        assert!(engine.pending_anchor().is_none());
        assert!(engine.is_empty());
    }

    #[test]
    fn rope_to_empty_space_dangles() {
        let config = SandboxConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut store = BodyStore::new();
        let mut engine = ConnectorEngine::new();
        let mut events = Vec::new();

        spawn(
            &mut store,
            &mut world,
            &config,
            Vec2::ZERO,
            PaintLayer::One,
            true,
        );
        engine.handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Rope,
            Vec2::new(0.0, 8.0),
            &mut events,
        );
        let id = engine
            .handle_click(
                &config.connector,
                &store,
                &mut world,
                ConnectorKind::Rope,
                Vec2::new(0.0, 78.0),
                &mut events,
            )
            .unwrap();
        let rope = engine.rope(id).unwrap();
        assert!(rope.body_b.is_none());
        assert_eq!(rope.segment_count(), 7);
    }

    #[test]
    fn snapped_connector_is_removed_with_an_event() {
        let config = SandboxConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut store = BodyStore::new();
        let mut engine = ConnectorEngine::new();
        let mut events = Vec::new();

        let a = spawn(
            &mut store,
            &mut world,
            &config,
            Vec2::ZERO,
            PaintLayer::One,
            true,
        );
        let b = spawn(
            &mut store,
            &mut world,
            &config,
            Vec2::new(40.0, 0.0),
            PaintLayer::One,
            true,
        );
        engine.handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Elastic,
            Vec2::new(5.0, 0.0),
            &mut events,
        );
        let id = engine
            .handle_click(
                &config.connector,
                &store,
                &mut world,
                ConnectorKind::Elastic,
                Vec2::new(35.0, 0.0),
                &mut events,
            )
            .unwrap();

        // drag the far body out past the stretch limit
        let handle = store.get(b).unwrap().handle;
        if let Some(body) = world.bodies.get_mut(handle) {
            body.set_translation(rapier2d::prelude::vector![400.0, 0.0], true);
        }
        let _ = a;
        engine.tick(&config.connector, &store, &mut world, &mut events);
        assert!(!engine.contains(id));
        assert!(matches!(
            events.last(),
            Some(SandboxEvent::ConnectorSnapped {
                kind: ConnectorKind::Elastic,
                ..
            })
        ));
    }

    #[test]
    fn anchor_tracks_a_moving_body_between_clicks() {
        let config = SandboxConfig::default();
        let mut world = PhysicsWorld::new(&PhysicsConfig::default());
        let mut store = BodyStore::new();
        let mut engine = ConnectorEngine::new();
        let mut events = Vec::new();

        // anchor a falling body at its center, then let it drop a while
        // before the completing click
        let falling = spawn(
            &mut store,
            &mut world,
            &config,
            Vec2::ZERO,
            PaintLayer::One,
            false,
        );
        engine.handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Elastic,
            Vec2::ZERO,
            &mut events,
        );
        for _ in 0..60 {
            world.step();
        }

        spawn(
            &mut store,
            &mut world,
            &config,
            Vec2::new(200.0, 0.0),
            PaintLayer::One,
            true,
        );
        let id = engine
            .handle_click(
                &config.connector,
                &store,
                &mut world,
                ConnectorKind::Elastic,
                Vec2::new(200.0, 0.0),
                &mut events,
            )
            .unwrap();

        let elastic = engine.elastic(id).unwrap();
        let (anchor, _) = elastic.world_anchors(&store, &world).unwrap();
        let handle = store.get(falling).unwrap().handle;
        let (pos, _) = world.pose(handle).unwrap();
        assert!(
            (anchor - pos).length() < 1.0,
            "the first-click anchor must ride with its body, offset = {}",
            (anchor - pos).length()
        );
    }
}
