//! Connector Tests - Bolts, Elastics, and Rope Spooling
//!
//! End-to-end coverage of the fastener systems against a live physics
//! world: a bolt carries a hanging body, overstress snaps fasteners with
//! an event, rope chains stay linked under simulation, and spooling pays
//! out exactly the queued number of segments.

use glam::Vec2;
use sketchbox_engine::body::{BodyId, BodyStore, PaintLayer};
use sketchbox_engine::config::SandboxConfig;
use sketchbox_engine::connectors::{ConnectorEngine, ConnectorKind, Rope, RopeTarget};
use sketchbox_engine::events::SandboxEvent;
use sketchbox_engine::geometry::Polygon;
use sketchbox_engine::materials::MaterialId;
use sketchbox_engine::region::MaterialRegion;
use sketchbox_engine::world::PhysicsWorld;

fn square(half: f32) -> Polygon {
    Polygon::new(vec![
        Vec2::new(-half, -half),
        Vec2::new(half, -half),
        Vec2::new(half, half),
        Vec2::new(-half, half),
    ])
}

#[allow(clippy::too_many_arguments)]
fn spawn_body(
    store: &mut BodyStore,
    world: &mut PhysicsWorld,
    config: &SandboxConfig,
    at: Vec2,
    half: f32,
    layer: PaintLayer,
    is_static: bool,
) -> BodyId {
    let region = MaterialRegion::new(square(half), Some(MaterialId::Wood));
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

fn run_ticks(
    config: &SandboxConfig,
    store: &BodyStore,
    world: &mut PhysicsWorld,
    engine: &mut ConnectorEngine,
    events: &mut Vec<SandboxEvent>,
    ticks: usize,
) {
    for _ in 0..ticks {
        world.step();
        engine.tick(&config.connector, store, world, events);
    }
}

// ============================================================================
// Bolts
// ============================================================================

#[test]
fn test_bolt_carries_a_hanging_body() {
    let config = SandboxConfig::default();
    let mut world = PhysicsWorld::new(&config.physics);
    let mut store = BodyStore::new();
    let mut engine = ConnectorEngine::new();
    let mut events = Vec::new();

    // static plate on plane one, loose plate on plane two, overlapping
    spawn_body(
        &mut store,
        &mut world,
        &config,
        Vec2::ZERO,
        12.0,
        PaintLayer::One,
        true,
    );
    let loose = spawn_body(
        &mut store,
        &mut world,
        &config,
        Vec2::new(8.0, 0.0),
        12.0,
        PaintLayer::Two,
        false,
    );

    engine.handle_click(
        &config.connector,
        &store,
        &mut world,
        ConnectorKind::Bolt,
        Vec2::new(4.0, 0.0),
        &mut events,
    );
    let id = engine
        .handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Bolt,
            Vec2::new(4.0, 0.0),
            &mut events,
        )
        .expect("second click on the other plane places the bolt");

    run_ticks(&config, &store, &mut world, &mut engine, &mut events, 240);
    assert!(engine.contains(id), "a modest load must not snap the bolt");

    let handle = store.get(loose).unwrap().handle;
    let (pos, _) = world.pose(handle).unwrap();
    assert!(
        pos.y < 30.0,
        "bolted body must hang instead of falling freely, y = {}",
        pos.y
    );
}

#[test]
fn test_bolt_snaps_when_anchors_are_torn_apart() {
    let config = SandboxConfig::default();
    let mut world = PhysicsWorld::new(&config.physics);
    let mut store = BodyStore::new();
    let mut engine = ConnectorEngine::new();
    let mut events = Vec::new();

    spawn_body(
        &mut store,
        &mut world,
        &config,
        Vec2::ZERO,
        12.0,
        PaintLayer::One,
        true,
    );
    let other = spawn_body(
        &mut store,
        &mut world,
        &config,
        Vec2::new(6.0, 0.0),
        12.0,
        PaintLayer::Two,
        true,
    );
    engine.handle_click(
        &config.connector,
        &store,
        &mut world,
        ConnectorKind::Bolt,
        Vec2::new(3.0, 0.0),
        &mut events,
    );
    let id = engine
        .handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Bolt,
            Vec2::new(3.0, 0.0),
            &mut events,
        )
        .unwrap();

    // both hosts are static, so the anchor gap persists exactly as set
    let handle = store.get(other).unwrap().handle;
    world
        .bodies
        .get_mut(handle)
        .unwrap()
        .set_translation(rapier2d::prelude::vector![100.0, 0.0], true);

    run_ticks(&config, &store, &mut world, &mut engine, &mut events, 2);
    assert!(!engine.contains(id), "torn bolt must be removed");
    assert!(
        events.iter().any(|e| matches!(
            e,
            SandboxEvent::ConnectorSnapped {
                kind: ConnectorKind::Bolt,
                ..
            }
        )),
        "the snap must be reported with its location"
    );
}

#[test]
fn test_bolt_with_both_hosts_gone_is_dropped_silently() {
    let config = SandboxConfig::default();
    let mut world = PhysicsWorld::new(&config.physics);
    let mut store = BodyStore::new();
    let mut engine = ConnectorEngine::new();
    let mut events = Vec::new();

    let a = spawn_body(
        &mut store,
        &mut world,
        &config,
        Vec2::ZERO,
        12.0,
        PaintLayer::One,
        true,
    );
    let b = spawn_body(
        &mut store,
        &mut world,
        &config,
        Vec2::new(6.0, 0.0),
        12.0,
        PaintLayer::Two,
        true,
    );
    engine.handle_click(
        &config.connector,
        &store,
        &mut world,
        ConnectorKind::Bolt,
        Vec2::new(3.0, 0.0),
        &mut events,
    );
    let id = engine
        .handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Bolt,
            Vec2::new(3.0, 0.0),
            &mut events,
        )
        .unwrap();

    store.despawn(&mut world, a);
    store.despawn(&mut world, b);
    run_ticks(&config, &store, &mut world, &mut engine, &mut events, 1);
    assert!(!engine.contains(id));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, SandboxEvent::ConnectorRemoved { .. })),
        "an orphaned bolt is removed, not snapped"
    );
}

// ============================================================================
// Ropes
// ============================================================================

#[test]
fn test_rope_chain_stays_linked_under_simulation() {
    let config = SandboxConfig::default();
    let mut world = PhysicsWorld::new(&config.physics);
    let mut store = BodyStore::new();
    let mut engine = ConnectorEngine::new();
    let mut events = Vec::new();

    let a = spawn_body(
        &mut store,
        &mut world,
        &config,
        Vec2::ZERO,
        10.0,
        PaintLayer::One,
        true,
    );
    let b = spawn_body(
        &mut store,
        &mut world,
        &config,
        Vec2::new(80.0, 0.0),
        10.0,
        PaintLayer::One,
        true,
    );
    engine.handle_click(
        &config.connector,
        &store,
        &mut world,
        ConnectorKind::Rope,
        Vec2::new(5.0, 0.0),
        &mut events,
    );
    let id = engine
        .handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Rope,
            Vec2::new(75.0, 0.0),
            &mut events,
        )
        .expect("second click on a body attaches the rope");

    run_ticks(&config, &store, &mut world, &mut engine, &mut events, 180);
    let rope = engine.rope(id).expect("rope survives a calm simulation");
    assert!(rope.chain_intact(&store, &world), "every link stays jointed");
    assert_eq!(rope.body_a, a);
    assert_eq!(rope.body_b, Some(b));
}

#[test]
fn test_rope_snaps_when_hosts_are_torn_apart() {
    let config = SandboxConfig::default();
    let mut world = PhysicsWorld::new(&config.physics);
    let mut store = BodyStore::new();
    let mut engine = ConnectorEngine::new();
    let mut events = Vec::new();

    spawn_body(
        &mut store,
        &mut world,
        &config,
        Vec2::ZERO,
        10.0,
        PaintLayer::One,
        true,
    );
    let b = spawn_body(
        &mut store,
        &mut world,
        &config,
        Vec2::new(60.0, 0.0),
        10.0,
        PaintLayer::One,
        true,
    );
    engine.handle_click(
        &config.connector,
        &store,
        &mut world,
        ConnectorKind::Rope,
        Vec2::new(5.0, 0.0),
        &mut events,
    );
    let id = engine
        .handle_click(
            &config.connector,
            &store,
            &mut world,
            ConnectorKind::Rope,
            Vec2::new(55.0, 0.0),
            &mut events,
        )
        .unwrap();
    let baseline = world.bodies.len();

    let handle = store.get(b).unwrap().handle;
    world
        .bodies
        .get_mut(handle)
        .unwrap()
        .set_translation(rapier2d::prelude::vector![300.0, 0.0], true);

    run_ticks(&config, &store, &mut world, &mut engine, &mut events, 2);
    assert!(!engine.contains(id), "overstretched rope must snap");
    assert!(
        world.bodies.len() < baseline,
        "snapped rope must clean up its segment bodies"
    );
    assert!(events.iter().any(|e| matches!(
        e,
        SandboxEvent::ConnectorSnapped {
            kind: ConnectorKind::Rope,
            ..
        }
    )));
}

#[test]
fn test_spooling_pays_out_exactly_the_queued_segments() {
    let config = SandboxConfig::default();
    let mut world = PhysicsWorld::new(&config.physics);
    let mut store = BodyStore::new();

    let host = spawn_body(
        &mut store,
        &mut world,
        &config,
        Vec2::ZERO,
        10.0,
        PaintLayer::One,
        true,
    );
    let mut rope = Rope::create(
        &config.connector,
        &store,
        &mut world,
        host,
        Vec2::new(0.0, 10.0),
        RopeTarget::Point(Vec2::new(0.0, 50.0)),
    )
    .unwrap();
    let before = rope.segment_count();

    rope.spool(5);
    rope.spool(5);
    assert_eq!(rope.pending(), 10);

    // each splice slides a fresh segment in; give the machine plenty of
    // ticks and require it to finish on its own
    let mut settled = false;
    for _ in 0..4000 {
        world.step();
        rope.tick(&config.connector, &store, &mut world);
        if rope.pending() == 0 && !rope.is_spooling() {
            settled = true;
            break;
        }
    }
    assert!(settled, "spooling must drain the queue");
    assert_eq!(
        rope.segment_count(),
        before + 10,
        "every queued segment must be paid out exactly once"
    );
    assert!(
        rope.chain_intact(&store, &world),
        "the spliced chain must stay fully linked"
    );
}
