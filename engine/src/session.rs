//! Sketch Session
//!
//! The facade a frontend talks to. Owns the physics world, the body store,
//! the draw and connector engines, and the pause state; routes pointer
//! samples to the active tool and advances physics on a fixed timestep
//! accumulator. Frontends feed it one pointer sample and a frame delta per
//! update and render whatever `visual_polygons` and the event queue say.

use glam::Vec2;
use rapier2d::prelude::vector;

use crate::body::{BodyId, BodyStore, PaintLayer};
use crate::config::SandboxConfig;
use crate::connectors::{ConnectorEngine, ConnectorId, ConnectorKind};
use crate::draw::{footprint, DrawEngine};
use crate::events::SandboxEvent;
use crate::freeze::FreezeState;
use crate::input::{PointerSource, ToolEvent, ToolKind, ToolState};
use crate::materials::MaterialId;
use crate::geometry::Polygon;
use crate::world::PhysicsWorld;

/// A body being dragged with the select tool.
struct DragState {
    body: BodyId,
    /// Grab point in the body's local frame; the drag keeps it under the
    /// cursor.
    grab_local: Vec2,
}

pub struct SketchSession {
    config: SandboxConfig,
    world: PhysicsWorld,
    store: BodyStore,
    draw: DrawEngine,
    connectors: ConnectorEngine,
    freeze: FreezeState,
    tools: ToolState,
    events: Vec<SandboxEvent>,
    accumulator: f32,
    pointer_was_active: bool,
    drag: Option<DragState>,
}

impl SketchSession {
    pub fn new(config: SandboxConfig) -> Self {
        let world = PhysicsWorld::new(&config.physics);
        Self {
            config,
            world,
            store: BodyStore::new(),
            draw: DrawEngine::new(),
            connectors: ConnectorEngine::new(),
            freeze: FreezeState::new(),
            tools: ToolState::default(),
            events: Vec::new(),
            accumulator: 0.0,
            pointer_was_active: false,
            drag: None,
        }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn store(&self) -> &BodyStore {
        &self.store
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn connectors(&self) -> &ConnectorEngine {
        &self.connectors
    }

    pub fn is_paused(&self) -> bool {
        self.freeze.is_paused()
    }

    pub fn body_count(&self) -> usize {
        self.store.len()
    }

    /// Apply a UI state change. Switching tools ends an in-progress stroke
    /// as if the pointer were released and abandons any half-placed
    /// connector or drag.
    pub fn handle_event(&mut self, event: ToolEvent) {
        match event {
            ToolEvent::SelectTool(tool) => {
                if tool != self.tools.tool {
                    if self.draw.is_drawing() {
                        self.draw.end_stroke(
                            &self.config,
                            &mut self.store,
                            &mut self.world,
                            &mut self.events,
                        );
                        self.freeze
                            .freeze_new_bodies(&mut self.store, &mut self.world);
                    }
                    self.connectors.cancel_pending();
                    self.drag = None;
                    self.tools.tool = tool;
                }
            }
            ToolEvent::SetMaterial(material) => self.tools.material = material,
            ToolEvent::SetLayer(layer) => self.tools.layer = layer,
            ToolEvent::SetBrushShape(shape) => self.tools.brush_shape = shape,
            ToolEvent::SetBrushSize(size) => self.tools.brush_size = size.max(1.0),
            ToolEvent::SetDrawStatic(flag) => self.tools.draw_static = flag,
            ToolEvent::TogglePause => self.freeze.toggle(&mut self.store, &mut self.world),
        }
    }

    /// Feed one pointer sample and advance the simulation by `dt` seconds.
    pub fn update(&mut self, pointer: &dyn PointerSource, dt: f32) {
        let at = pointer.world_position();
        let active = pointer.is_active();
        let pressed = active && !self.pointer_was_active;
        let released = !active && self.pointer_was_active;
        self.pointer_was_active = active;

        self.draw.tick_erase_timer(dt);

        match self.tools.tool {
            ToolKind::Draw => self.update_draw(at, pressed, active, released),
            ToolKind::Erase => self.update_erase(at, active),
            ToolKind::Select => self.update_select(at, pressed, active, released),
            ToolKind::Bolt => self.update_connector_click(ConnectorKind::Bolt, at, pressed),
            ToolKind::Elastic => self.update_connector_click(ConnectorKind::Elastic, at, pressed),
            ToolKind::Rope => self.update_connector_click(ConnectorKind::Rope, at, pressed),
        }

        self.accumulator += dt;
        let fixed_dt = self.world.fixed_dt();
        while self.accumulator >= fixed_dt {
            self.accumulator -= fixed_dt;
            self.physics_tick();
        }
    }

    fn update_draw(&mut self, at: Vec2, pressed: bool, active: bool, released: bool) {
        if pressed {
            self.connectors.cancel_pending();
            self.draw.begin_stroke(
                &self.config,
                self.tools.brush_shape,
                self.tools.brush_size,
                Some(self.tools.material),
                self.tools.draw_static,
                self.tools.layer,
                at,
            );
        } else if active {
            self.draw.move_stroke(&self.config, at);
        }
        if released {
            self.draw.end_stroke(
                &self.config,
                &mut self.store,
                &mut self.world,
                &mut self.events,
            );
            self.freeze
                .freeze_new_bodies(&mut self.store, &mut self.world);
        }
    }

    fn update_erase(&mut self, at: Vec2, active: bool) {
        if !active || !self.draw.erase_ready() {
            return;
        }
        let eraser = footprint(
            self.tools.brush_shape,
            at,
            self.tools.brush_size,
            self.config.draw.circle_segments,
        );
        let changed = crate::draw::erase_with_footprint(
            &self.config,
            &mut self.store,
            &mut self.world,
            &mut self.events,
            &eraser,
            self.tools.layer,
        );
        self.draw.mark_erase_applied(&self.config);
        if changed {
            self.freeze
                .freeze_new_bodies(&mut self.store, &mut self.world);
        }
    }

    fn update_select(&mut self, at: Vec2, pressed: bool, active: bool, released: bool) {
        if pressed {
            if let Some(body) = self.store.body_at_point(&self.world, at, None) {
                if let Some(grab_local) = self
                    .store
                    .get(body)
                    .and_then(|b| self.world.local_point(b.handle, at))
                {
                    self.drag = Some(DragState { body, grab_local });
                }
            }
        }
        if active {
            if let Some(drag) = &self.drag {
                self.apply_drag(drag.body, drag.grab_local, at);
            }
        }
        if released {
            self.drag = None;
        }
    }

    /// Teleport-style drag: keep the grab point under the cursor and shed
    /// any accumulated velocity so the body does not fling on release.
    fn apply_drag(&mut self, id: BodyId, grab_local: Vec2, at: Vec2) {
        let Some(handle) = self.store.get(id).map(|b| b.handle) else {
            self.drag = None;
            return;
        };
        let Some((_, angle)) = self.world.pose(handle) else {
            return;
        };
        let (sin, cos) = angle.sin_cos();
        let rotated = Vec2::new(
            grab_local.x * cos - grab_local.y * sin,
            grab_local.x * sin + grab_local.y * cos,
        );
        let target = at - rotated;
        if let Some(body) = self.world.bodies.get_mut(handle) {
            body.set_translation(vector![target.x, target.y], true);
            if body.is_dynamic() {
                body.set_linvel(vector![0.0, 0.0], true);
                body.set_angvel(0.0, true);
            }
        }
    }

    fn update_connector_click(&mut self, kind: ConnectorKind, at: Vec2, pressed: bool) {
        if !pressed {
            return;
        }
        self.connectors.handle_click(
            &self.config.connector,
            &self.store,
            &mut self.world,
            kind,
            at,
            &mut self.events,
        );
    }

    fn physics_tick(&mut self) {
        if self.freeze.is_paused() {
            return;
        }
        self.world.step();
        self.connectors.tick(
            &self.config.connector,
            &self.store,
            &mut self.world,
            &mut self.events,
        );
    }

    /// Take everything that happened since the last drain.
    pub fn drain_events(&mut self) -> Vec<SandboxEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queue extra rope segments on a rope connector.
    pub fn spool_rope(&mut self, id: ConnectorId, segments: u32) -> bool {
        self.connectors.spool_rope(id, segments)
    }

    /// Delete a placed connector.
    pub fn remove_connector(&mut self, id: ConnectorId) -> bool {
        self.connectors
            .remove_connector(&mut self.world, id, &mut self.events)
    }

    /// Everything drawable this frame: world-space region polygons with
    /// material and paint plane, plus the in-progress stroke outline.
    pub fn visual_polygons(&self) -> Vec<(Polygon, Option<MaterialId>, PaintLayer)> {
        let mut out = Vec::new();
        for id in self.store.ids() {
            let Some(body) = self.store.get(id) else {
                continue;
            };
            for (polygon, material) in body.visual_polygons(&self.world) {
                out.push((polygon, material, body.layer));
            }
        }
        if let Some(stroke) = self.draw.stroke() {
            out.push((
                stroke.polygon().clone(),
                stroke.material,
                stroke.layer,
            ));
        }
        out
    }
}
