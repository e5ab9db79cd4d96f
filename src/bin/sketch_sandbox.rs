//! Headless sandbox demo.
//!
//! Drives a scripted session through the full toolkit: draws a static
//! floor and two stacked crates, fastens them, erases one apart, spools a
//! rope, and pauses mid-flight. Prints every sandbox event as it happens.
//! Useful as a smoke run and as a worked example of the session API.
//!
//! Usage: `sketch-sandbox [config.json]`

use std::env;
use std::fs;

use glam::Vec2;
use sketchbox_engine::{
    BrushShape, MaterialId, PaintLayer, PointerSource, SandboxConfig, SandboxEvent, SketchSession,
    ToolEvent, ToolKind,
};

/// Pointer state the script mutates between updates.
struct ScriptPointer {
    at: Vec2,
    held: bool,
}

impl PointerSource for ScriptPointer {
    fn world_position(&self) -> Vec2 {
        self.at
    }

    fn is_active(&self) -> bool {
        self.held
    }
}

struct Driver {
    session: SketchSession,
    pointer: ScriptPointer,
}

impl Driver {
    fn new(config: SandboxConfig) -> Self {
        Self {
            session: SketchSession::new(config),
            pointer: ScriptPointer {
                at: Vec2::ZERO,
                held: false,
            },
        }
    }

    fn frame(&mut self) {
        self.session.update(&self.pointer, 1.0 / 60.0);
        for event in self.session.drain_events() {
            report(&event);
        }
    }

    fn idle(&mut self, frames: usize) {
        self.pointer.held = false;
        for _ in 0..frames {
            self.frame();
        }
    }

    /// Sweep the pointer along a path with the button held, then release.
    fn stroke(&mut self, path: &[Vec2]) {
        for at in path {
            self.pointer.at = *at;
            self.pointer.held = true;
            self.frame();
        }
        self.pointer.held = false;
        self.frame();
    }

    fn click(&mut self, at: Vec2) {
        self.pointer.at = at;
        self.pointer.held = true;
        self.frame();
        self.pointer.held = false;
        self.frame();
    }

    /// Hold the pointer in place for a few frames (eraser dwell).
    fn dwell(&mut self, at: Vec2, frames: usize) {
        self.pointer.at = at;
        self.pointer.held = true;
        for _ in 0..frames {
            self.frame();
        }
        self.pointer.held = false;
        self.frame();
    }
}

fn report(event: &SandboxEvent) {
    println!("[Event] {event:?}");
}

fn line(from: Vec2, to: Vec2, steps: usize) -> Vec<Vec2> {
    (0..=steps)
        .map(|i| from.lerp(to, i as f32 / steps as f32))
        .collect()
}

fn main() {
    let config = match env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("cannot read config {path}: {e}"));
            SandboxConfig::from_json_str(&text)
                .unwrap_or_else(|e| panic!("cannot parse config {path}: {e}"))
        }
        None => SandboxConfig::default(),
    };

    let mut driver = Driver::new(config);

    // A wide static stone floor.
    driver.session.handle_event(ToolEvent::SetDrawStatic(true));
    driver
        .session
        .handle_event(ToolEvent::SetMaterial(MaterialId::Stone));
    driver
        .session
        .handle_event(ToolEvent::SetBrushSize(24.0));
    driver.stroke(&line(Vec2::new(-200.0, 200.0), Vec2::new(200.0, 200.0), 40));

    // Pause so the assembly can be built in place without falling.
    driver.session.handle_event(ToolEvent::TogglePause);

    // Two wooden crates above the floor, one per paint plane.
    driver.session.handle_event(ToolEvent::SetDrawStatic(false));
    driver
        .session
        .handle_event(ToolEvent::SetMaterial(MaterialId::Wood));
    driver
        .session
        .handle_event(ToolEvent::SetBrushShape(BrushShape::Square));
    driver
        .session
        .handle_event(ToolEvent::SetBrushSize(30.0));
    driver.stroke(&line(Vec2::new(-40.0, 100.0), Vec2::new(40.0, 100.0), 20));
    driver
        .session
        .handle_event(ToolEvent::SetLayer(PaintLayer::Two));
    driver.stroke(&line(Vec2::new(-40.0, 90.0), Vec2::new(40.0, 90.0), 20));

    // Bolt the planes together where they overlap: anchor click, then the
    // completing click picks the body on the other plane.
    driver
        .session
        .handle_event(ToolEvent::SelectTool(ToolKind::Bolt));
    driver.click(Vec2::new(0.0, 95.0));
    driver.click(Vec2::new(0.0, 95.0));

    // Hang a rope from the crate to empty space, then resume and let the
    // assembly drop onto the floor while paying out extra slack.
    driver
        .session
        .handle_event(ToolEvent::SelectTool(ToolKind::Rope));
    driver.click(Vec2::new(40.0, 100.0));
    driver.click(Vec2::new(100.0, 160.0));
    driver.session.handle_event(ToolEvent::TogglePause);
    let rope_id = driver
        .session
        .connectors()
        .ids()
        .into_iter()
        .find(|id| driver.session.connectors().rope(*id).is_some());
    if let Some(id) = rope_id {
        driver.session.spool_rope(id, 4);
    }
    driver.idle(180);

    // Erase a strip through the static floor; expect a split in two.
    driver
        .session
        .handle_event(ToolEvent::SelectTool(ToolKind::Erase));
    driver
        .session
        .handle_event(ToolEvent::SetLayer(PaintLayer::One));
    driver
        .session
        .handle_event(ToolEvent::SetBrushSize(30.0));
    driver.dwell(Vec2::new(0.0, 200.0), 30);
    driver.idle(60);

    // Pause, nudge a piece with the select tool, resume.
    driver.session.handle_event(ToolEvent::TogglePause);
    driver
        .session
        .handle_event(ToolEvent::SelectTool(ToolKind::Select));
    if let Some((polygon, _, _)) = driver.session.visual_polygons().into_iter().next() {
        let grab = polygon.centroid();
        driver.stroke(&line(grab, grab + Vec2::new(0.0, -60.0), 10));
    }
    driver.session.handle_event(ToolEvent::TogglePause);
    driver.idle(120);

    let polygons = driver.session.visual_polygons();
    println!(
        "[Demo] finished with {} bodies, {} connectors, {} visual polygons",
        driver.session.body_count(),
        driver.session.connectors().len(),
        polygons.len()
    );
}
