//! Sketchbox Engine Library
//!
//! A freeform drawing-to-physics construction toolkit. Brush strokes
//! accumulate into polygons, finished strokes become rigid bodies with
//! per-material patchwork regions, erasing clips geometry and splits bodies
//! that come apart, and bolts, elastics, and ropes fasten the results
//! together. Rendering and windowing stay outside; a frontend drives a
//! [`session::SketchSession`] with pointer samples and draws what
//! `visual_polygons` returns.
//!
//! # Modules
//!
//! - [`session`] - The facade frontends talk to
//! - [`draw`] - Brush footprints, stroke accumulation, erase and split
//! - [`body`] - Sketch bodies, the body store, collider generation
//! - [`connectors`] - Bolts, elastics, ropes and the placement workflow
//! - [`geometry`] - Polygons, boolean ops, simplification, decomposition
//! - [`materials`] - The paint palette and its physical properties
//! - [`freeze`] - Pause / restore of the whole simulation
//! - [`world`] - The physics world wrapper
//!
//! # Example
//!
//! ```ignore
//! use sketchbox_engine::config::SandboxConfig;
//! use sketchbox_engine::input::{ToolEvent, ToolKind};
//! use sketchbox_engine::session::SketchSession;
//!
//! let mut session = SketchSession::new(SandboxConfig::default());
//! session.handle_event(ToolEvent::SelectTool(ToolKind::Draw));
//! // per frame: session.update(&pointer, dt);
//! for (polygon, material, layer) in session.visual_polygons() {
//!     // tessellate and draw
//! }
//! ```

pub mod body;
pub mod config;
pub mod connectors;
pub mod draw;
pub mod events;
pub mod freeze;
pub mod geometry;
pub mod input;
pub mod materials;
pub mod region;
pub mod session;
pub mod world;

// Re-export the types a typical frontend needs at crate level
pub use body::{BodyId, PaintLayer};
pub use config::SandboxConfig;
pub use connectors::{ConnectorId, ConnectorKind};
pub use draw::BrushShape;
pub use events::SandboxEvent;
pub use input::{PointerSource, ToolEvent, ToolKind, ToolState};
pub use materials::MaterialId;
pub use session::SketchSession;
