//! Drawing and erasing
//!
//! Brush footprints, stroke accumulation, stroke finalization into bodies,
//! and eraser clipping with split-on-disconnect.

pub mod brush;
pub mod engine;
pub mod erase;
pub mod stroke;

pub use brush::{footprint, BrushShape};
pub use engine::DrawEngine;
pub use erase::{connected_components, erase_with_footprint};
pub use stroke::StrokeInProgress;
