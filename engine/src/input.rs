//! Tool Input
//!
//! Pointer abstraction and tool selection state. The session only needs a
//! world-space cursor and a held/released flag per update; where they come
//! from (mouse, touch, replay script) is the frontend's business.

use glam::Vec2;

use crate::body::PaintLayer;
use crate::draw::BrushShape;
use crate::materials::MaterialId;

/// One pointer sampled once per frame.
pub trait PointerSource {
    /// Cursor position in world coordinates.
    fn world_position(&self) -> Vec2;
    /// True while the pointer is pressed.
    fn is_active(&self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolKind {
    Draw,
    Erase,
    Select,
    Bolt,
    Elastic,
    Rope,
}

/// Settings the active tool draws on. Mutated only through tool events so
/// mid-gesture changes are handled in one place.
#[derive(Clone, Copy, Debug)]
pub struct ToolState {
    pub tool: ToolKind,
    pub material: MaterialId,
    pub layer: PaintLayer,
    pub brush_shape: BrushShape,
    /// Brush diameter in world pixels.
    pub brush_size: f32,
    /// When set, finished strokes become immovable scenery.
    pub draw_static: bool,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tool: ToolKind::Draw,
            material: MaterialId::Wood,
            layer: PaintLayer::One,
            brush_shape: BrushShape::Circle,
            brush_size: 14.0,
            draw_static: false,
        }
    }
}

/// UI-originated state changes, applied between pointer samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToolEvent {
    SelectTool(ToolKind),
    SetMaterial(MaterialId),
    SetLayer(PaintLayer),
    SetBrushShape(BrushShape),
    SetBrushSize(f32),
    SetDrawStatic(bool),
    TogglePause,
}
