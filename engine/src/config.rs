//! Sandbox Configuration
//!
//! Centralized tunable constants for the drawing, erasing, and connector
//! systems. Replaces hardcoded numbers scattered across the engines; every
//! value can be overridden from JSON. `Default` returns the values the
//! engines were tuned with.

use serde::Deserialize;
use thiserror::Error;

/// Error returned when a configuration document cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse sandbox config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Brush / stroke accumulation parameters.
///
/// Distances that scale with the brush are expressed as a ratio of the brush
/// diameter so one set of constants works for every brush size.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Pointer travel (ratio of brush diameter) before a new footprint is
    /// unioned into the stroke
    pub merge_threshold_ratio: f32,
    /// Maximum spacing (ratio of brush diameter) between interpolated
    /// footprints along a fast pointer move
    pub max_step_ratio: f32,
    /// Number of footprint merges between periodic simplification passes
    pub simplify_interval: u32,
    /// Perpendicular deviation tolerance for polyline simplification (px)
    pub simplify_epsilon: f32,
    /// Segment count of the circle-brush polygon approximation
    pub circle_segments: usize,
    /// Strokes below this area are discarded at finalize (px^2)
    pub min_polygon_area: f32,
    /// Regions clipped below this area are dropped (px^2)
    pub min_region_area: f32,
    /// Minimum seconds between eraser applications
    pub erase_min_interval: f32,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            merge_threshold_ratio: 0.15,
            max_step_ratio: 0.35,
            simplify_interval: 50,
            simplify_epsilon: 0.5,
            circle_segments: 64,
            min_polygon_area: 12.0,
            min_region_area: 6.0,
            erase_min_interval: 1.0 / 60.0,
        }
    }
}

/// Mass and collision-generation parameters shared by all bodies.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Scale from (area * density) to physics mass
    pub mass_scale: f32,
    /// Mass floor so near-empty bodies stay well-behaved
    pub min_body_mass: f32,
    /// Convex piece cap before falling back to a single boundary collider
    pub max_convex_pieces: usize,
    /// Linear damping applied to drawn bodies
    pub linear_damping: f32,
    /// Angular damping applied to drawn bodies
    pub angular_damping: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass_scale: 0.0015,
            min_body_mass: 0.5,
            max_convex_pieces: 24,
            linear_damping: 0.05,
            angular_damping: 0.05,
        }
    }
}

/// Fastener (bolt / elastic / rope) parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// World-space anchor gap (px) beyond which a bolt snaps
    pub max_tension_distance: f32,
    /// Physics ticks to wait before re-querying for a bolt's lost host body
    pub reattach_settle_ticks: u32,
    /// Elastic snaps when current length exceeds rest length times this
    pub elastic_snap_ratio: f32,
    /// Elastic spring stiffness
    pub elastic_stiffness: f32,
    /// Elastic spring damping
    pub elastic_damping: f32,
    /// Length of one rope segment (px)
    pub rope_segment_length: f32,
    /// Capsule radius of a rope segment (px)
    pub rope_segment_radius: f32,
    /// Rope is marked for removal when the endpoint span exceeds the
    /// creation-time span times this (tension only, slack is fine)
    pub rope_tension_ratio: f32,
    /// Distance (px) at which a sliding spool anchor counts as arrived
    pub spool_arrive_tolerance: f32,
    /// Slide speed (px/s) of the temporary spool anchor
    pub spool_slide_speed: f32,
    /// Search radius (px) when re-querying a body for bolt reattachment
    pub reattach_radius: f32,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            max_tension_distance: 12.0,
            reattach_settle_ticks: 6,
            elastic_snap_ratio: 4.0,
            elastic_stiffness: 40.0,
            elastic_damping: 2.0,
            rope_segment_length: 10.0,
            rope_segment_radius: 2.0,
            rope_tension_ratio: 1.5,
            spool_arrive_tolerance: 2.0,
            spool_slide_speed: 60.0,
            reattach_radius: 8.0,
        }
    }
}

/// Top-level configuration for a sketch session.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub draw: DrawConfig,
    pub body: BodyConfig,
    pub connector: ConnectorConfig,
    pub physics: PhysicsConfig,
}

/// Stepping parameters for the physics world.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed physics timestep (seconds)
    pub fixed_dt: f32,
    /// Gravity (px/s^2, +y is down in screen space)
    pub gravity: [f32; 2],
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            gravity: [0.0, 240.0],
        }
    }
}

impl SandboxConfig {
    /// Parse a configuration from a JSON document. Missing fields fall back
    /// to their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}
