//! Connectors
//!
//! Fasteners between finalized bodies: rigid bolts, stretchy elastics, and
//! multi-segment ropes. All are placed with the same two-click workflow and
//! driven once per physics tick. Connectors only read body geometry; they
//! never touch region data, and they tolerate their host bodies vanishing
//! between ticks (erased, split, merged away).

pub mod bolt;
pub mod elastic;
pub mod engine;
pub mod rope;

use glam::Vec2;
use rapier2d::prelude::{Group, InteractionGroups};

pub use bolt::Bolt;
pub use elastic::Elastic;
pub use engine::{ConnectorEngine, PendingAnchor};
pub use rope::{Rope, RopeTarget};

/// Stable identifier for a placed connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectorId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorKind {
    Bolt,
    Elastic,
    Rope,
}

/// Per-tick verdict for a connector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConnectorOutcome {
    Keep,
    /// Broke under stress; carries the world position for break effects.
    Snapped(Vec2),
    /// An endpoint became invalid and could not be recovered.
    Lost,
}

/// Rope pieces live in their own collision group so the chain drapes over
/// nothing and tangles with nothing; only the joints transmit force.
pub(crate) fn rope_groups() -> InteractionGroups {
    InteractionGroups::new(Group::GROUP_3, Group::NONE)
}
