//! Sandbox Events
//!
//! Structural changes the engines report each tick so a frontend can play
//! effects or update selection state. Drained from the session; the engines
//! never call back into presentation code.

use glam::Vec2;

use crate::body::BodyId;
use crate::connectors::{ConnectorId, ConnectorKind};

#[derive(Clone, Debug, PartialEq)]
pub enum SandboxEvent {
    /// A finished stroke produced a new body.
    BodySpawned { body: BodyId },
    /// A stroke bridged existing bodies; they were merged into one.
    BodiesMerged { into: BodyId, absorbed: Vec<BodyId> },
    /// Erasing disconnected a body; the new pieces got their own bodies.
    BodySplit { source: BodyId, spawned: Vec<BodyId> },
    /// A body lost all of its regions (or was removed with a tool).
    BodyDestroyed { body: BodyId },
    ConnectorCreated {
        connector: ConnectorId,
        kind: ConnectorKind,
    },
    /// A fastener exceeded its stress/stretch limit and broke.
    ConnectorSnapped {
        connector: ConnectorId,
        kind: ConnectorKind,
        at: Vec2,
    },
    ConnectorRemoved { connector: ConnectorId },
}
