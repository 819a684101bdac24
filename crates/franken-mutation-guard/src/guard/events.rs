//! Guard audit journal.
//!
//! The heap records one event per view creation, stand-in materialization,
//! extensibility settlement and refused mutation.  Events are never printed;
//! callers drain them with [`crate::heap::ObjectHeap::drain_events`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::traps::TrapKind;

/// Audit event emitted by a guarded view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardEvent {
    pub event_type: GuardEventType,
    /// Trap that produced the event, when one did.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trap: Option<TrapKind>,
    pub path: String,
}

/// Types of guard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardEventType {
    /// A new guarded view was created.
    Wrapped,
    /// A read-only descriptor was cached on a stand-in.
    Materialized,
    /// A stand-in was made non-extensible to match its target.
    Settled,
    /// A mutating trap was refused.
    Blocked,
}

impl fmt::Display for GuardEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wrapped => write!(f, "wrapped"),
            Self::Materialized => write!(f, "materialized"),
            Self::Settled => write!(f, "settled"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

impl GuardEvent {
    pub fn new(event_type: GuardEventType, trap: Option<TrapKind>, path: impl Into<String>) -> Self {
        Self {
            event_type,
            trap,
            path: path.into(),
        }
    }

    pub fn blocked(trap: TrapKind, path: impl Into<String>) -> Self {
        Self::new(GuardEventType::Blocked, Some(trap), path)
    }

    /// One-line JSON rendering for report collection.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for GuardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.trap {
            Some(trap) => write!(f, "{} `{trap}` on `{}`", self.event_type, self.path),
            None => write!(f, "{} `{}`", self.event_type, self.path),
        }
    }
}
