//! The single failure kind raised by a guarded view.

use serde::{Deserialize, Serialize};

use super::traps::TrapKind;

/// A mutating operation reached a guarded view.
///
/// Raised synchronously, before the operation touches the underlying value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("Mutation assertion failed. `{trap}` trap triggered on `{path}`.")]
pub struct MutationAssertion {
    pub trap: TrapKind,
    pub path: String,
}

impl MutationAssertion {
    pub fn new(trap: TrapKind, path: impl Into<String>) -> Self {
        Self {
            trap,
            path: path.into(),
        }
    }
}
