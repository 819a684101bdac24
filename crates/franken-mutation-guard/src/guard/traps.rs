//! Trap dispatch table.
//!
//! Every internal method of a guarded view is one [`TrapKind`].  The
//! [`TrapTable`] built from a view's configuration assigns each trap a
//! [`TrapPolicy`]; traps the table does not claim are forwarded to the real
//! target unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::options::{AccessorRole, GuardConfig};
use crate::object_model::{JsValue, ObjectError, ObjectHandle, PropertyDescriptor, PropertyKey};

// ---------------------------------------------------------------------------
// TrapKind
// ---------------------------------------------------------------------------

/// One interceptable internal method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrapKind {
    GetPrototypeOf,
    SetPrototypeOf,
    IsExtensible,
    PreventExtensions,
    GetOwnPropertyDescriptor,
    DefineProperty,
    Has,
    Get,
    Set,
    DeleteProperty,
    OwnKeys,
    Apply,
    Construct,
}

impl TrapKind {
    pub const ALL: [TrapKind; 13] = [
        Self::GetPrototypeOf,
        Self::SetPrototypeOf,
        Self::IsExtensible,
        Self::PreventExtensions,
        Self::GetOwnPropertyDescriptor,
        Self::DefineProperty,
        Self::Has,
        Self::Get,
        Self::Set,
        Self::DeleteProperty,
        Self::OwnKeys,
        Self::Apply,
        Self::Construct,
    ];

    /// Host trap name, as it appears in failure messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::GetPrototypeOf => "getPrototypeOf",
            Self::SetPrototypeOf => "setPrototypeOf",
            Self::IsExtensible => "isExtensible",
            Self::PreventExtensions => "preventExtensions",
            Self::GetOwnPropertyDescriptor => "getOwnPropertyDescriptor",
            Self::DefineProperty => "defineProperty",
            Self::Has => "has",
            Self::Get => "get",
            Self::Set => "set",
            Self::DeleteProperty => "deleteProperty",
            Self::OwnKeys => "ownKeys",
            Self::Apply => "apply",
            Self::Construct => "construct",
        }
    }
}

impl fmt::Display for TrapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// TrapPolicy / TrapTable
// ---------------------------------------------------------------------------

/// What a guarded view does with one trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrapPolicy {
    /// Descriptor query reconciled against the stand-in.
    Mediate,
    /// Forwarded to the real target; the result may be re-guarded.
    Read,
    /// Refused with a mutation assertion.
    Block,
    /// Forwarded to the real target; result returned unmodified.
    Forward,
}

/// Per-view policy for every trap, indexed by [`TrapKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapTable {
    entries: [TrapPolicy; TrapKind::ALL.len()],
}

impl TrapTable {
    /// Build the table for one view.
    ///
    /// A setter view in shallow mode claims none of the write traps, so
    /// they fall through to the real target.
    pub fn for_config(config: &GuardConfig) -> Self {
        let mut table = Self {
            entries: [TrapPolicy::Forward; TrapKind::ALL.len()],
        };
        let shallow_setter = config.is_shallow_setter();

        table.claim(TrapKind::GetOwnPropertyDescriptor, TrapPolicy::Mediate);
        table.claim(TrapKind::Get, TrapPolicy::Read);
        if config.prototype {
            table.claim(TrapKind::GetPrototypeOf, TrapPolicy::Read);
        }

        if !shallow_setter {
            for trap in [
                TrapKind::Set,
                TrapKind::DefineProperty,
                TrapKind::DeleteProperty,
                TrapKind::PreventExtensions,
            ] {
                table.claim(trap, TrapPolicy::Block);
            }
            if config.prototype {
                table.claim(TrapKind::SetPrototypeOf, TrapPolicy::Block);
            }
        }

        match config.role {
            AccessorRole::Getter => table.claim(TrapKind::Apply, TrapPolicy::Read),
            AccessorRole::Setter if !shallow_setter => {
                table.claim(TrapKind::Apply, TrapPolicy::Block);
            }
            AccessorRole::Setter | AccessorRole::None => {}
        }

        table
    }

    fn claim(&mut self, trap: TrapKind, policy: TrapPolicy) {
        self.entries[trap as usize] = policy;
    }

    pub fn policy(&self, trap: TrapKind) -> TrapPolicy {
        self.entries[trap as usize]
    }

    /// Traps this table refuses, in `TrapKind` order.
    pub fn blocked(&self) -> Vec<TrapKind> {
        TrapKind::ALL
            .into_iter()
            .filter(|t| self.policy(*t) == TrapPolicy::Block)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TrapCall / TrapOutcome
// ---------------------------------------------------------------------------

/// One invocation of an internal method on a guarded view, with arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrapCall {
    GetPrototypeOf,
    SetPrototypeOf {
        proto: Option<ObjectHandle>,
    },
    IsExtensible,
    PreventExtensions,
    GetOwnPropertyDescriptor {
        key: PropertyKey,
    },
    DefineProperty {
        key: PropertyKey,
        descriptor: PropertyDescriptor,
    },
    Has {
        key: PropertyKey,
    },
    Get {
        key: PropertyKey,
        receiver: JsValue,
    },
    Set {
        key: PropertyKey,
        value: JsValue,
        receiver: JsValue,
    },
    DeleteProperty {
        key: PropertyKey,
    },
    OwnKeys,
    Apply {
        this: JsValue,
        args: Vec<JsValue>,
    },
    Construct {
        args: Vec<JsValue>,
    },
}

impl TrapCall {
    pub fn kind(&self) -> TrapKind {
        match self {
            Self::GetPrototypeOf => TrapKind::GetPrototypeOf,
            Self::SetPrototypeOf { .. } => TrapKind::SetPrototypeOf,
            Self::IsExtensible => TrapKind::IsExtensible,
            Self::PreventExtensions => TrapKind::PreventExtensions,
            Self::GetOwnPropertyDescriptor { .. } => TrapKind::GetOwnPropertyDescriptor,
            Self::DefineProperty { .. } => TrapKind::DefineProperty,
            Self::Has { .. } => TrapKind::Has,
            Self::Get { .. } => TrapKind::Get,
            Self::Set { .. } => TrapKind::Set,
            Self::DeleteProperty { .. } => TrapKind::DeleteProperty,
            Self::OwnKeys => TrapKind::OwnKeys,
            Self::Apply { .. } => TrapKind::Apply,
            Self::Construct { .. } => TrapKind::Construct,
        }
    }

    /// The property the call addresses, if any.
    pub fn key(&self) -> Option<&PropertyKey> {
        match self {
            Self::GetOwnPropertyDescriptor { key }
            | Self::DefineProperty { key, .. }
            | Self::Has { key }
            | Self::Get { key, .. }
            | Self::Set { key, .. }
            | Self::DeleteProperty { key } => Some(key),
            _ => None,
        }
    }
}

/// Result of a trap, shaped by the internal method that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrapOutcome {
    Value(JsValue),
    Flag(bool),
    Prototype(Option<ObjectHandle>),
    Descriptor(Option<PropertyDescriptor>),
    Keys(Vec<PropertyKey>),
}

fn mismatch(expected: &str, got: &TrapOutcome) -> ObjectError {
    ObjectError::TypeError(format!("trap produced {got:?} where {expected} was expected"))
}

impl TrapOutcome {
    pub fn into_value(self) -> Result<JsValue, ObjectError> {
        match self {
            Self::Value(v) => Ok(v),
            other => Err(mismatch("a value", &other)),
        }
    }

    pub fn into_flag(self) -> Result<bool, ObjectError> {
        match self {
            Self::Flag(b) => Ok(b),
            other => Err(mismatch("a boolean", &other)),
        }
    }

    pub fn into_prototype(self) -> Result<Option<ObjectHandle>, ObjectError> {
        match self {
            Self::Prototype(p) => Ok(p),
            other => Err(mismatch("a prototype", &other)),
        }
    }

    pub fn into_descriptor(self) -> Result<Option<PropertyDescriptor>, ObjectError> {
        match self {
            Self::Descriptor(d) => Ok(d),
            other => Err(mismatch("a descriptor", &other)),
        }
    }

    pub fn into_keys(self) -> Result<Vec<PropertyKey>, ObjectError> {
        match self {
            Self::Keys(k) => Ok(k),
            other => Err(mismatch("a key list", &other)),
        }
    }
}
