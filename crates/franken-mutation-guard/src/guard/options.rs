//! Guard configuration.
//!
//! [`GuardOptions`] is what callers pass in.  [`GuardConfig`] is the resolved,
//! immutable per-view configuration; each recursive wrap derives a fresh
//! [`GuardRequest`] from its parent's config rather than editing it.

use serde::{Deserialize, Serialize};

use super::path::prop_path;
use crate::heap::ObjectHeap;
use crate::object_model::{JsValue, ObjectError, ObjectHandle, PropertyKey};

/// Label used to seed a root path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NameRepr", into = "NameRepr")]
pub enum GuardName {
    /// Use the target's own `name` property when it is a string.
    #[default]
    Inferred,
    /// No label.
    Hidden,
    Label(String),
}

impl GuardName {
    fn is_inferred(&self) -> bool {
        matches!(self, Self::Inferred)
    }
}

/// JSON form: `false` hides the name, a string labels it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum NameRepr {
    Flag(bool),
    Label(String),
}

impl From<NameRepr> for GuardName {
    fn from(repr: NameRepr) -> Self {
        match repr {
            NameRepr::Flag(false) => Self::Hidden,
            NameRepr::Flag(true) => Self::Inferred,
            NameRepr::Label(s) => Self::Label(s),
        }
    }
}

impl From<GuardName> for NameRepr {
    fn from(name: GuardName) -> Self {
        match name {
            GuardName::Inferred => Self::Flag(true),
            GuardName::Hidden => Self::Flag(false),
            GuardName::Label(s) => Self::Label(s),
        }
    }
}

/// Caller-facing options for [`crate::guard::guard`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardOptions {
    /// Re-guard nested values reached through reads.
    pub deep: bool,
    /// Also intercept prototype reads and writes.
    pub prototype: bool,
    #[serde(skip_serializing_if = "GuardName::is_inferred")]
    pub name: GuardName,
    /// Root path label; defaults to the name, then to `"target"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("invalid guard options: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GuardOptions {
    pub fn deep() -> Self {
        Self {
            deep: true,
            ..Self::default()
        }
    }

    pub fn with_prototype(mut self) -> Self {
        self.prototype = true;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = GuardName::Label(name.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.name = GuardName::Hidden;
        self
    }

    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// Internal configuration
// ---------------------------------------------------------------------------

/// Whether a view stands for an accessor function reached through a
/// descriptor.  Never settable by callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessorRole {
    #[default]
    None,
    Getter,
    Setter,
}

/// Naming for one wrap request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RequestedName {
    Inferred,
    Hidden,
    Key(PropertyKey),
}

/// Everything needed to wrap one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GuardRequest {
    pub deep: bool,
    pub prototype: bool,
    pub name: RequestedName,
    pub path: Option<String>,
    pub role: AccessorRole,
}

impl From<&GuardOptions> for GuardRequest {
    fn from(options: &GuardOptions) -> Self {
        Self {
            deep: options.deep,
            prototype: options.prototype,
            name: match &options.name {
                GuardName::Inferred => RequestedName::Inferred,
                GuardName::Hidden => RequestedName::Hidden,
                GuardName::Label(s) => RequestedName::Key(PropertyKey::String(s.clone())),
            },
            path: options.path.clone(),
            role: AccessorRole::None,
        }
    }
}

/// Resolved configuration of one guarded view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    pub deep: bool,
    pub prototype: bool,
    /// Access path of this view from the root.
    pub path: String,
    pub role: AccessorRole,
}

impl GuardConfig {
    /// Resolve a request against its target: infer the name, then seed or
    /// extend the path with it.
    pub(crate) fn resolve(
        heap: &mut ObjectHeap,
        target: ObjectHandle,
        request: GuardRequest,
    ) -> Result<Self, ObjectError> {
        let name = match request.name {
            RequestedName::Key(key) => Some(key),
            RequestedName::Hidden => None,
            RequestedName::Inferred => match heap.get_property(target, &"name".into())? {
                JsValue::Str(s) => Some(PropertyKey::String(s)),
                _ => None,
            },
        };

        let path = match (request.path.filter(|p| !p.is_empty()), name) {
            (Some(base), Some(name)) => prop_path(&base, &name),
            (Some(base), None) => base,
            (None, Some(name)) => name.to_string(),
            (None, None) => "target".to_string(),
        };

        Ok(Self {
            deep: request.deep,
            prototype: request.prototype,
            path,
            role: request.role,
        })
    }

    /// Reads through this view hand back guarded results.
    pub fn rewraps_reads(&self) -> bool {
        self.deep || self.role == AccessorRole::Getter
    }

    pub fn is_shallow_setter(&self) -> bool {
        self.role == AccessorRole::Setter && !self.deep
    }

    /// Request for a value reached through this view.  Inherits the mode
    /// flags and resets the accessor role unless one is given.
    pub(crate) fn child(
        &self,
        name: RequestedName,
        path: String,
        role: AccessorRole,
    ) -> GuardRequest {
        GuardRequest {
            deep: self.deep,
            prototype: self.prototype,
            name,
            path: Some(path),
            role,
        }
    }
}
