//! Mutation guard.
//!
//! [`guard`] wraps a value in a *guarded view*: an exotic heap object that
//! reads through to the real target but refuses every mutating internal
//! method with a [`MutationAssertion`] naming the trap and the access path.
//!
//! A view is backed by a private stand-in object (see `shadow`) against which
//! every trap result is checked with the ES2020 proxy invariants.  Which trap
//! does what is decided by a [`TrapTable`] built once per view from its
//! [`GuardConfig`].  Nested values reached through reads are re-guarded
//! lazily, each with a config derived from (never written into) its parent's.

pub(crate) mod dispatch;
pub mod events;
pub mod failure;
pub(crate) mod mediator;
pub mod options;
pub mod path;
pub(crate) mod shadow;
pub mod traps;

pub use events::{GuardEvent, GuardEventType};
pub use failure::MutationAssertion;
pub use options::{AccessorRole, GuardConfig, GuardName, GuardOptions, OptionsError};
pub use traps::{TrapKind, TrapPolicy, TrapTable};

use std::rc::Rc;

use crate::heap::ObjectHeap;
use crate::object_model::{JsValue, ObjectError, ObjectHandle};
use options::GuardRequest;

// ---------------------------------------------------------------------------
// GuardedView
// ---------------------------------------------------------------------------

/// Heap representation of one guarded view.  Cloning is cheap: the config is
/// shared and the table is a flat copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedView {
    target: ObjectHandle,
    shadow: ObjectHandle,
    config: Rc<GuardConfig>,
    table: TrapTable,
}

impl GuardedView {
    /// The real object every operation is redirected to.
    pub fn target(&self) -> ObjectHandle {
        self.target
    }

    /// The stand-in that trap results are validated against.
    pub fn shadow(&self) -> ObjectHandle {
        self.shadow
    }

    pub fn config(&self) -> &GuardConfig {
        self.config.as_ref()
    }

    pub fn path(&self) -> &str {
        &self.config.path
    }

    pub fn table(&self) -> &TrapTable {
        &self.table
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Wrap `value` so that any attempt to mutate it through the result fails.
///
/// Primitives are returned unchanged.  Each call creates a fresh view, even
/// for a value that is already guarded or was guarded before.
pub fn guard(
    heap: &mut ObjectHeap,
    value: JsValue,
    options: &GuardOptions,
) -> Result<JsValue, ObjectError> {
    wrap(heap, value, GuardRequest::from(options))
}

pub(crate) fn wrap(
    heap: &mut ObjectHeap,
    value: JsValue,
    request: GuardRequest,
) -> Result<JsValue, ObjectError> {
    let JsValue::Object(target) = value else {
        return Ok(value);
    };
    let config = GuardConfig::resolve(heap, target, request)?;
    let shadow = shadow::allocate_shadow(heap, target)?;
    let table = TrapTable::for_config(&config);
    let path = config.path.clone();

    let handle = heap.alloc_guarded(GuardedView {
        target,
        shadow,
        config: Rc::new(config),
        table,
    });
    heap.emit_event(GuardEvent::new(GuardEventType::Wrapped, None, path));
    Ok(JsValue::Object(handle))
}

/// [`wrap`] for values statically known to be objects (accessor functions).
pub(crate) fn wrap_handle(
    heap: &mut ObjectHeap,
    target: ObjectHandle,
    request: GuardRequest,
) -> Result<ObjectHandle, ObjectError> {
    wrap(heap, JsValue::Object(target), request)?
        .as_object()
        .ok_or_else(|| ObjectError::TypeError(format!("{target} did not wrap to an object")))
}
