#![forbid(unsafe_code)]

//! Mutation-assertion guards for test code.
//!
//! [`guard`] wraps a value from the native object model ([`object_model`],
//! [`heap`]) in a read-through view that refuses every mutating operation
//! with a [`MutationAssertion`] naming the operation and the access path,
//! for example `` Mutation assertion failed. `set` trap triggered on `target.a.b`. ``
//!
//! ```
//! use frankenengine_mutation_guard::{GuardOptions, JsValue, ObjectHeap, guard};
//!
//! let mut heap = ObjectHeap::new();
//! let config = heap.create_object();
//! heap.define_value(config, "retries", 3).unwrap();
//!
//! let view = guard(&mut heap, JsValue::Object(config), &GuardOptions::default())
//!     .unwrap()
//!     .as_object()
//!     .unwrap();
//! assert_eq!(heap.get_property(view, &"retries".into()).unwrap(), JsValue::Int(3));
//! let err = heap.set_property(view, "retries".into(), JsValue::Int(4)).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Mutation assertion failed. `set` trap triggered on `target.retries`."
//! );
//! ```

pub mod guard;
pub mod heap;
pub mod object_model;
pub mod reflect;

pub use guard::{
    GuardEvent, GuardEventType, GuardName, GuardOptions, MutationAssertion, OptionsError,
    TrapKind, guard,
};
pub use heap::ObjectHeap;
pub use object_model::{JsValue, ObjectError, ObjectHandle, PropertyDescriptor, PropertyKey};
