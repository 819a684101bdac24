//! Trap dispatch for guarded views.
//!
//! Every internal method the heap routes to a view lands in [`dispatch`],
//! which looks up the view's policy for the trap, runs it, and validates the
//! result against the stand-in before handing it back.

use super::events::GuardEvent;
use super::failure::MutationAssertion;
use super::mediator;
use super::options::{AccessorRole, GuardConfig, RequestedName};
use super::path::{call_path, prop_path};
use super::traps::{TrapCall, TrapOutcome, TrapPolicy};
use super::{GuardedView, wrap, wrap_handle};
use crate::heap::ObjectHeap;
use crate::object_model::{
    JsValue, ObjectError, ObjectHandle, OrdinaryObject, PropertyDescriptor, PropertyKey,
    TrapInvariantChecker,
};
use crate::reflect::Reflect;

/// Pseudo-property used in paths for prototype access.
const PROTO_KEY: &str = "__proto__";

pub(crate) fn dispatch(
    heap: &mut ObjectHeap,
    handle: ObjectHandle,
    call: TrapCall,
) -> Result<TrapOutcome, ObjectError> {
    let view = heap.guarded_view(handle)?.clone();
    let outcome = match view.table.policy(call.kind()) {
        TrapPolicy::Mediate => mediate(heap, &view, &call)?,
        TrapPolicy::Read => read(heap, &view, &call)?,
        TrapPolicy::Block => return Err(intercept(heap, &view, &call)),
        TrapPolicy::Forward => passthrough(heap, &view, &call)?,
    };
    check_invariants(heap.ordinary(view.shadow)?, &call, &outcome)?;
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

fn mediate(
    heap: &mut ObjectHeap,
    view: &GuardedView,
    call: &TrapCall,
) -> Result<TrapOutcome, ObjectError> {
    match call {
        TrapCall::GetOwnPropertyDescriptor { key } => Ok(TrapOutcome::Descriptor(
            mediator::get_own_property_descriptor(heap, view, key)?,
        )),
        other => forward(heap, view.target, other),
    }
}

fn read(
    heap: &mut ObjectHeap,
    view: &GuardedView,
    call: &TrapCall,
) -> Result<TrapOutcome, ObjectError> {
    let config = &view.config;
    if !config.rewraps_reads() {
        return forward(heap, view.target, call);
    }

    match call {
        TrapCall::Get { key, .. } => {
            if let Some(value) = settled_value(heap.ordinary(view.shadow)?, key) {
                return Ok(TrapOutcome::Value(value));
            }
            let real = forward(heap, view.target, call)?.into_value()?;
            let request = config.child(
                RequestedName::Key(key.clone()),
                config.path.clone(),
                AccessorRole::None,
            );
            Ok(TrapOutcome::Value(wrap(heap, real, request)?))
        }
        TrapCall::GetPrototypeOf => {
            let stand_in = heap.ordinary(view.shadow)?;
            if !stand_in.extensible {
                return Ok(TrapOutcome::Prototype(stand_in.prototype));
            }
            let real = forward(heap, view.target, call)?.into_prototype()?;
            Ok(TrapOutcome::Prototype(guard_prototype(heap, config, real)?))
        }
        TrapCall::Apply { .. } => {
            let real = forward(heap, view.target, call)?.into_value()?;
            let request = config.child(
                RequestedName::Hidden,
                call_path(&config.path),
                AccessorRole::None,
            );
            Ok(TrapOutcome::Value(wrap(heap, real, request)?))
        }
        other => forward(heap, view.target, other),
    }
}

/// A locked-in data property answers reads from the stand-in, since the
/// invariant requires the exact value the stand-in holds.
fn settled_value(stand_in: &OrdinaryObject, key: &PropertyKey) -> Option<JsValue> {
    match stand_in.get_own_property(key) {
        Some(PropertyDescriptor::Data {
            value,
            writable: false,
            configurable: false,
            ..
        }) => Some(value.clone()),
        _ => None,
    }
}

/// Guard a prototype reached through a view.
pub(crate) fn guard_prototype(
    heap: &mut ObjectHeap,
    config: &GuardConfig,
    prototype: Option<ObjectHandle>,
) -> Result<Option<ObjectHandle>, ObjectError> {
    let Some(p) = prototype else {
        return Ok(None);
    };
    let request = config.child(
        RequestedName::Key(PROTO_KEY.into()),
        config.path.clone(),
        AccessorRole::None,
    );
    Ok(Some(wrap_handle(heap, p, request)?))
}

/// Refuse a mutating trap.  The real target is never touched.
fn intercept(heap: &mut ObjectHeap, view: &GuardedView, call: &TrapCall) -> ObjectError {
    let base = &view.config.path;
    let path = match call {
        TrapCall::Apply { .. } => call_path(base),
        TrapCall::PreventExtensions => base.clone(),
        TrapCall::SetPrototypeOf { .. } => prop_path(base, &PROTO_KEY.into()),
        other => match other.key() {
            Some(key) => prop_path(base, key),
            None => base.clone(),
        },
    };
    heap.emit_event(GuardEvent::blocked(call.kind(), path.clone()));
    MutationAssertion::new(call.kind(), path).into()
}

/// Forward unchanged, then keep the stand-in consistent with what the
/// target just did.
fn passthrough(
    heap: &mut ObjectHeap,
    view: &GuardedView,
    call: &TrapCall,
) -> Result<TrapOutcome, ObjectError> {
    let outcome = forward(heap, view.target, call)?;
    match (call, &outcome) {
        (TrapCall::IsExtensible, TrapOutcome::Flag(false))
        | (TrapCall::PreventExtensions, TrapOutcome::Flag(true)) => {
            mediator::settle_extensibility(heap, view)?;
        }
        (TrapCall::DefineProperty { key, .. }, TrapOutcome::Flag(true)) => {
            mediator::refresh(heap, view, key)?;
        }
        (TrapCall::DeleteProperty { key }, TrapOutcome::Flag(true)) => {
            mediator::forget(heap, view, key)?;
        }
        _ => {}
    }
    Ok(outcome)
}

/// Perform `call` on the real target through `Reflect`.
fn forward(
    heap: &mut ObjectHeap,
    target: ObjectHandle,
    call: &TrapCall,
) -> Result<TrapOutcome, ObjectError> {
    Ok(match call {
        TrapCall::GetPrototypeOf => TrapOutcome::Prototype(Reflect::get_prototype_of(heap, target)?),
        TrapCall::SetPrototypeOf { proto } => {
            TrapOutcome::Flag(Reflect::set_prototype_of(heap, target, *proto)?)
        }
        TrapCall::IsExtensible => TrapOutcome::Flag(Reflect::is_extensible(heap, target)?),
        TrapCall::PreventExtensions => TrapOutcome::Flag(Reflect::prevent_extensions(heap, target)?),
        TrapCall::GetOwnPropertyDescriptor { key } => {
            TrapOutcome::Descriptor(Reflect::get_own_property_descriptor(heap, target, key)?)
        }
        TrapCall::DefineProperty { key, descriptor } => TrapOutcome::Flag(
            Reflect::define_property(heap, target, key.clone(), descriptor.clone())?,
        ),
        TrapCall::Has { key } => TrapOutcome::Flag(Reflect::has(heap, target, key)?),
        TrapCall::Get { key, receiver } => {
            TrapOutcome::Value(Reflect::get(heap, target, key, receiver)?)
        }
        TrapCall::Set {
            key,
            value,
            receiver,
        } => TrapOutcome::Flag(Reflect::set(
            heap,
            target,
            key.clone(),
            value.clone(),
            receiver,
        )?),
        TrapCall::DeleteProperty { key } => {
            TrapOutcome::Flag(Reflect::delete_property(heap, target, key)?)
        }
        TrapCall::OwnKeys => TrapOutcome::Keys(Reflect::own_keys(heap, target)?),
        TrapCall::Apply { this, args } => {
            TrapOutcome::Value(Reflect::apply(heap, &JsValue::Object(target), this, args)?)
        }
        TrapCall::Construct { args } => {
            TrapOutcome::Value(Reflect::construct(heap, &JsValue::Object(target), args)?)
        }
    })
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

fn check_invariants(
    stand_in: &OrdinaryObject,
    call: &TrapCall,
    outcome: &TrapOutcome,
) -> Result<(), ObjectError> {
    match (call, outcome) {
        (TrapCall::GetOwnPropertyDescriptor { key }, TrapOutcome::Descriptor(d)) => {
            TrapInvariantChecker::check_get_own_property(stand_in, key, d)
        }
        (TrapCall::DefineProperty { key, descriptor }, TrapOutcome::Flag(ok)) => {
            TrapInvariantChecker::check_define_own_property(stand_in, key, descriptor, *ok)
        }
        (TrapCall::Has { key }, TrapOutcome::Flag(found)) => {
            TrapInvariantChecker::check_has(stand_in, key, *found)
        }
        (TrapCall::Get { key, .. }, TrapOutcome::Value(v)) => {
            TrapInvariantChecker::check_get(stand_in, key, v)
        }
        (TrapCall::Set { key, value, .. }, TrapOutcome::Flag(ok)) => {
            TrapInvariantChecker::check_set(stand_in, key, value, *ok)
        }
        (TrapCall::DeleteProperty { key }, TrapOutcome::Flag(ok)) => {
            TrapInvariantChecker::check_delete(stand_in, key, *ok)
        }
        (TrapCall::OwnKeys, TrapOutcome::Keys(keys)) => {
            TrapInvariantChecker::check_own_keys(stand_in, keys)
        }
        (TrapCall::GetPrototypeOf, TrapOutcome::Prototype(p)) => {
            TrapInvariantChecker::check_get_prototype_of(stand_in, *p)
        }
        (TrapCall::SetPrototypeOf { proto }, TrapOutcome::Flag(ok)) => {
            TrapInvariantChecker::check_set_prototype_of(stand_in, *proto, *ok)
        }
        (TrapCall::IsExtensible, TrapOutcome::Flag(ext)) => {
            TrapInvariantChecker::check_is_extensible(stand_in, *ext)
        }
        (TrapCall::PreventExtensions, TrapOutcome::Flag(ok)) => {
            TrapInvariantChecker::check_prevent_extensions(stand_in, *ok)
        }
        (TrapCall::Apply { .. }, TrapOutcome::Value(_)) => Ok(()),
        (TrapCall::Construct { .. }, TrapOutcome::Value(v)) if v.is_object() => Ok(()),
        (TrapCall::Construct { .. }, TrapOutcome::Value(_)) => Err(ObjectError::TypeError(
            "construct: trap result must be an object".to_string(),
        )),
        (call, outcome) => Err(ObjectError::TypeError(format!(
            "{}: unexpected trap result {outcome:?}",
            call.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::events::GuardEventType;
    use crate::guard::{GuardOptions, TrapKind, guard};

    fn str_key(s: &str) -> PropertyKey {
        PropertyKey::String(s.to_string())
    }

    fn int_val(n: i64) -> JsValue {
        JsValue::Int(n)
    }

    fn guarded(heap: &mut ObjectHeap, target: ObjectHandle, options: &GuardOptions) -> ObjectHandle {
        guard(heap, JsValue::Object(target), options)
            .unwrap()
            .as_object()
            .unwrap()
    }

    fn assertion(err: ObjectError) -> MutationAssertion {
        err.as_mutation_assertion().cloned().unwrap()
    }

    // -----------------------------------------------------------------------
    // 1. Write interception
    // -----------------------------------------------------------------------

    #[test]
    fn blocked_paths_per_trap() {
        let mut heap = ObjectHeap::new();
        let target = heap.create_object();
        heap.define_value(target, "a", 1).unwrap();
        let view = guarded(&mut heap, target, &GuardOptions::default().with_prototype());

        let cases = [
            (
                TrapCall::Set {
                    key: str_key("a"),
                    value: int_val(2),
                    receiver: JsValue::Object(view),
                },
                TrapKind::Set,
                "target.a",
            ),
            (
                TrapCall::DefineProperty {
                    key: str_key("0"),
                    descriptor: PropertyDescriptor::data(int_val(2)),
                },
                TrapKind::DefineProperty,
                "target[0]",
            ),
            (
                TrapCall::DeleteProperty { key: str_key("a-b") },
                TrapKind::DeleteProperty,
                "target[\"a-b\"]",
            ),
            (TrapCall::PreventExtensions, TrapKind::PreventExtensions, "target"),
            (
                TrapCall::SetPrototypeOf { proto: None },
                TrapKind::SetPrototypeOf,
                "target.__proto__",
            ),
        ];
        for (call, trap, path) in cases {
            let err = assertion(dispatch(&mut heap, view, call).unwrap_err());
            assert_eq!(err, MutationAssertion::new(trap, path));
        }
        assert_eq!(heap.event_counts().get("blocked"), Some(&5));
        assert!(heap.is_extensible(target).unwrap());
        assert_eq!(heap.get_property(target, &str_key("a")).unwrap(), int_val(1));
    }

    #[test]
    fn blocked_event_carries_trap_and_path() {
        let mut heap = ObjectHeap::new();
        let target = heap.create_object();
        let view = guarded(&mut heap, target, &GuardOptions::default());
        heap.drain_events();

        let _ = heap.delete_property(view, &str_key("x"));
        assert_eq!(
            heap.drain_events(),
            vec![GuardEvent::blocked(TrapKind::DeleteProperty, "target.x")]
        );
    }

    // -----------------------------------------------------------------------
    // 2. Passthrough
    // -----------------------------------------------------------------------

    #[test]
    fn set_prototype_forwards_without_prototype_option() {
        let mut heap = ObjectHeap::new();
        let target = heap.create_object();
        let other = heap.create_object();
        let view = guarded(&mut heap, target, &GuardOptions::default());

        assert!(heap.set_prototype_of(view, Some(other)).unwrap());
        assert_eq!(heap.get_prototype_of(target).unwrap(), Some(other));
    }

    #[test]
    fn is_extensible_false_settles_stand_in() {
        let mut heap = ObjectHeap::new();
        let target = heap.create_object();
        heap.define_value(target, "a", 1).unwrap();
        heap.freeze(target).unwrap();
        let view = guarded(&mut heap, target, &GuardOptions::default());

        assert!(!heap.is_extensible(view).unwrap());
        let shadow = heap.guarded_view(view).unwrap().shadow();
        assert!(!heap.ordinary(shadow).unwrap().extensible);
        assert_eq!(heap.event_counts().get("settled"), Some(&1));
        assert_eq!(heap.keys(view).unwrap(), vec!["a"]);
    }

    #[test]
    fn invariant_violation_is_type_error_not_assertion() {
        let mut heap = ObjectHeap::new();
        let target = heap.create_object();
        let view = guarded(&mut heap, target, &GuardOptions::default());
        let shadow = heap.guarded_view(view).unwrap().shadow();
        // Lock the stand-in behind the view's back.
        heap.ordinary_mut(shadow).unwrap().prevent_extensions();

        let err = heap.is_extensible(view).unwrap_err();
        assert!(matches!(err, ObjectError::TypeError(_)));
        assert!(err.as_mutation_assertion().is_none());
    }

    // -----------------------------------------------------------------------
    // 3. Reads
    // -----------------------------------------------------------------------

    #[test]
    fn deep_get_uses_key_as_child_name() {
        let mut heap = ObjectHeap::new();
        let inner = heap.create_object();
        let target = heap.create_object();
        heap.define_value(target, "a", inner).unwrap();
        let view = guarded(&mut heap, target, &GuardOptions::deep());

        let child = heap.get_property(view, &str_key("a")).unwrap().as_object().unwrap();
        assert_eq!(heap.guarded_view(child).unwrap().path(), "target.a");
        assert_eq!(heap.underlying(child).unwrap(), inner);
    }

    #[test]
    fn guarded_prototype_read_uses_proto_segment() {
        let mut heap = ObjectHeap::new();
        let target = heap.create_object();
        let view = guarded(&mut heap, target, &GuardOptions::deep().with_prototype());

        let proto = heap.get_prototype_of(view).unwrap().unwrap();
        assert_eq!(heap.guarded_view(proto).unwrap().path(), "target.__proto__");
        assert_eq!(heap.underlying(proto).unwrap(), heap.object_prototype());
        let err = assertion(
            heap.set_property(proto, str_key("x"), int_val(1))
                .unwrap_err(),
        );
        assert_eq!(err.path, "target.__proto__.x");
    }

    #[test]
    fn wrapped_counts_follow_reads() {
        let mut heap = ObjectHeap::new();
        let target = heap.create_object();
        heap.define_value(target, "n", 1).unwrap();
        let view = guarded(&mut heap, target, &GuardOptions::deep());
        heap.get_property(view, &str_key("n")).unwrap();
        // Primitive results are not wrapped.
        let wrapped = heap
            .events()
            .iter()
            .filter(|e| e.event_type == GuardEventType::Wrapped)
            .count();
        assert_eq!(wrapped, 1);
    }
}
