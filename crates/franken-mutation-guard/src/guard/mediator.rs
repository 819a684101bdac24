//! Descriptor mediation.
//!
//! A view's stand-in doubles as a cache of read-only descriptors.  Once a
//! non-writable or non-configurable property has been reported, the stand-in
//! holds it and every later query is answered from there, so the invariant
//! checker always sees the same shape.

use super::dispatch::guard_prototype;
use super::events::{GuardEvent, GuardEventType};
use super::options::{AccessorRole, RequestedName};
use super::path::{DescriptorPart, descriptor_path, prop_path};
use super::traps::TrapKind;
use super::{GuardedView, wrap, wrap_handle};
use crate::heap::ObjectHeap;
use crate::object_model::{ObjectError, PropertyDescriptor, PropertyKey};

/// `getOwnPropertyDescriptor` on a view.
pub(crate) fn get_own_property_descriptor(
    heap: &mut ObjectHeap,
    view: &GuardedView,
    key: &PropertyKey,
) -> Result<Option<PropertyDescriptor>, ObjectError> {
    if let Some(cached) = heap.ordinary(view.shadow)?.get_own_property(key) {
        return Ok(Some(cached.clone()));
    }
    let Some(descriptor) = heap.get_own_property_descriptor(view.target, key)? else {
        return Ok(None);
    };
    let descriptor = guard_descriptor(heap, view, key, descriptor, Origin::Query)?;
    if descriptor.is_read_only() {
        materialize(heap, view, key, &descriptor)?;
    }
    Ok(Some(descriptor))
}

/// Why a descriptor is being guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Answering `getOwnPropertyDescriptor`: parts are named after the
    /// descriptor field they came from.
    Query,
    /// Filling a stand-in that is about to be locked.  Cached data values
    /// are later handed out by `get`, so they are named like a `get` result.
    Settle,
}

/// Re-guard the parts of a descriptor the configuration asks for.  Setters
/// are always guarded; values and getters only in deep mode.
fn guard_descriptor(
    heap: &mut ObjectHeap,
    view: &GuardedView,
    key: &PropertyKey,
    descriptor: PropertyDescriptor,
    origin: Origin,
) -> Result<PropertyDescriptor, ObjectError> {
    let config = &view.config;
    let request = |part: DescriptorPart, role: AccessorRole| {
        config.child(
            RequestedName::Hidden,
            descriptor_path(&config.path, key, part),
            role,
        )
    };

    Ok(match descriptor {
        PropertyDescriptor::Data {
            value,
            writable,
            enumerable,
            configurable,
        } => {
            let value = match origin {
                _ if !config.deep => value,
                Origin::Query => {
                    wrap(heap, value, request(DescriptorPart::Value, AccessorRole::None))?
                }
                Origin::Settle => {
                    let child = config.child(
                        RequestedName::Key(key.clone()),
                        config.path.clone(),
                        AccessorRole::None,
                    );
                    wrap(heap, value, child)?
                }
            };
            PropertyDescriptor::Data {
                value,
                writable,
                enumerable,
                configurable,
            }
        }
        PropertyDescriptor::Accessor {
            get,
            set,
            enumerable,
            configurable,
        } => {
            let get = match get {
                Some(g) if config.deep => Some(wrap_handle(
                    heap,
                    g,
                    request(DescriptorPart::Get, AccessorRole::Getter),
                )?),
                other => other,
            };
            let set = match set {
                Some(s) => Some(wrap_handle(
                    heap,
                    s,
                    request(DescriptorPart::Set, AccessorRole::Setter),
                )?),
                None => None,
            };
            PropertyDescriptor::Accessor {
                get,
                set,
                enumerable,
                configurable,
            }
        }
    })
}

fn materialize(
    heap: &mut ObjectHeap,
    view: &GuardedView,
    key: &PropertyKey,
    descriptor: &PropertyDescriptor,
) -> Result<(), ObjectError> {
    let stand_in = heap.ordinary_mut(view.shadow)?;
    if !stand_in.define_own_property(key.clone(), descriptor.clone())? {
        return Err(ObjectError::TypeError(format!(
            "cannot materialize property '{key}' on stand-in"
        )));
    }
    heap.emit_event(GuardEvent::new(
        GuardEventType::Materialized,
        Some(TrapKind::GetOwnPropertyDescriptor),
        prop_path(&view.config.path, key),
    ));
    Ok(())
}

/// Bring the stand-in in line with a target that is no longer extensible.
///
/// Every own property is cached (read-only or not), the prototype is copied
/// and the stand-in is locked.  No-op once the stand-in is already locked.
pub(crate) fn settle_extensibility(
    heap: &mut ObjectHeap,
    view: &GuardedView,
) -> Result<(), ObjectError> {
    if !heap.ordinary(view.shadow)?.extensible {
        return Ok(());
    }

    for key in heap.own_property_keys(view.target)? {
        if heap.ordinary(view.shadow)?.has_own_property(&key) {
            continue;
        }
        if let Some(descriptor) = heap.get_own_property_descriptor(view.target, &key)? {
            let descriptor = guard_descriptor(heap, view, &key, descriptor, Origin::Settle)?;
            materialize(heap, view, &key, &descriptor)?;
        }
    }

    let real = heap.get_prototype_of(view.target)?;
    let prototype = if view.config.prototype && view.config.rewraps_reads() {
        guard_prototype(heap, &view.config, real)?
    } else {
        real
    };

    let stand_in = heap.ordinary_mut(view.shadow)?;
    stand_in.prototype = prototype;
    stand_in.prevent_extensions();
    heap.emit_event(GuardEvent::new(
        GuardEventType::Settled,
        None,
        view.config.path.clone(),
    ));
    Ok(())
}

/// After a forwarded define, bring the cached entry for `key` in line with
/// the target.  A read-only descriptor replaces it; anything else drops a
/// configurable one, unless the stand-in is settled and must keep every key.
pub(crate) fn refresh(
    heap: &mut ObjectHeap,
    view: &GuardedView,
    key: &PropertyKey,
) -> Result<(), ObjectError> {
    let Some(descriptor) = heap.get_own_property_descriptor(view.target, key)? else {
        return forget(heap, view, key);
    };
    let settled = !heap.ordinary(view.shadow)?.extensible;
    if !descriptor.is_read_only() && !settled {
        return forget(heap, view, key);
    }
    let descriptor = guard_descriptor(heap, view, key, descriptor, Origin::Query)?;
    // The define already succeeded on the target, so the stand-in may
    // take the new shape unconditionally.
    heap.ordinary_mut(view.shadow)?
        .properties
        .insert(key.clone(), descriptor);
    heap.emit_event(GuardEvent::new(
        GuardEventType::Materialized,
        Some(TrapKind::DefineProperty),
        prop_path(&view.config.path, key),
    ));
    Ok(())
}

/// After a forwarded delete, drop a configurable cached entry.
pub(crate) fn forget(
    heap: &mut ObjectHeap,
    view: &GuardedView,
    key: &PropertyKey,
) -> Result<(), ObjectError> {
    let stand_in = heap.ordinary_mut(view.shadow)?;
    if stand_in
        .get_own_property(key)
        .is_some_and(|d| d.is_configurable())
    {
        stand_in.properties.remove(key);
    }
    Ok(())
}
