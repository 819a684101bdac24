//! Stand-in allocation.
//!
//! A guarded view never uses the real target as its own backing object: a
//! frozen or otherwise locked target would make most trap results violate
//! the invariants immediately.  The stand-in is a fresh, empty, extensible
//! object sharing the target's prototype (and therefore its constructor),
//! class tag and call/construct capabilities.

use crate::heap::ObjectHeap;
use crate::object_model::{ObjectError, ObjectHandle, OrdinaryObject};

pub(crate) fn allocate_shadow(
    heap: &mut ObjectHeap,
    target: ObjectHandle,
) -> Result<ObjectHandle, ObjectError> {
    let prototype = heap.get_prototype_of(target)?;
    let shadow = OrdinaryObject {
        prototype,
        class_tag: heap.class_tag(target)?,
        callable: heap.is_callable(target)?,
        constructable: heap.is_constructor(target)?,
        ..OrdinaryObject::default()
    };
    Ok(heap.alloc_ordinary(shadow))
}
