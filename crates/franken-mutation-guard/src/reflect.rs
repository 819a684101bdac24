//! ES2020 `Reflect` namespace.
//!
//! Static mirrors of each trap over the heap's internal methods.  Guarded
//! views reach their real target only through these functions.

use crate::heap::ObjectHeap;
use crate::object_model::{JsValue, ObjectError, ObjectHandle, PropertyDescriptor, PropertyKey};

/// ES2020 `Reflect` namespace: static methods mirroring the traps.
#[derive(Debug)]
pub struct Reflect;

impl Reflect {
    /// `Reflect.get(target, propertyKey, receiver)`: ES2020 §26.1.6.
    pub fn get(
        heap: &mut ObjectHeap,
        target: ObjectHandle,
        key: &PropertyKey,
        receiver: &JsValue,
    ) -> Result<JsValue, ObjectError> {
        heap.get_with_receiver(target, key, receiver)
    }

    /// `Reflect.set(target, propertyKey, value, receiver)`: ES2020 §26.1.13.
    pub fn set(
        heap: &mut ObjectHeap,
        target: ObjectHandle,
        key: PropertyKey,
        value: JsValue,
        receiver: &JsValue,
    ) -> Result<bool, ObjectError> {
        heap.set_with_receiver(target, key, value, receiver)
    }

    /// `Reflect.has(target, propertyKey)`: ES2020 §26.1.9.
    pub fn has(
        heap: &mut ObjectHeap,
        target: ObjectHandle,
        key: &PropertyKey,
    ) -> Result<bool, ObjectError> {
        heap.has_property(target, key)
    }

    /// `Reflect.deleteProperty(target, propertyKey)`: ES2020 §26.1.4.
    pub fn delete_property(
        heap: &mut ObjectHeap,
        target: ObjectHandle,
        key: &PropertyKey,
    ) -> Result<bool, ObjectError> {
        heap.delete_property(target, key)
    }

    /// `Reflect.ownKeys(target)`: ES2020 §26.1.11.
    pub fn own_keys(
        heap: &mut ObjectHeap,
        target: ObjectHandle,
    ) -> Result<Vec<PropertyKey>, ObjectError> {
        heap.own_property_keys(target)
    }

    /// `Reflect.getPrototypeOf(target)`: ES2020 §26.1.8.
    pub fn get_prototype_of(
        heap: &mut ObjectHeap,
        target: ObjectHandle,
    ) -> Result<Option<ObjectHandle>, ObjectError> {
        heap.get_prototype_of(target)
    }

    /// `Reflect.setPrototypeOf(target, proto)`: ES2020 §26.1.14.
    pub fn set_prototype_of(
        heap: &mut ObjectHeap,
        target: ObjectHandle,
        proto: Option<ObjectHandle>,
    ) -> Result<bool, ObjectError> {
        heap.set_prototype_of(target, proto)
    }

    /// `Reflect.isExtensible(target)`: ES2020 §26.1.10.
    pub fn is_extensible(heap: &mut ObjectHeap, target: ObjectHandle) -> Result<bool, ObjectError> {
        heap.is_extensible(target)
    }

    /// `Reflect.preventExtensions(target)`: ES2020 §26.1.12.
    pub fn prevent_extensions(
        heap: &mut ObjectHeap,
        target: ObjectHandle,
    ) -> Result<bool, ObjectError> {
        heap.prevent_extensions(target)
    }

    /// `Reflect.defineProperty(target, propertyKey, attributes)`: ES2020 §26.1.3.
    pub fn define_property(
        heap: &mut ObjectHeap,
        target: ObjectHandle,
        key: PropertyKey,
        desc: PropertyDescriptor,
    ) -> Result<bool, ObjectError> {
        heap.define_property(target, key, desc)
    }

    /// `Reflect.getOwnPropertyDescriptor(target, propertyKey)`: ES2020 §26.1.7.
    pub fn get_own_property_descriptor(
        heap: &mut ObjectHeap,
        target: ObjectHandle,
        key: &PropertyKey,
    ) -> Result<Option<PropertyDescriptor>, ObjectError> {
        heap.get_own_property_descriptor(target, key)
    }

    /// `Reflect.apply(target, thisArgument, argumentsList)`: ES2020 §26.1.1.
    pub fn apply(
        heap: &mut ObjectHeap,
        target: &JsValue,
        this: &JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, ObjectError> {
        heap.call(target, this, args)
    }

    /// `Reflect.construct(target, argumentsList)`: ES2020 §26.1.2.
    pub fn construct(
        heap: &mut ObjectHeap,
        target: &JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, ObjectError> {
        heap.construct(target, args)
    }
}
