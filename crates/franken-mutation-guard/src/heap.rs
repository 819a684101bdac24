//! Managed object heap.
//!
//! Arena of ordinary objects and guarded views, plus the native function
//! table and a handful of intrinsics.  Every internal method checks whether
//! the handle is a guarded view and, if so, routes the call through the
//! view's trap table; ordinary objects get ES2020 ordinary semantics.  The
//! object-level helpers (`keys`, `freeze`, ...) are written purely in terms of
//! internal methods so they observe guarded views exactly as script would.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use crate::guard::dispatch::dispatch;
use crate::guard::events::GuardEvent;
use crate::guard::options::GuardOptions;
use crate::guard::traps::TrapCall;
use crate::guard::GuardedView;
use crate::object_model::{
    FunctionId, JsValue, MAX_PROTOTYPE_CHAIN_DEPTH, ObjectError, ObjectHandle, OrdinaryObject,
    PropertyDescriptor, PropertyKey, SymbolId,
};

/// Native behavior of a callable object: `(heap, this, args)`.
pub type NativeFn = Rc<dyn Fn(&mut ObjectHeap, &JsValue, &[JsValue]) -> Result<JsValue, ObjectError>>;

// ---------------------------------------------------------------------------
// ManagedObject
// ---------------------------------------------------------------------------

/// A managed object: ordinary, or a guarded view over another object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagedObject {
    Ordinary(OrdinaryObject),
    Guarded(GuardedView),
}

impl ManagedObject {
    pub fn as_ordinary(&self) -> Option<&OrdinaryObject> {
        match self {
            Self::Ordinary(o) => Some(o),
            Self::Guarded(_) => None,
        }
    }

    pub fn as_ordinary_mut(&mut self) -> Option<&mut OrdinaryObject> {
        match self {
            Self::Ordinary(o) => Some(o),
            Self::Guarded(_) => None,
        }
    }

    pub fn as_guarded(&self) -> Option<&GuardedView> {
        match self {
            Self::Guarded(g) => Some(g),
            Self::Ordinary(_) => None,
        }
    }
}

/// Handles of the built-in objects every heap starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Intrinsics {
    object_prototype: ObjectHandle,
    function_prototype: ObjectHandle,
    object_constructor: ObjectHandle,
}

// ---------------------------------------------------------------------------
// ObjectHeap
// ---------------------------------------------------------------------------

pub struct ObjectHeap {
    objects: Vec<ManagedObject>,
    natives: Vec<NativeFn>,
    next_symbol: u32,
    intrinsics: Intrinsics,
    events: Vec<GuardEvent>,
}

impl fmt::Debug for ObjectHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHeap")
            .field("objects", &self.objects.len())
            .field("natives", &self.natives.len())
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl Default for ObjectHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectHeap {
    /// Create a heap holding `Object.prototype`, `Function.prototype` and
    /// the `Object` constructor.
    pub fn new() -> Self {
        let placeholder = ObjectHandle(0);
        let mut heap = Self {
            objects: Vec::new(),
            natives: Vec::new(),
            next_symbol: 1,
            intrinsics: Intrinsics {
                object_prototype: placeholder,
                function_prototype: placeholder,
                object_constructor: placeholder,
            },
            events: Vec::new(),
        };

        let object_prototype = heap.alloc_ordinary(OrdinaryObject {
            class_tag: Some("Object".to_string()),
            ..OrdinaryObject::default()
        });
        let function_prototype = heap.alloc_ordinary(OrdinaryObject {
            prototype: Some(object_prototype),
            class_tag: Some("Function".to_string()),
            callable: true,
            ..OrdinaryObject::default()
        });
        heap.intrinsics.object_prototype = object_prototype;
        heap.intrinsics.function_prototype = function_prototype;

        let object_constructor = heap.alloc_function(
            "Object",
            true,
            Rc::new(
                |heap: &mut ObjectHeap,
                 _this: &JsValue,
                 args: &[JsValue]|
                 -> Result<JsValue, ObjectError> {
                    match args.first() {
                        Some(JsValue::Object(h)) => Ok(JsValue::Object(*h)),
                        _ => Ok(JsValue::Object(heap.create_object())),
                    }
                },
            ),
        );
        heap.intrinsics.object_constructor = object_constructor;
        heap.insert_own(
            object_constructor,
            "prototype".into(),
            PropertyDescriptor::data_frozen(JsValue::Object(object_prototype)),
        );
        heap.insert_own(
            object_prototype,
            "constructor".into(),
            hidden_method(JsValue::Object(object_constructor)),
        );
        heap
    }

    pub fn object_prototype(&self) -> ObjectHandle {
        self.intrinsics.object_prototype
    }

    pub fn function_prototype(&self) -> ObjectHandle {
        self.intrinsics.function_prototype
    }

    pub fn object_constructor(&self) -> ObjectHandle {
        self.intrinsics.object_constructor
    }

    // -- Allocation --------------------------------------------------------

    /// Allocate a new ordinary object with the given prototype.
    pub fn alloc(&mut self, proto: Option<ObjectHandle>) -> ObjectHandle {
        self.alloc_ordinary(OrdinaryObject::with_prototype(proto))
    }

    /// Allocate a new ordinary object with no prototype.
    pub fn alloc_plain(&mut self) -> ObjectHandle {
        self.alloc(None)
    }

    pub fn alloc_ordinary(&mut self, object: OrdinaryObject) -> ObjectHandle {
        let handle = ObjectHandle(self.objects.len() as u32);
        self.objects.push(ManagedObject::Ordinary(object));
        handle
    }

    pub(crate) fn alloc_guarded(&mut self, view: GuardedView) -> ObjectHandle {
        let handle = ObjectHandle(self.objects.len() as u32);
        self.objects.push(ManagedObject::Guarded(view));
        handle
    }

    /// Allocate a new unique symbol id.
    pub fn alloc_symbol(&mut self) -> SymbolId {
        let id = SymbolId(self.next_symbol);
        self.next_symbol += 1;
        id
    }

    /// `{}`: an empty object inheriting from `Object.prototype`.
    pub fn create_object(&mut self) -> ObjectHandle {
        self.alloc_ordinary(OrdinaryObject {
            prototype: Some(self.intrinsics.object_prototype),
            class_tag: Some("Object".to_string()),
            ..OrdinaryObject::default()
        })
    }

    /// `Object.create(proto)`.
    pub fn create(&mut self, proto: Option<ObjectHandle>) -> ObjectHandle {
        self.alloc(proto)
    }

    /// A plain function with an own, non-writable `name`.
    pub fn create_function<F>(&mut self, name: &str, behavior: F) -> ObjectHandle
    where
        F: Fn(&mut ObjectHeap, &JsValue, &[JsValue]) -> Result<JsValue, ObjectError> + 'static,
    {
        self.alloc_function(name, false, Rc::new(behavior))
    }

    /// A constructor function with a fresh `prototype` object whose
    /// `constructor` points back at it.
    pub fn create_constructor<F>(&mut self, name: &str, behavior: F) -> ObjectHandle
    where
        F: Fn(&mut ObjectHeap, &JsValue, &[JsValue]) -> Result<JsValue, ObjectError> + 'static,
    {
        let ctor = self.alloc_function(name, true, Rc::new(behavior));
        let prototype = self.create_object();
        self.insert_own(
            prototype,
            "constructor".into(),
            hidden_method(JsValue::Object(ctor)),
        );
        self.insert_own(
            ctor,
            "prototype".into(),
            PropertyDescriptor::Data {
                value: JsValue::Object(prototype),
                writable: true,
                enumerable: false,
                configurable: false,
            },
        );
        ctor
    }

    fn alloc_function(&mut self, name: &str, constructable: bool, behavior: NativeFn) -> ObjectHandle {
        let id = FunctionId(self.natives.len() as u32);
        self.natives.push(behavior);
        let handle = self.alloc_ordinary(OrdinaryObject {
            prototype: Some(self.intrinsics.function_prototype),
            class_tag: Some("Function".to_string()),
            callable: true,
            constructable,
            behavior: Some(id),
            ..OrdinaryObject::default()
        });
        self.insert_own(
            handle,
            "name".into(),
            PropertyDescriptor::Data {
                value: JsValue::Str(name.to_string()),
                writable: false,
                enumerable: false,
                configurable: true,
            },
        );
        handle
    }

    /// Direct slot write on a freshly allocated ordinary object.
    fn insert_own(&mut self, handle: ObjectHandle, key: PropertyKey, desc: PropertyDescriptor) {
        if let Some(ManagedObject::Ordinary(o)) = self.objects.get_mut(handle.0 as usize) {
            o.properties.insert(key, desc);
        }
    }

    /// `Object.fromEntries`.
    pub fn from_entries(&mut self, entries: Vec<(String, JsValue)>) -> ObjectHandle {
        let handle = self.create_object();
        for (k, v) in entries {
            self.insert_own(handle, PropertyKey::String(k), PropertyDescriptor::data(v));
        }
        handle
    }

    /// Define a default (writable, enumerable, configurable) data property.
    pub fn define_value(
        &mut self,
        handle: ObjectHandle,
        key: impl Into<PropertyKey>,
        value: impl Into<JsValue>,
    ) -> Result<bool, ObjectError> {
        self.define_property(handle, key.into(), PropertyDescriptor::data(value.into()))
    }

    /// Define an enumerable, configurable accessor property.
    pub fn define_accessor(
        &mut self,
        handle: ObjectHandle,
        key: impl Into<PropertyKey>,
        get: Option<ObjectHandle>,
        set: Option<ObjectHandle>,
    ) -> Result<bool, ObjectError> {
        self.define_property(handle, key.into(), PropertyDescriptor::accessor(get, set))
    }

    // -- Slot access --------------------------------------------------------

    pub fn get(&self, handle: ObjectHandle) -> Result<&ManagedObject, ObjectError> {
        self.objects
            .get(handle.0 as usize)
            .ok_or(ObjectError::ObjectNotFound(handle))
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Result<&mut ManagedObject, ObjectError> {
        self.objects
            .get_mut(handle.0 as usize)
            .ok_or(ObjectError::ObjectNotFound(handle))
    }

    pub fn ordinary(&self, handle: ObjectHandle) -> Result<&OrdinaryObject, ObjectError> {
        self.get(handle)?
            .as_ordinary()
            .ok_or_else(|| ObjectError::TypeError(format!("{handle} is a guarded view")))
    }

    pub fn ordinary_mut(&mut self, handle: ObjectHandle) -> Result<&mut OrdinaryObject, ObjectError> {
        self.get_mut(handle)?
            .as_ordinary_mut()
            .ok_or_else(|| ObjectError::TypeError(format!("{handle} is a guarded view")))
    }

    pub fn guarded_view(&self, handle: ObjectHandle) -> Result<&GuardedView, ObjectError> {
        self.get(handle)?
            .as_guarded()
            .ok_or_else(|| ObjectError::TypeError(format!("{handle} is not a guarded view")))
    }

    pub fn is_guarded(&self, handle: ObjectHandle) -> Result<bool, ObjectError> {
        Ok(matches!(self.get(handle)?, ManagedObject::Guarded(_)))
    }

    /// The real object behind any number of guarded views.
    pub fn underlying(&self, handle: ObjectHandle) -> Result<ObjectHandle, ObjectError> {
        let mut current = handle;
        while let ManagedObject::Guarded(view) = self.get(current)? {
            current = view.target();
        }
        Ok(current)
    }

    /// Guarded views answer capability queries from their stand-in.
    fn capability_holder(&self, handle: ObjectHandle) -> Result<&OrdinaryObject, ObjectError> {
        match self.get(handle)? {
            ManagedObject::Ordinary(o) => Ok(o),
            ManagedObject::Guarded(view) => self.ordinary(view.shadow()),
        }
    }

    pub fn is_callable(&self, handle: ObjectHandle) -> Result<bool, ObjectError> {
        Ok(self.capability_holder(handle)?.callable)
    }

    pub fn is_constructor(&self, handle: ObjectHandle) -> Result<bool, ObjectError> {
        Ok(self.capability_holder(handle)?.constructable)
    }

    pub fn class_tag(&self, handle: ObjectHandle) -> Result<Option<String>, ObjectError> {
        Ok(self.capability_holder(handle)?.class_tag.clone())
    }

    /// `typeof value`.
    pub fn type_of(&self, value: &JsValue) -> Result<&'static str, ObjectError> {
        match value {
            JsValue::Object(h) if self.is_callable(*h)? => Ok("function"),
            other => Ok(other.type_name()),
        }
    }

    /// Number of objects allocated.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    // -- Guarding -------------------------------------------------------------

    /// Wrap `value` in a guarded view.  See [`crate::guard::guard`].
    pub fn guard(&mut self, value: JsValue, options: &GuardOptions) -> Result<JsValue, ObjectError> {
        crate::guard::guard(self, value, options)
    }

    pub(crate) fn emit_event(&mut self, event: GuardEvent) {
        self.events.push(event);
    }

    /// Guard events recorded since the last drain.
    ///
    /// The journal is unbounded: every view created by a deep read adds a
    /// `wrapped` entry.  Long-running callers should
    /// [`drain_events`](Self::drain_events) periodically.
    pub fn events(&self) -> &[GuardEvent] {
        &self.events
    }

    /// Drain accumulated guard events.
    pub fn drain_events(&mut self) -> Vec<GuardEvent> {
        std::mem::take(&mut self.events)
    }

    /// Event counts by type.
    pub fn event_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.events {
            *counts.entry(event.event_type.to_string()).or_insert(0) += 1;
        }
        counts
    }

    // -- Internal methods ----------------------------------------------------

    /// `[[GetPrototypeOf]]`.
    pub fn get_prototype_of(
        &mut self,
        handle: ObjectHandle,
    ) -> Result<Option<ObjectHandle>, ObjectError> {
        if self.is_guarded(handle)? {
            return dispatch(self, handle, TrapCall::GetPrototypeOf)?.into_prototype();
        }
        Ok(self.ordinary(handle)?.prototype)
    }

    /// `[[SetPrototypeOf]]`.  Cycles are detected on underlying objects, so
    /// a view of `o` in the chain counts as `o`.
    pub fn set_prototype_of(
        &mut self,
        handle: ObjectHandle,
        proto: Option<ObjectHandle>,
    ) -> Result<bool, ObjectError> {
        if self.is_guarded(handle)? {
            return dispatch(self, handle, TrapCall::SetPrototypeOf { proto })?.into_flag();
        }

        if let Some(p) = proto {
            let mut current = Some(p);
            let mut depth: u32 = 0;
            while let Some(h) = current {
                let real = self.underlying(h)?;
                if real == handle {
                    return Err(ObjectError::PrototypeCycleDetected);
                }
                depth += 1;
                if depth > MAX_PROTOTYPE_CHAIN_DEPTH {
                    return Err(ObjectError::PrototypeChainTooDeep {
                        depth,
                        max: MAX_PROTOTYPE_CHAIN_DEPTH,
                    });
                }
                current = self.ordinary(real)?.prototype;
            }
        }

        let o = self.ordinary_mut(handle)?;
        if !o.extensible {
            // Non-extensible: can only "set" the current value.
            return Ok(o.prototype == proto);
        }
        o.prototype = proto;
        Ok(true)
    }

    /// `[[IsExtensible]]`.
    pub fn is_extensible(&mut self, handle: ObjectHandle) -> Result<bool, ObjectError> {
        if self.is_guarded(handle)? {
            return dispatch(self, handle, TrapCall::IsExtensible)?.into_flag();
        }
        Ok(self.ordinary(handle)?.extensible)
    }

    /// `[[PreventExtensions]]`.
    pub fn prevent_extensions(&mut self, handle: ObjectHandle) -> Result<bool, ObjectError> {
        if self.is_guarded(handle)? {
            return dispatch(self, handle, TrapCall::PreventExtensions)?.into_flag();
        }
        self.ordinary_mut(handle)?.prevent_extensions();
        Ok(true)
    }

    /// `[[GetOwnProperty]]`.
    pub fn get_own_property_descriptor(
        &mut self,
        handle: ObjectHandle,
        key: &PropertyKey,
    ) -> Result<Option<PropertyDescriptor>, ObjectError> {
        if self.is_guarded(handle)? {
            return dispatch(
                self,
                handle,
                TrapCall::GetOwnPropertyDescriptor { key: key.clone() },
            )?
            .into_descriptor();
        }
        Ok(self.ordinary(handle)?.get_own_property(key).cloned())
    }

    /// `[[DefineOwnProperty]]`.
    pub fn define_property(
        &mut self,
        handle: ObjectHandle,
        key: PropertyKey,
        descriptor: PropertyDescriptor,
    ) -> Result<bool, ObjectError> {
        if self.is_guarded(handle)? {
            return dispatch(self, handle, TrapCall::DefineProperty { key, descriptor })?
                .into_flag();
        }
        self.ordinary_mut(handle)?.define_own_property(key, descriptor)
    }

    /// `[[HasProperty]]`: walks the prototype chain.
    pub fn has_property(
        &mut self,
        handle: ObjectHandle,
        key: &PropertyKey,
    ) -> Result<bool, ObjectError> {
        let mut current = handle;
        let mut depth: u32 = 0;
        loop {
            if self.is_guarded(current)? {
                return dispatch(self, current, TrapCall::Has { key: key.clone() })?.into_flag();
            }
            let o = self.ordinary(current)?;
            if o.has_own_property(key) {
                return Ok(true);
            }
            match o.prototype {
                Some(p) => current = p,
                None => return Ok(false),
            }
            depth += 1;
            if depth > MAX_PROTOTYPE_CHAIN_DEPTH {
                return Err(ObjectError::PrototypeChainTooDeep {
                    depth,
                    max: MAX_PROTOTYPE_CHAIN_DEPTH,
                });
            }
        }
    }

    /// `[[Get]](P, Receiver)` with `Receiver = handle`.
    pub fn get_property(
        &mut self,
        handle: ObjectHandle,
        key: &PropertyKey,
    ) -> Result<JsValue, ObjectError> {
        self.get_with_receiver(handle, key, &JsValue::Object(handle))
    }

    /// `[[Get]](P, Receiver)`.  Getters run with `this = receiver`.
    pub fn get_with_receiver(
        &mut self,
        handle: ObjectHandle,
        key: &PropertyKey,
        receiver: &JsValue,
    ) -> Result<JsValue, ObjectError> {
        let mut current = handle;
        let mut depth: u32 = 0;
        loop {
            if self.is_guarded(current)? {
                return dispatch(
                    self,
                    current,
                    TrapCall::Get {
                        key: key.clone(),
                        receiver: receiver.clone(),
                    },
                )?
                .into_value();
            }
            let o = self.ordinary(current)?;
            let found = o.get_own_property(key).cloned();
            let prototype = o.prototype;
            match found {
                Some(PropertyDescriptor::Data { value, .. }) => return Ok(value),
                Some(PropertyDescriptor::Accessor { get: Some(g), .. }) => {
                    return self.call(&JsValue::Object(g), receiver, &[]);
                }
                Some(PropertyDescriptor::Accessor { get: None, .. }) => {
                    return Ok(JsValue::Undefined);
                }
                None => match prototype {
                    Some(p) => current = p,
                    None => return Ok(JsValue::Undefined),
                },
            }
            depth += 1;
            if depth > MAX_PROTOTYPE_CHAIN_DEPTH {
                return Err(ObjectError::PrototypeChainTooDeep {
                    depth,
                    max: MAX_PROTOTYPE_CHAIN_DEPTH,
                });
            }
        }
    }

    /// `[[Set]](P, V, Receiver)` with `Receiver = handle`.
    pub fn set_property(
        &mut self,
        handle: ObjectHandle,
        key: PropertyKey,
        value: JsValue,
    ) -> Result<bool, ObjectError> {
        self.set_with_receiver(handle, key, value, &JsValue::Object(handle))
    }

    /// `[[Set]](P, V, Receiver)`: ES2020 OrdinarySet.  The write lands on
    /// the receiver through its own `[[DefineOwnProperty]]`; setters run with
    /// `this = receiver`.
    pub fn set_with_receiver(
        &mut self,
        handle: ObjectHandle,
        key: PropertyKey,
        value: JsValue,
        receiver: &JsValue,
    ) -> Result<bool, ObjectError> {
        let mut current = handle;
        let mut depth: u32 = 0;
        let own = loop {
            if self.is_guarded(current)? {
                return dispatch(
                    self,
                    current,
                    TrapCall::Set {
                        key,
                        value,
                        receiver: receiver.clone(),
                    },
                )?
                .into_flag();
            }
            let o = self.ordinary(current)?;
            if let Some(desc) = o.get_own_property(&key) {
                break desc.clone();
            }
            match o.prototype {
                Some(p) => current = p,
                None => break PropertyDescriptor::data(JsValue::Undefined),
            }
            depth += 1;
            if depth > MAX_PROTOTYPE_CHAIN_DEPTH {
                return Err(ObjectError::PrototypeChainTooDeep {
                    depth,
                    max: MAX_PROTOTYPE_CHAIN_DEPTH,
                });
            }
        };

        match own {
            PropertyDescriptor::Data { writable: false, .. } => Ok(false),
            PropertyDescriptor::Data { .. } => {
                let Some(target) = receiver.as_object() else {
                    return Ok(false);
                };
                match self.get_own_property_descriptor(target, &key)? {
                    Some(existing) if existing.is_accessor() || !existing.is_writable() => Ok(false),
                    Some(existing) => {
                        self.define_property(target, key, existing.with_value(value))
                    }
                    None => self.define_property(target, key, PropertyDescriptor::data(value)),
                }
            }
            PropertyDescriptor::Accessor { set: Some(s), .. } => {
                self.call(&JsValue::Object(s), receiver, &[value])?;
                Ok(true)
            }
            PropertyDescriptor::Accessor { set: None, .. } => Ok(false),
        }
    }

    /// `[[Delete]]`.
    pub fn delete_property(
        &mut self,
        handle: ObjectHandle,
        key: &PropertyKey,
    ) -> Result<bool, ObjectError> {
        if self.is_guarded(handle)? {
            return dispatch(self, handle, TrapCall::DeleteProperty { key: key.clone() })?
                .into_flag();
        }
        Ok(self.ordinary_mut(handle)?.delete(key))
    }

    /// `[[OwnPropertyKeys]]`.
    pub fn own_property_keys(
        &mut self,
        handle: ObjectHandle,
    ) -> Result<Vec<PropertyKey>, ObjectError> {
        if self.is_guarded(handle)? {
            return dispatch(self, handle, TrapCall::OwnKeys)?.into_keys();
        }
        Ok(self.ordinary(handle)?.own_property_keys())
    }

    /// `[[Call]]`.
    pub fn call(
        &mut self,
        callee: &JsValue,
        this: &JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, ObjectError> {
        let handle = match callee {
            JsValue::Object(h) if self.is_callable(*h)? => *h,
            other => {
                return Err(ObjectError::TypeError(format!("{other} is not a function")));
            }
        };
        if self.is_guarded(handle)? {
            return dispatch(
                self,
                handle,
                TrapCall::Apply {
                    this: this.clone(),
                    args: args.to_vec(),
                },
            )?
            .into_value();
        }
        let behavior = match self.ordinary(handle)?.behavior {
            Some(id) => self.natives.get(id.0 as usize).cloned(),
            None => None,
        };
        match behavior {
            Some(f) => f(self, this, args),
            None => Ok(JsValue::Undefined),
        }
    }

    /// `[[Construct]]`.  The instance inherits from the constructor's
    /// `prototype`; an object returned by the behavior replaces it.
    pub fn construct(&mut self, callee: &JsValue, args: &[JsValue]) -> Result<JsValue, ObjectError> {
        let handle = match callee {
            JsValue::Object(h) if self.is_constructor(*h)? => *h,
            other => {
                return Err(ObjectError::TypeError(format!("{other} is not a constructor")));
            }
        };
        if self.is_guarded(handle)? {
            return dispatch(
                self,
                handle,
                TrapCall::Construct {
                    args: args.to_vec(),
                },
            )?
            .into_value();
        }

        let proto = match self.get_property(handle, &"prototype".into())? {
            JsValue::Object(p) => p,
            _ => self.intrinsics.object_prototype,
        };
        let class_tag = match self.get_property(handle, &"name".into())? {
            JsValue::Str(s) => Some(s),
            _ => None,
        };
        let instance = self.alloc_ordinary(OrdinaryObject {
            prototype: Some(proto),
            class_tag,
            ..OrdinaryObject::default()
        });
        let result = self.call(&JsValue::Object(handle), &JsValue::Object(instance), args)?;
        match result {
            JsValue::Object(_) => Ok(result),
            _ => Ok(JsValue::Object(instance)),
        }
    }

    // -- Object-level operations --------------------------------------------

    /// `Object.keys(O)`: enumerable own string keys.
    pub fn keys(&mut self, handle: ObjectHandle) -> Result<Vec<String>, ObjectError> {
        let mut out = Vec::new();
        for key in self.own_property_keys(handle)? {
            let PropertyKey::String(s) = &key else {
                continue;
            };
            if self
                .get_own_property_descriptor(handle, &key)?
                .is_some_and(|d| d.is_enumerable())
            {
                out.push(s.clone());
            }
        }
        Ok(out)
    }

    /// `Object.values(O)`.
    pub fn values(&mut self, handle: ObjectHandle) -> Result<Vec<JsValue>, ObjectError> {
        self.keys(handle)?
            .into_iter()
            .map(|k| self.get_property(handle, &PropertyKey::String(k)))
            .collect()
    }

    /// `Object.entries(O)`.
    pub fn entries(&mut self, handle: ObjectHandle) -> Result<Vec<(String, JsValue)>, ObjectError> {
        let mut out = Vec::new();
        for k in self.keys(handle)? {
            let v = self.get_property(handle, &PropertyKey::String(k.clone()))?;
            out.push((k, v));
        }
        Ok(out)
    }

    /// `Object.getOwnPropertyNames(O)`.
    pub fn get_own_property_names(&mut self, handle: ObjectHandle) -> Result<Vec<String>, ObjectError> {
        Ok(self
            .own_property_keys(handle)?
            .into_iter()
            .filter_map(|k| match k {
                PropertyKey::String(s) => Some(s),
                PropertyKey::Symbol(_) => None,
            })
            .collect())
    }

    /// Keys visited by `for (k in O)`: enumerable string keys along the
    /// prototype chain, each reported once, shadowed keys skipped.
    pub fn for_in_keys(&mut self, handle: ObjectHandle) -> Result<Vec<String>, ObjectError> {
        let mut visited: BTreeSet<PropertyKey> = BTreeSet::new();
        let mut out = Vec::new();
        let mut current = Some(handle);
        let mut depth: u32 = 0;

        while let Some(h) = current {
            for key in self.own_property_keys(h)? {
                let PropertyKey::String(s) = &key else {
                    continue;
                };
                if !visited.insert(key.clone()) {
                    continue;
                }
                if self
                    .get_own_property_descriptor(h, &key)?
                    .is_some_and(|d| d.is_enumerable())
                {
                    out.push(s.clone());
                }
            }
            current = self.get_prototype_of(h)?;
            depth += 1;
            if depth > MAX_PROTOTYPE_CHAIN_DEPTH {
                return Err(ObjectError::PrototypeChainTooDeep {
                    depth,
                    max: MAX_PROTOTYPE_CHAIN_DEPTH,
                });
            }
        }
        Ok(out)
    }

    /// `Object.assign(target, source)` for a single source.
    pub fn assign(&mut self, target: ObjectHandle, source: ObjectHandle) -> Result<(), ObjectError> {
        for key in self.own_property_keys(source)? {
            if !self
                .get_own_property_descriptor(source, &key)?
                .is_some_and(|d| d.is_enumerable())
            {
                continue;
            }
            let value = self.get_property(source, &key)?;
            if !self.set_property(target, key.clone(), value)? {
                return Err(ObjectError::TypeError(format!(
                    "cannot assign to read only property '{key}'"
                )));
            }
        }
        Ok(())
    }

    /// `Object.freeze(O)`.
    pub fn freeze(&mut self, handle: ObjectHandle) -> Result<(), ObjectError> {
        self.set_integrity_level(handle, true)
    }

    /// `Object.seal(O)`.
    pub fn seal(&mut self, handle: ObjectHandle) -> Result<(), ObjectError> {
        self.set_integrity_level(handle, false)
    }

    fn set_integrity_level(&mut self, handle: ObjectHandle, frozen: bool) -> Result<(), ObjectError> {
        if !self.prevent_extensions(handle)? {
            return Err(ObjectError::TypeError(format!(
                "cannot prevent extensions on {handle}"
            )));
        }
        for key in self.own_property_keys(handle)? {
            let Some(mut desc) = self.get_own_property_descriptor(handle, &key)? else {
                continue;
            };
            desc.set_non_configurable();
            if frozen {
                desc.set_non_writable();
            }
            if !self.define_property(handle, key.clone(), desc)? {
                return Err(ObjectError::TypeError(format!(
                    "cannot redefine property '{key}'"
                )));
            }
        }
        Ok(())
    }

    /// `Object.isFrozen(O)`.
    pub fn is_frozen(&mut self, handle: ObjectHandle) -> Result<bool, ObjectError> {
        self.test_integrity_level(handle, true)
    }

    /// `Object.isSealed(O)`.
    pub fn is_sealed(&mut self, handle: ObjectHandle) -> Result<bool, ObjectError> {
        self.test_integrity_level(handle, false)
    }

    fn test_integrity_level(&mut self, handle: ObjectHandle, frozen: bool) -> Result<bool, ObjectError> {
        if self.is_extensible(handle)? {
            return Ok(false);
        }
        for key in self.own_property_keys(handle)? {
            if let Some(desc) = self.get_own_property_descriptor(handle, &key)?
                && (desc.is_configurable() || (frozen && desc.is_writable()))
            {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Writable, non-enumerable, configurable: the shape of built-in methods
/// and `constructor` links.
fn hidden_method(value: JsValue) -> PropertyDescriptor {
    PropertyDescriptor::Data {
        value,
        writable: true,
        enumerable: false,
        configurable: true,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
