//! ES2020 object model: property keys, values, descriptors and ordinary objects.
//!
//! This is the host model the mutation guard intercepts.  It carries just
//! enough of ES2020 for a guarded view to be indistinguishable from the real
//! object under inspection:
//!
//! - **Property descriptors**: data vs accessor, configurable/enumerable/writable
//! - **Ordinary objects**: `[[Prototype]]`, `[[Extensible]]`, own properties
//! - **Trap invariants**: the consistency rules every guarded-view trap result
//!   must satisfy against its stand-in (ES2020 §9.5)
//!
//! `BTreeMap`/`BTreeSet` for deterministic ordering.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::guard::failure::MutationAssertion;

/// Serialize/deserialize `BTreeMap<PropertyKey, PropertyDescriptor>` as a
/// sorted sequence of `[key, descriptor]` pairs.  serde_json requires string
/// keys for JSON maps but `PropertyKey` is an enum.
mod properties_as_seq {
    use super::{BTreeMap, PropertyDescriptor, PropertyKey};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<PropertyKey, PropertyDescriptor>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let pairs: Vec<(&PropertyKey, &PropertyDescriptor)> = map.iter().collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<PropertyKey, PropertyDescriptor>, D::Error> {
        let pairs: Vec<(PropertyKey, PropertyDescriptor)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// PropertyKey: string or symbol
// ---------------------------------------------------------------------------

/// Unique symbol identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// A property key: either a string or a symbol.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyKey {
    /// String key.
    String(String),
    /// Symbol key.
    Symbol(SymbolId),
}

impl PropertyKey {
    /// The string form, if this is a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Symbol(_) => None,
        }
    }

    /// Array-index style key (`"0"`, `"12"`), used for own-key ordering.
    pub fn array_index(&self) -> Option<u64> {
        let s = self.as_str()?;
        if s.is_empty() || (s.len() > 1 && s.starts_with('0')) {
            return None;
        }
        s.parse::<u64>().ok()
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Symbol(id) => write!(f, "Symbol({})", id.0),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<SymbolId> for PropertyKey {
    fn from(id: SymbolId) -> Self {
        Self::Symbol(id)
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Opaque handle referencing an object on the managed heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectHandle(pub u32);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Index into the heap's native function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionId(pub u32);

// ---------------------------------------------------------------------------
// JsValue
// ---------------------------------------------------------------------------

/// Runtime value.  Functions are objects with a callable slot, so every
/// object-like value is an `Object` handle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JsValue {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Symbol(SymbolId),
    Object(ObjectHandle),
}

impl JsValue {
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn as_object(&self) -> Option<ObjectHandle> {
        match self {
            Self::Object(h) => Some(*h),
            _ => None,
        }
    }

    /// `typeof` for primitives; objects report `"object"` here, the heap
    /// refines callables to `"function"`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "number",
            Self::Str(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Object(_) => "object",
        }
    }

    /// SameValue comparison (ES2020 §7.2.10).
    pub fn same_value(&self, other: &Self) -> bool {
        self == other
    }
}

impl From<ObjectHandle> for JsValue {
    fn from(h: ObjectHandle) -> Self {
        Self::Object(h)
    }
}

impl From<i64> for JsValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Symbol(id) => write!(f, "Symbol({})", id.0),
            Self::Object(h) => write!(f, "[object#{}]", h.0),
        }
    }
}

// ---------------------------------------------------------------------------
// PropertyDescriptor
// ---------------------------------------------------------------------------

/// ES2020 property descriptor (§6.2.5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyDescriptor {
    /// Data descriptor: has `value` and `writable`.
    Data {
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    /// Accessor descriptor: has `get` and/or `set`.
    Accessor {
        get: Option<ObjectHandle>,
        set: Option<ObjectHandle>,
        enumerable: bool,
        configurable: bool,
    },
}

impl PropertyDescriptor {
    /// Create a default data descriptor (writable, enumerable, configurable).
    pub fn data(value: JsValue) -> Self {
        Self::Data {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Create a non-writable, non-enumerable, non-configurable data descriptor.
    pub fn data_frozen(value: JsValue) -> Self {
        Self::Data {
            value,
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }

    /// Create an enumerable, configurable accessor descriptor.
    pub fn accessor(get: Option<ObjectHandle>, set: Option<ObjectHandle>) -> Self {
        Self::Accessor {
            get,
            set,
            enumerable: true,
            configurable: true,
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => *configurable,
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            Self::Data { enumerable, .. } | Self::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor { .. })
    }

    /// Get the value if this is a data descriptor.
    pub fn value(&self) -> Option<&JsValue> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    /// Is this a data descriptor with writable=true?
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Data { writable, .. } => *writable,
            Self::Accessor { .. } => false,
        }
    }

    /// Non-writable or non-configurable.  Accessors have no writable
    /// attribute, so only configurability counts for them.
    pub fn is_read_only(&self) -> bool {
        match self {
            Self::Data {
                writable,
                configurable,
                ..
            } => !writable || !configurable,
            Self::Accessor { configurable, .. } => !configurable,
        }
    }

    /// Same attributes, different value.  Accessors are returned unchanged.
    pub fn with_value(&self, new_value: JsValue) -> Self {
        match self {
            Self::Data {
                writable,
                enumerable,
                configurable,
                ..
            } => Self::Data {
                value: new_value,
                writable: *writable,
                enumerable: *enumerable,
                configurable: *configurable,
            },
            Self::Accessor { .. } => self.clone(),
        }
    }

    pub fn set_non_configurable(&mut self) {
        match self {
            Self::Data { configurable, .. } | Self::Accessor { configurable, .. } => {
                *configurable = false;
            }
        }
    }

    /// Make this data descriptor non-writable (no-op for accessors).
    pub fn set_non_writable(&mut self) {
        if let Self::Data { writable, .. } = self {
            *writable = false;
        }
    }
}

// ---------------------------------------------------------------------------
// ObjectError
// ---------------------------------------------------------------------------

/// Errors from object model operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ObjectError {
    /// TypeError per ES2020, including trap invariant violations.
    #[error("TypeError: {0}")]
    TypeError(String),
    #[error("{0} not found")]
    ObjectNotFound(ObjectHandle),
    #[error("TypeError: prototype chain cycle detected")]
    PrototypeCycleDetected,
    #[error("TypeError: prototype chain depth {depth} exceeds max {max}")]
    PrototypeChainTooDeep { depth: u32, max: u32 },
    /// A guarded view refused a mutating operation.
    #[error(transparent)]
    MutationAssertion(#[from] MutationAssertion),
}

impl ObjectError {
    /// The mutation assertion carried by this error, if any.
    pub fn as_mutation_assertion(&self) -> Option<&MutationAssertion> {
        match self {
            Self::MutationAssertion(m) => Some(m),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// OrdinaryObject
// ---------------------------------------------------------------------------

/// Maximum prototype chain depth to prevent infinite loops.
pub const MAX_PROTOTYPE_CHAIN_DEPTH: u32 = 1024;

/// An ordinary ES2020 object with internal slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinaryObject {
    /// `[[Prototype]]` internal slot (None means end of chain).
    pub prototype: Option<ObjectHandle>,
    /// `[[Extensible]]` internal slot.
    pub extensible: bool,
    #[serde(with = "properties_as_seq")]
    pub properties: BTreeMap<PropertyKey, PropertyDescriptor>,
    /// `[[Class]]` tag for intrinsic identification.
    pub class_tag: Option<String>,
    /// Has a `[[Call]]` internal method.
    pub callable: bool,
    /// Has a `[[Construct]]` internal method.
    pub constructable: bool,
    /// Native behavior backing `[[Call]]`; a callable without one returns
    /// `undefined`.
    pub behavior: Option<FunctionId>,
}

impl Default for OrdinaryObject {
    fn default() -> Self {
        Self {
            prototype: None,
            extensible: true,
            properties: BTreeMap::new(),
            class_tag: None,
            callable: false,
            constructable: false,
            behavior: None,
        }
    }
}

impl OrdinaryObject {
    /// Create a new ordinary object with the given prototype.
    pub fn with_prototype(proto: Option<ObjectHandle>) -> Self {
        Self {
            prototype: proto,
            ..Self::default()
        }
    }

    // -- [[GetOwnProperty]] (§9.1.1) ---------------------------------------

    pub fn get_own_property(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        self.properties.get(key)
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }

    // -- [[DefineOwnProperty]] (§9.1.6) ------------------------------------

    /// `[[DefineOwnProperty]](P, Desc)`: define or update a property.
    ///
    /// Returns `Ok(true)` if the property was defined, `Ok(false)` if the
    /// change conflicts with a non-configurable property or the object is
    /// not extensible.
    pub fn define_own_property(
        &mut self,
        key: PropertyKey,
        desc: PropertyDescriptor,
    ) -> Result<bool, ObjectError> {
        let Some(current) = self.properties.get(&key) else {
            if !self.extensible {
                return Ok(false);
            }
            self.properties.insert(key, desc);
            return Ok(true);
        };

        if !current.is_configurable() {
            if desc.is_configurable() {
                return Ok(false);
            }
            if desc.is_enumerable() != current.is_enumerable() {
                return Ok(false);
            }
            if current.is_data() != desc.is_data() {
                return Ok(false);
            }
            if let (
                PropertyDescriptor::Data {
                    writable: current_w,
                    value: current_v,
                    ..
                },
                PropertyDescriptor::Data {
                    writable: new_w,
                    value: new_v,
                    ..
                },
            ) = (current, &desc)
                && !current_w
                && (*new_w || !current_v.same_value(new_v))
            {
                return Ok(false);
            }
            if let (
                PropertyDescriptor::Accessor {
                    get: cur_get,
                    set: cur_set,
                    ..
                },
                PropertyDescriptor::Accessor {
                    get: new_get,
                    set: new_set,
                    ..
                },
            ) = (current, &desc)
                && (cur_get != new_get || cur_set != new_set)
            {
                return Ok(false);
            }
        }
        self.properties.insert(key, desc);
        Ok(true)
    }

    // -- [[Delete]] (§9.1.10) -----------------------------------------------

    /// `[[Delete]](P)`: returns `false` if the property is non-configurable.
    pub fn delete(&mut self, key: &PropertyKey) -> bool {
        match self.properties.get(key) {
            Some(desc) if !desc.is_configurable() => false,
            Some(_) => {
                self.properties.remove(key);
                true
            }
            None => true,
        }
    }

    // -- [[OwnPropertyKeys]] (§9.1.11) -------------------------------------

    /// Own keys in ES2020 order: array indices ascending, then string keys,
    /// then symbol keys.
    pub fn own_property_keys(&self) -> Vec<PropertyKey> {
        let mut int_keys: Vec<(u64, PropertyKey)> = Vec::new();
        let mut str_keys: Vec<PropertyKey> = Vec::new();
        let mut sym_keys: Vec<PropertyKey> = Vec::new();

        for key in self.properties.keys() {
            match (key, key.array_index()) {
                (_, Some(n)) => int_keys.push((n, key.clone())),
                (PropertyKey::String(_), None) => str_keys.push(key.clone()),
                (PropertyKey::Symbol(_), None) => sym_keys.push(key.clone()),
            }
        }

        int_keys.sort_by_key(|(n, _)| *n);
        let mut result: Vec<PropertyKey> = int_keys.into_iter().map(|(_, k)| k).collect();
        result.extend(str_keys);
        result.extend(sym_keys);
        result
    }

    pub fn prevent_extensions(&mut self) {
        self.extensible = false;
    }
}

// ---------------------------------------------------------------------------
// TrapInvariantChecker: validates guarded-view trap results
// ---------------------------------------------------------------------------

/// Trap result invariants per ES2020 §9.5.x, checked against a guarded view's
/// stand-in.  The stand-in plays the role of the proxy target: whatever the
/// view reports must be consistent with the stand-in's own shape.
pub struct TrapInvariantChecker;

impl TrapInvariantChecker {
    /// `[[GetOwnProperty]]` (§9.5.5).
    pub fn check_get_own_property(
        stand_in: &OrdinaryObject,
        key: &PropertyKey,
        trap_result: &Option<PropertyDescriptor>,
    ) -> Result<(), ObjectError> {
        let stand_in_desc = stand_in.get_own_property(key);

        match (trap_result, stand_in_desc) {
            (None, Some(sd)) if !sd.is_configurable() => Err(ObjectError::TypeError(format!(
                "getOwnPropertyDescriptor: cannot report non-configurable property '{key}' as non-existent"
            ))),
            (None, Some(_)) if !stand_in.extensible => Err(ObjectError::TypeError(format!(
                "getOwnPropertyDescriptor: cannot report existing property '{key}' as non-existent on non-extensible target"
            ))),
            (Some(_), None) if !stand_in.extensible => Err(ObjectError::TypeError(format!(
                "getOwnPropertyDescriptor: cannot report property '{key}' as existent on non-extensible target"
            ))),
            (Some(rd), sd) if !rd.is_configurable() => match sd {
                Some(existing) if !existing.is_configurable() => {
                    if let (
                        PropertyDescriptor::Data {
                            value: rv,
                            writable: rw,
                            ..
                        },
                        PropertyDescriptor::Data {
                            value: ev,
                            writable: ew,
                            ..
                        },
                    ) = (rd, existing)
                        && !rw
                        && !ew
                        && !rv.same_value(ev)
                    {
                        return Err(ObjectError::TypeError(format!(
                            "getOwnPropertyDescriptor: non-configurable non-writable property '{key}' must have same value"
                        )));
                    }
                    Ok(())
                }
                _ => Err(ObjectError::TypeError(format!(
                    "getOwnPropertyDescriptor: cannot return non-configurable descriptor for property '{key}' when target property is configurable or absent"
                ))),
            },
            _ => Ok(()),
        }
    }

    /// `[[HasProperty]]` (§9.5.7).
    pub fn check_has(
        stand_in: &OrdinaryObject,
        key: &PropertyKey,
        trap_result: bool,
    ) -> Result<(), ObjectError> {
        if trap_result {
            return Ok(());
        }
        if let Some(sd) = stand_in.get_own_property(key) {
            if !sd.is_configurable() {
                return Err(ObjectError::TypeError(format!(
                    "has: cannot report non-configurable property '{key}' as non-existent"
                )));
            }
            if !stand_in.extensible {
                return Err(ObjectError::TypeError(format!(
                    "has: cannot report property '{key}' as non-existent on non-extensible target"
                )));
            }
        }
        Ok(())
    }

    /// `[[Get]]` (§9.5.8).
    pub fn check_get(
        stand_in: &OrdinaryObject,
        key: &PropertyKey,
        trap_result: &JsValue,
    ) -> Result<(), ObjectError> {
        match stand_in.get_own_property(key) {
            Some(PropertyDescriptor::Data {
                value,
                writable: false,
                configurable: false,
                ..
            }) if !trap_result.same_value(value) => Err(ObjectError::TypeError(format!(
                "get: non-configurable non-writable property '{key}' must return same value"
            ))),
            Some(PropertyDescriptor::Accessor {
                get: None,
                configurable: false,
                ..
            }) if *trap_result != JsValue::Undefined => Err(ObjectError::TypeError(format!(
                "get: non-configurable accessor property '{key}' with undefined getter must return undefined"
            ))),
            _ => Ok(()),
        }
    }

    /// `[[Set]]` (§9.5.9).
    pub fn check_set(
        stand_in: &OrdinaryObject,
        key: &PropertyKey,
        value: &JsValue,
        trap_result: bool,
    ) -> Result<(), ObjectError> {
        if !trap_result {
            return Ok(());
        }
        match stand_in.get_own_property(key) {
            Some(PropertyDescriptor::Data {
                value: current,
                writable: false,
                configurable: false,
                ..
            }) if !value.same_value(current) => Err(ObjectError::TypeError(format!(
                "set: cannot set non-configurable non-writable property '{key}' to different value"
            ))),
            Some(PropertyDescriptor::Accessor {
                set: None,
                configurable: false,
                ..
            }) => Err(ObjectError::TypeError(format!(
                "set: cannot set non-configurable accessor property '{key}' with undefined setter"
            ))),
            _ => Ok(()),
        }
    }

    /// `[[Delete]]` (§9.5.10).
    pub fn check_delete(
        stand_in: &OrdinaryObject,
        key: &PropertyKey,
        trap_result: bool,
    ) -> Result<(), ObjectError> {
        if trap_result
            && let Some(sd) = stand_in.get_own_property(key)
            && !sd.is_configurable()
        {
            return Err(ObjectError::TypeError(format!(
                "deleteProperty: cannot delete non-configurable property '{key}'"
            )));
        }
        Ok(())
    }

    /// `[[OwnPropertyKeys]]` (§9.5.11).
    pub fn check_own_keys(
        stand_in: &OrdinaryObject,
        trap_result: &[PropertyKey],
    ) -> Result<(), ObjectError> {
        let mut seen = BTreeSet::new();
        for key in trap_result {
            if !seen.insert(key) {
                return Err(ObjectError::TypeError(format!(
                    "ownKeys: duplicate key '{key}'"
                )));
            }
        }

        for (key, desc) in &stand_in.properties {
            if !desc.is_configurable() && !seen.contains(key) {
                return Err(ObjectError::TypeError(format!(
                    "ownKeys: must include non-configurable property '{key}'"
                )));
            }
        }

        if !stand_in.extensible {
            let stand_in_keys: BTreeSet<&PropertyKey> = stand_in.properties.keys().collect();
            if stand_in_keys != seen {
                return Err(ObjectError::TypeError(
                    "ownKeys: non-extensible target requires exact key set".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// `[[GetPrototypeOf]]` (§9.5.1).
    pub fn check_get_prototype_of(
        stand_in: &OrdinaryObject,
        trap_result: Option<ObjectHandle>,
    ) -> Result<(), ObjectError> {
        if !stand_in.extensible && trap_result != stand_in.prototype {
            return Err(ObjectError::TypeError(
                "getPrototypeOf: non-extensible target must return same prototype".to_string(),
            ));
        }
        Ok(())
    }

    /// `[[SetPrototypeOf]]` (§9.5.2).
    pub fn check_set_prototype_of(
        stand_in: &OrdinaryObject,
        new_proto: Option<ObjectHandle>,
        trap_result: bool,
    ) -> Result<(), ObjectError> {
        if trap_result && !stand_in.extensible && new_proto != stand_in.prototype {
            return Err(ObjectError::TypeError(
                "setPrototypeOf: non-extensible target can only set to current prototype"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// `[[IsExtensible]]` (§9.5.3).
    pub fn check_is_extensible(
        stand_in: &OrdinaryObject,
        trap_result: bool,
    ) -> Result<(), ObjectError> {
        if trap_result != stand_in.extensible {
            return Err(ObjectError::TypeError(
                "isExtensible: must match target extensibility".to_string(),
            ));
        }
        Ok(())
    }

    /// `[[PreventExtensions]]` (§9.5.4).
    pub fn check_prevent_extensions(
        stand_in: &OrdinaryObject,
        trap_result: bool,
    ) -> Result<(), ObjectError> {
        if trap_result && stand_in.extensible {
            return Err(ObjectError::TypeError(
                "preventExtensions: cannot return true when target is still extensible"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// `[[DefineOwnProperty]]` (§9.5.6).
    pub fn check_define_own_property(
        stand_in: &OrdinaryObject,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
        trap_result: bool,
    ) -> Result<(), ObjectError> {
        if !trap_result {
            return Ok(());
        }
        let existing = stand_in.get_own_property(key);
        if existing.is_none() && !stand_in.extensible {
            return Err(ObjectError::TypeError(format!(
                "defineProperty: cannot add property '{key}' to non-extensible target"
            )));
        }
        if desc.is_configurable() {
            return Ok(());
        }
        match existing {
            Some(sd) if !sd.is_configurable() => {
                if let (
                    PropertyDescriptor::Data {
                        value: nv,
                        writable: false,
                        ..
                    },
                    PropertyDescriptor::Data {
                        value: sv,
                        writable: false,
                        ..
                    },
                ) = (desc, sd)
                    && !nv.same_value(sv)
                {
                    return Err(ObjectError::TypeError(format!(
                        "defineProperty: cannot change value of non-configurable non-writable property '{key}'"
                    )));
                }
                Ok(())
            }
            _ => Err(ObjectError::TypeError(format!(
                "defineProperty: cannot define non-configurable property '{key}' when target property is configurable or absent"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
