//! End-to-end behavior of guarded views through the public heap API.
//!
//! Each section drives a scenario the way test code would: build a value,
//! guard it, then read, enumerate or attempt to mutate through the view.

use frankenengine_mutation_guard::{
    GuardOptions, JsValue, MutationAssertion, ObjectError, ObjectHandle, ObjectHeap,
    PropertyDescriptor, PropertyKey, TrapKind, guard,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

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
    err.as_mutation_assertion()
        .cloned()
        .unwrap_or_else(|| panic!("expected mutation assertion, got {err}"))
}

/// `{a: {b: 1}, n: 2}`, returning `(outer, inner)`.
fn nested(heap: &mut ObjectHeap) -> (ObjectHandle, ObjectHandle) {
    let inner = heap.create_object();
    heap.define_value(inner, "b", 1).unwrap();
    let outer = heap.create_object();
    heap.define_value(outer, "a", inner).unwrap();
    heap.define_value(outer, "n", 2).unwrap();
    (outer, inner)
}

// ===========================================================================
// 1. Primitives
// ===========================================================================

#[test]
fn primitives_are_returned_unchanged() {
    let mut heap = ObjectHeap::new();
    let sym = heap.alloc_symbol();
    let values = [
        JsValue::Undefined,
        JsValue::Null,
        JsValue::Bool(false),
        int_val(-7),
        JsValue::Str("text".into()),
        JsValue::Symbol(sym),
    ];
    for value in values {
        for options in [GuardOptions::default(), GuardOptions::deep().with_prototype()] {
            assert_eq!(guard(&mut heap, value.clone(), &options).unwrap(), value);
        }
    }
}

// ===========================================================================
// 2. Reads
// ===========================================================================

#[test]
fn shallow_reads_match_target() {
    let mut heap = ObjectHeap::new();
    let (outer, inner) = nested(&mut heap);
    let view = guarded(&mut heap, outer, &GuardOptions::default());

    assert_eq!(heap.get_property(view, &str_key("n")).unwrap(), int_val(2));
    assert_eq!(
        heap.get_property(view, &str_key("a")).unwrap(),
        JsValue::Object(inner)
    );
    assert_eq!(
        heap.get_property(view, &str_key("missing")).unwrap(),
        JsValue::Undefined
    );
}

#[test]
fn deep_reads_wrap_the_same_nested_object() {
    let mut heap = ObjectHeap::new();
    let (outer, inner) = nested(&mut heap);
    let view = guarded(&mut heap, outer, &GuardOptions::deep());

    assert_eq!(heap.get_property(view, &str_key("n")).unwrap(), int_val(2));
    let a = heap
        .get_property(view, &str_key("a"))
        .unwrap()
        .as_object()
        .unwrap();
    assert_ne!(a, inner);
    assert!(heap.is_guarded(a).unwrap());
    assert_eq!(heap.underlying(a).unwrap(), inner);
    assert_eq!(heap.get_property(a, &str_key("b")).unwrap(), int_val(1));
}

#[test]
fn inherited_reads_go_through() {
    let mut heap = ObjectHeap::new();
    let proto = heap.create_object();
    heap.define_value(proto, "shared", 9).unwrap();
    let target = heap.create(Some(proto));
    let view = guarded(&mut heap, target, &GuardOptions::default());

    assert_eq!(heap.get_property(view, &str_key("shared")).unwrap(), int_val(9));
}

// ===========================================================================
// 3. Writes are refused
// ===========================================================================

#[test]
fn set_raises_with_member_path() {
    let mut heap = ObjectHeap::new();
    let (outer, _) = nested(&mut heap);
    let view = guarded(&mut heap, outer, &GuardOptions::default());

    let err = heap
        .set_property(view, str_key("n"), int_val(3))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Mutation assertion failed. `set` trap triggered on `target.n`."
    );
    assert_eq!(heap.get_property(outer, &str_key("n")).unwrap(), int_val(2));
}

#[test]
fn set_of_new_property_raises_and_adds_nothing() {
    let mut heap = ObjectHeap::new();
    let (outer, _) = nested(&mut heap);
    let view = guarded(&mut heap, outer, &GuardOptions::default());

    let err = assertion(heap.set_property(view, str_key("fresh"), int_val(1)).unwrap_err());
    assert_eq!(err, MutationAssertion::new(TrapKind::Set, "target.fresh"));
    assert_eq!(heap.keys(outer).unwrap(), vec!["a", "n"]);
}

#[test]
fn set_paths_follow_key_shape() {
    let mut heap = ObjectHeap::new();
    let target = heap.create_object();
    let sym = heap.alloc_symbol();
    let view = guarded(&mut heap, target, &GuardOptions::default());

    let cases = [
        (str_key("0"), "target[0]"),
        (str_key("12"), "target[\"12\"]"),
        (str_key("has space"), "target[\"has space\"]"),
        (str_key("$ok_1"), "target.$ok_1"),
        (PropertyKey::Symbol(sym), "target[Symbol(1)]"),
    ];
    for (key, path) in cases {
        let err = assertion(heap.set_property(view, key, int_val(0)).unwrap_err());
        assert_eq!(err.path, path);
        assert_eq!(err.trap, TrapKind::Set);
    }
}

#[test]
fn delete_raises_and_keeps_property() {
    let mut heap = ObjectHeap::new();
    let (outer, _) = nested(&mut heap);
    let view = guarded(&mut heap, outer, &GuardOptions::default());

    let err = heap.delete_property(view, &str_key("n")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Mutation assertion failed. `deleteProperty` trap triggered on `target.n`."
    );
    assert!(heap.has_property(outer, &str_key("n")).unwrap());
}

#[test]
fn define_property_raises_and_keeps_descriptor() {
    let mut heap = ObjectHeap::new();
    let (outer, _) = nested(&mut heap);
    let view = guarded(&mut heap, outer, &GuardOptions::default());

    let err = heap
        .define_property(view, str_key("n"), PropertyDescriptor::data_frozen(int_val(5)))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Mutation assertion failed. `defineProperty` trap triggered on `target.n`."
    );
    assert_eq!(
        heap.get_own_property_descriptor(outer, &str_key("n")).unwrap(),
        Some(PropertyDescriptor::data(int_val(2)))
    );
}

#[test]
fn prevent_extensions_raises_without_suffix() {
    let mut heap = ObjectHeap::new();
    let (outer, _) = nested(&mut heap);
    let view = guarded(&mut heap, outer, &GuardOptions::default());

    let err = heap.prevent_extensions(view).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Mutation assertion failed. `preventExtensions` trap triggered on `target`."
    );
    assert!(heap.is_extensible(outer).unwrap());
    assert!(heap.is_extensible(view).unwrap());
}

#[test]
fn freeze_and_assign_through_view_raise() {
    let mut heap = ObjectHeap::new();
    let (outer, _) = nested(&mut heap);
    let view = guarded(&mut heap, outer, &GuardOptions::default());
    let source = heap.from_entries(vec![("n".into(), int_val(10))]);

    assert_eq!(
        assertion(heap.freeze(view).unwrap_err()).trap,
        TrapKind::PreventExtensions
    );
    assert_eq!(
        assertion(heap.assign(view, source).unwrap_err()),
        MutationAssertion::new(TrapKind::Set, "target.n")
    );
    assert_eq!(heap.get_property(outer, &str_key("n")).unwrap(), int_val(2));
    assert!(!heap.is_frozen(outer).unwrap());
}

// ===========================================================================
// 4. Prototype option boundary
// ===========================================================================

#[test]
fn set_prototype_raises_with_prototype_option() {
    let mut heap = ObjectHeap::new();
    let target = heap.create_object();
    let other = heap.create_object();
    let view = guarded(&mut heap, target, &GuardOptions::default().with_prototype());

    let err = heap.set_prototype_of(view, Some(other)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Mutation assertion failed. `setPrototypeOf` trap triggered on `target.__proto__`."
    );
    assert_eq!(
        heap.get_prototype_of(target).unwrap(),
        Some(heap.object_prototype())
    );
}

#[test]
fn set_prototype_passes_through_without_prototype_option() {
    let mut heap = ObjectHeap::new();
    let target = heap.create_object();
    let other = heap.create_object();
    let view = guarded(&mut heap, target, &GuardOptions::default());

    assert!(heap.set_prototype_of(view, Some(other)).unwrap());
    assert_eq!(heap.get_prototype_of(target).unwrap(), Some(other));
    assert_eq!(heap.get_prototype_of(view).unwrap(), Some(other));
}

#[test]
fn prototype_reads_are_raw_unless_deep_and_guarded() {
    let mut heap = ObjectHeap::new();
    let target = heap.create_object();
    let object_prototype = heap.object_prototype();

    let plain = guarded(&mut heap, target, &GuardOptions::default());
    assert_eq!(heap.get_prototype_of(plain).unwrap(), Some(object_prototype));

    let shallow = guarded(&mut heap, target, &GuardOptions::default().with_prototype());
    assert_eq!(heap.get_prototype_of(shallow).unwrap(), Some(object_prototype));

    let deep = guarded(&mut heap, target, &GuardOptions::deep().with_prototype());
    let proto = heap.get_prototype_of(deep).unwrap().unwrap();
    assert_ne!(proto, object_prototype);
    assert_eq!(heap.underlying(proto).unwrap(), object_prototype);
    let err = assertion(
        heap.set_property(proto, str_key("polluted"), JsValue::Bool(true))
            .unwrap_err(),
    );
    assert_eq!(err.path, "target.__proto__.polluted");
    assert!(!heap.has_property(target, &str_key("polluted")).unwrap());
}

// ===========================================================================
// 5. Enumeration
// ===========================================================================

#[test]
fn enumeration_matches_target() {
    let mut heap = ObjectHeap::new();
    let proto = heap.create_object();
    heap.define_value(proto, "inherited", 1).unwrap();
    let target = heap.create(Some(proto));
    heap.define_value(target, "b", 2).unwrap();
    heap.define_value(target, "1", 3).unwrap();
    heap.define_property(
        target,
        str_key("hidden"),
        PropertyDescriptor::Data {
            value: int_val(4),
            writable: true,
            enumerable: false,
            configurable: true,
        },
    )
    .unwrap();

    for options in [
        GuardOptions::default(),
        GuardOptions::deep(),
        GuardOptions::deep().with_prototype(),
    ] {
        let view = guarded(&mut heap, target, &options);
        assert_eq!(heap.keys(view).unwrap(), heap.keys(target).unwrap());
        assert_eq!(heap.for_in_keys(view).unwrap(), heap.for_in_keys(target).unwrap());
        assert_eq!(
            heap.get_own_property_names(view).unwrap(),
            heap.get_own_property_names(target).unwrap()
        );
        assert_eq!(
            heap.own_property_keys(view).unwrap(),
            heap.own_property_keys(target).unwrap()
        );
        for key in ["b", "1", "hidden", "inherited", "nope"] {
            assert_eq!(
                heap.has_property(view, &str_key(key)).unwrap(),
                heap.has_property(target, &str_key(key)).unwrap(),
                "`{key}` in view"
            );
        }
    }
    assert_eq!(heap.keys(target).unwrap(), vec!["1", "b"]);
    assert_eq!(heap.for_in_keys(target).unwrap(), vec!["1", "b", "inherited"]);
}

// ===========================================================================
// 6. Deep vs shallow
// ===========================================================================

#[test]
fn deep_nested_write_raises_with_full_path() {
    let mut heap = ObjectHeap::new();
    let (outer, inner) = nested(&mut heap);
    let view = guarded(&mut heap, outer, &GuardOptions::deep());

    let a = heap
        .get_property(view, &str_key("a"))
        .unwrap()
        .as_object()
        .unwrap();
    let err = heap.set_property(a, str_key("b"), int_val(2)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Mutation assertion failed. `set` trap triggered on `target.a.b`."
    );
    assert_eq!(heap.get_property(inner, &str_key("b")).unwrap(), int_val(1));
}

#[test]
fn shallow_nested_write_is_not_intercepted() {
    let mut heap = ObjectHeap::new();
    let (outer, inner) = nested(&mut heap);
    let view = guarded(&mut heap, outer, &GuardOptions::default());

    let a = heap
        .get_property(view, &str_key("a"))
        .unwrap()
        .as_object()
        .unwrap();
    assert_eq!(a, inner);
    assert!(!heap.is_guarded(a).unwrap());
    assert!(heap.set_property(a, str_key("b"), int_val(2)).unwrap());
    assert_eq!(heap.get_property(inner, &str_key("b")).unwrap(), int_val(2));
}

#[test]
fn deep_paths_accumulate_through_levels() {
    let mut heap = ObjectHeap::new();
    let leaf = heap.create_object();
    let list = heap.create_object();
    heap.define_value(list, "0", leaf).unwrap();
    let root = heap.create_object();
    heap.define_value(root, "items", list).unwrap();
    let view = guarded(&mut heap, root, &GuardOptions::deep());

    let items = heap.get_property(view, &str_key("items")).unwrap().as_object().unwrap();
    let first = heap.get_property(items, &str_key("0")).unwrap().as_object().unwrap();
    let err = assertion(heap.delete_property(first, &str_key("id")).unwrap_err());
    assert_eq!(err, MutationAssertion::new(TrapKind::DeleteProperty, "target.items[0].id"));
}

// ===========================================================================
// 7. Descriptor stability
// ===========================================================================

#[test]
fn read_only_descriptor_queries_are_stable() {
    let mut heap = ObjectHeap::new();
    let inner = heap.create_object();
    let target = heap.create_object();
    heap.define_property(target, str_key("fixed"), PropertyDescriptor::data_frozen(int_val(1)))
        .unwrap();
    heap.define_property(
        target,
        str_key("obj"),
        PropertyDescriptor::data_frozen(JsValue::Object(inner)),
    )
    .unwrap();

    for options in [GuardOptions::default(), GuardOptions::deep()] {
        let view = guarded(&mut heap, target, &options);
        for key in ["fixed", "obj"] {
            let first = heap.get_own_property_descriptor(view, &str_key(key)).unwrap();
            let second = heap.get_own_property_descriptor(view, &str_key(key)).unwrap();
            let third = heap.get_own_property_descriptor(view, &str_key(key)).unwrap();
            assert!(first.is_some());
            assert_eq!(first, second);
            assert_eq!(second, third);
            assert!(!first.unwrap().is_configurable());
        }
    }
}

#[test]
fn deep_read_only_value_is_guarded_in_descriptor() {
    let mut heap = ObjectHeap::new();
    let inner = heap.create_object();
    let target = heap.create_object();
    heap.define_property(
        target,
        str_key("obj"),
        PropertyDescriptor::data_frozen(JsValue::Object(inner)),
    )
    .unwrap();
    let view = guarded(&mut heap, target, &GuardOptions::deep());

    let desc = heap
        .get_own_property_descriptor(view, &str_key("obj"))
        .unwrap()
        .unwrap();
    let value = desc.value().and_then(JsValue::as_object).unwrap();
    assert_eq!(heap.underlying(value).unwrap(), inner);
    let err = assertion(heap.set_property(value, str_key("x"), int_val(1)).unwrap_err());
    assert_eq!(err.path, "target.obj.descriptor.value.x");
}

// ===========================================================================
// 8. Setters and getters
// ===========================================================================

/// Target with accessor `x` backed by own data property `raw`.
fn with_accessor(heap: &mut ObjectHeap) -> ObjectHandle {
    let getter = heap.create_function("get x", |heap, this, _| {
        let this = this
            .as_object()
            .ok_or_else(|| ObjectError::TypeError("no receiver".into()))?;
        heap.get_property(this, &"raw".into())
    });
    let setter = heap.create_function("set x", |heap, this, args| {
        let this = this
            .as_object()
            .ok_or_else(|| ObjectError::TypeError("no receiver".into()))?;
        let value = args.first().cloned().unwrap_or(JsValue::Undefined);
        heap.set_property(this, "raw".into(), value)?;
        Ok(JsValue::Undefined)
    });
    let target = heap.create_object();
    heap.define_accessor(target, "x", Some(getter), Some(setter))
        .unwrap();
    heap.define_value(target, "raw", 1).unwrap();
    target
}

fn setter_of(heap: &mut ObjectHeap, view: ObjectHandle) -> ObjectHandle {
    match heap.get_own_property_descriptor(view, &str_key("x")).unwrap() {
        Some(PropertyDescriptor::Accessor { set: Some(s), .. }) => s,
        other => panic!("expected accessor with setter, got {other:?}"),
    }
}

#[test]
fn shallow_setter_invocation_is_allowed() {
    let mut heap = ObjectHeap::new();
    let target = with_accessor(&mut heap);
    let view = guarded(&mut heap, target, &GuardOptions::default());

    let setter = setter_of(&mut heap, view);
    assert!(heap.is_guarded(setter).unwrap());
    heap.call(&JsValue::Object(setter), &JsValue::Object(target), &[int_val(5)])
        .unwrap();
    assert_eq!(heap.get_property(target, &str_key("raw")).unwrap(), int_val(5));
}

#[test]
fn deep_setter_invocation_raises() {
    let mut heap = ObjectHeap::new();
    let target = with_accessor(&mut heap);
    let view = guarded(&mut heap, target, &GuardOptions::deep());

    let setter = setter_of(&mut heap, view);
    let err = heap
        .call(&JsValue::Object(setter), &JsValue::Object(target), &[int_val(5)])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Mutation assertion failed. `apply` trap triggered on `target.x.descriptor.set()`."
    );
    assert_eq!(heap.get_property(target, &str_key("raw")).unwrap(), int_val(1));
}

#[test]
fn accessor_set_through_view_raises() {
    let mut heap = ObjectHeap::new();
    let target = with_accessor(&mut heap);
    let view = guarded(&mut heap, target, &GuardOptions::default());

    let err = assertion(heap.set_property(view, str_key("x"), int_val(5)).unwrap_err());
    assert_eq!(err, MutationAssertion::new(TrapKind::Set, "target.x"));
    assert_eq!(heap.get_property(view, &str_key("x")).unwrap(), int_val(1));
}

#[test]
fn deep_getter_results_are_guarded_with_call_path() {
    let mut heap = ObjectHeap::new();
    let inner = heap.create_object();
    let getter = heap.create_function("get", move |_, _, _| Ok(JsValue::Object(inner)));
    let target = heap.create_object();
    heap.define_accessor(target, "x", Some(getter), None).unwrap();
    let view = guarded(&mut heap, target, &GuardOptions::deep());

    let Some(PropertyDescriptor::Accessor { get: Some(g), .. }) =
        heap.get_own_property_descriptor(view, &str_key("x")).unwrap()
    else {
        panic!("expected accessor with getter");
    };
    assert_ne!(g, getter);
    let result = heap
        .call(&JsValue::Object(g), &JsValue::Object(view), &[])
        .unwrap()
        .as_object()
        .unwrap();
    assert_eq!(heap.underlying(result).unwrap(), inner);
    let err = assertion(heap.set_property(result, str_key("y"), int_val(1)).unwrap_err());
    assert_eq!(err.path, "target.x.descriptor.get().y");

    // Calling twice does not accumulate call markers.
    let again = heap
        .call(&JsValue::Object(g), &JsValue::Object(view), &[])
        .unwrap()
        .as_object()
        .unwrap();
    assert_eq!(
        heap.guarded_view(again).unwrap().path(),
        "target.x.descriptor.get()"
    );
}

#[test]
fn deep_accessor_read_is_guarded_under_property_path() {
    let mut heap = ObjectHeap::new();
    let inner = heap.create_object();
    let getter = heap.create_function("get", move |_, _, _| Ok(JsValue::Object(inner)));
    let target = heap.create_object();
    heap.define_accessor(target, "x", Some(getter), None).unwrap();
    let view = guarded(&mut heap, target, &GuardOptions::deep());

    let x = heap.get_property(view, &str_key("x")).unwrap().as_object().unwrap();
    let err = assertion(heap.set_property(x, str_key("y"), int_val(1)).unwrap_err());
    assert_eq!(err.path, "target.x.y");
}

// ===========================================================================
// 9. Naming
// ===========================================================================

#[test]
fn function_name_is_inferred() {
    let mut heap = ObjectHeap::new();
    let f = heap.create_function("compute", |_, _, _| Ok(JsValue::Undefined));
    let view = guarded(&mut heap, f, &GuardOptions::default());

    let err = assertion(heap.set_property(view, str_key("cache"), int_val(1)).unwrap_err());
    assert_eq!(err.path, "compute.cache");
}

#[test]
fn explicit_name_and_path_combine() {
    let mut heap = ObjectHeap::new();
    let target = heap.create_object();

    let named = guarded(&mut heap, target, &GuardOptions::default().named("config"));
    assert_eq!(
        assertion(heap.delete_property(named, &str_key("a")).unwrap_err()).path,
        "config.a"
    );

    let rooted = guarded(
        &mut heap,
        target,
        &GuardOptions::default().named("config").at_path("args[0]"),
    );
    assert_eq!(
        assertion(heap.delete_property(rooted, &str_key("a")).unwrap_err()).path,
        "args[0].config.a"
    );

    let path_only = guarded(&mut heap, target, &GuardOptions::default().at_path("input"));
    assert_eq!(
        assertion(heap.delete_property(path_only, &str_key("a")).unwrap_err()).path,
        "input.a"
    );
}

#[test]
fn hidden_name_falls_back_to_target() {
    let mut heap = ObjectHeap::new();
    let f = heap.create_function("compute", |_, _, _| Ok(JsValue::Undefined));
    let view = guarded(&mut heap, f, &GuardOptions::default().hidden());

    let err = assertion(heap.set_property(view, str_key("cache"), int_val(1)).unwrap_err());
    assert_eq!(err.path, "target.cache");
}

#[test]
fn non_string_name_is_ignored() {
    let mut heap = ObjectHeap::new();
    let target = heap.create_object();
    heap.define_value(target, "name", 42).unwrap();
    let view = guarded(&mut heap, target, &GuardOptions::default());

    let err = assertion(heap.set_property(view, str_key("x"), int_val(1)).unwrap_err());
    assert_eq!(err.path, "target.x");
}

#[test]
fn options_from_json_drive_the_guard() {
    let mut heap = ObjectHeap::new();
    let (outer, _) = nested(&mut heap);
    let options = GuardOptions::from_json(r#"{"deep": true, "name": "state"}"#).unwrap();
    let view = guarded(&mut heap, outer, &options);

    let a = heap.get_property(view, &str_key("a")).unwrap().as_object().unwrap();
    let err = assertion(heap.set_property(a, str_key("b"), int_val(2)).unwrap_err());
    assert_eq!(err.path, "state.a.b");
}

// ===========================================================================
// 10. Functions
// ===========================================================================

#[test]
fn guarded_function_is_callable_and_constructable() {
    let mut heap = ObjectHeap::new();
    let ctor = heap.create_constructor("Point", |heap, this, args| {
        let this = this
            .as_object()
            .ok_or_else(|| ObjectError::TypeError("no receiver".into()))?;
        heap.set_property(this, "x".into(), args.first().cloned().unwrap_or(JsValue::Undefined))?;
        Ok(JsValue::Undefined)
    });
    let view = guarded(&mut heap, ctor, &GuardOptions::default());

    assert_eq!(heap.type_of(&JsValue::Object(view)).unwrap(), "function");
    assert!(heap.is_constructor(view).unwrap());
    let point = heap
        .construct(&JsValue::Object(view), &[int_val(3)])
        .unwrap()
        .as_object()
        .unwrap();
    assert_eq!(heap.get_property(point, &str_key("x")).unwrap(), int_val(3));

    let err = assertion(
        heap.set_property(view, str_key("prototype"), JsValue::Null)
            .unwrap_err(),
    );
    assert_eq!(err.path, "Point.prototype");
}

#[test]
fn guarded_plain_function_call_returns_raw_result() {
    let mut heap = ObjectHeap::new();
    let f = heap.create_function("seven", |_, _, _| Ok(JsValue::Int(7)));
    let view = guarded(&mut heap, f, &GuardOptions::deep());

    assert_eq!(
        heap.call(&JsValue::Object(view), &JsValue::Undefined, &[]).unwrap(),
        int_val(7)
    );
    assert!(heap.construct(&JsValue::Object(view), &[]).is_err());
}

// ===========================================================================
// 11. Event journal
// ===========================================================================

#[test]
fn journal_records_wraps_and_blocks() {
    let mut heap = ObjectHeap::new();
    let (outer, _) = nested(&mut heap);
    let view = guarded(&mut heap, outer, &GuardOptions::deep());
    let a = heap.get_property(view, &str_key("a")).unwrap().as_object().unwrap();
    let _ = heap.set_property(a, str_key("b"), int_val(2));

    let counts = heap.event_counts();
    assert_eq!(counts.get("wrapped"), Some(&2));
    assert_eq!(counts.get("blocked"), Some(&1));

    let lines: Vec<String> = heap
        .drain_events()
        .iter()
        .map(|e| e.to_json_line().unwrap())
        .collect();
    assert_eq!(
        lines.last().map(String::as_str),
        Some(r#"{"event_type":"blocked","trap":"set","path":"target.a.b"}"#)
    );
    assert!(heap.event_counts().is_empty());
}
