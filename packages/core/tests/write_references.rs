//! Write-side reference handling across the three policies

use refson_core::value::{new_array, new_object};
use refson_core::{ser, ErrorKind, JsonOptions, ReferenceMode, StructValue, Value};
use std::rc::Rc;

/// Employee-shaped object with a Name member
fn employee(name: Option<&str>) -> refson_core::ObjectRef {
    let obj = new_object();
    obj.borrow_mut().insert(
        "Name",
        name.map_or(Value::Null, |n| Value::String(n.to_string())),
    );
    obj
}

#[test]
fn test_self_referential_object_preserve() {
    let root = employee(None);
    root.borrow_mut()
        .insert("Manager", Value::Object(Rc::clone(&root)));

    let text = ser::to_string(&Value::Object(root), &JsonOptions::preserving()).unwrap();
    assert_eq!(text, r#"{"$id":"1","Name":null,"Manager":{"$ref":"1"}}"#);
}

#[test]
fn test_self_referential_object_ignore() {
    let root = employee(None);
    root.borrow_mut()
        .insert("Manager", Value::Object(Rc::clone(&root)));

    let text = ser::to_string(&Value::Object(root), &JsonOptions::ignoring_cycles()).unwrap();
    assert_eq!(text, r#"{"Name":null}"#);
}

#[test]
fn test_self_referential_object_default_fails() {
    let root = employee(None);
    root.borrow_mut()
        .insert("Manager", Value::Object(Rc::clone(&root)));

    let err = ser::to_string(&Value::Object(root), &JsonOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CycleDetected);
}

#[test]
fn test_shared_sub_object_preserve() {
    let bob = employee(Some("Bob"));
    let root = new_object();
    root.borrow_mut()
        .insert("Manager", Value::Object(Rc::clone(&bob)));
    root.borrow_mut().insert("Manager2", Value::Object(bob));

    let text = ser::to_string(&Value::Object(root), &JsonOptions::preserving()).unwrap();
    assert_eq!(
        text,
        r#"{"$id":"1","Manager":{"$id":"2","Name":"Bob"},"Manager2":{"$ref":"2"}}"#
    );
}

#[test]
fn test_array_containing_itself_preserve() {
    let list = new_array();
    for _ in 0..3 {
        let element = Value::Array(Rc::clone(&list));
        list.borrow_mut().push(element);
    }

    let text = ser::to_string(&Value::Array(list), &JsonOptions::preserving()).unwrap();
    assert_eq!(
        text,
        r#"{"$id":"1","$values":[{"$ref":"1"},{"$ref":"1"},{"$ref":"1"}]}"#
    );
}

#[test]
fn test_empty_preserved_array() {
    let text = ser::to_string(&Value::array(), &JsonOptions::preserving()).unwrap();
    assert_eq!(text, r#"{"$id":"1","$values":[]}"#);
}

#[test]
fn test_plain_array_outside_preserve_mode() {
    let list = new_array();
    list.borrow_mut().push(Value::from(1i64));
    list.borrow_mut().push(Value::from(2i64));
    let text = ser::to_string(&Value::Array(list), &JsonOptions::default()).unwrap();
    assert_eq!(text, "[1,2]");
}

#[test]
fn test_ignore_skips_cyclic_array_element_entirely() {
    let list = new_array();
    list.borrow_mut().push(Value::from("a"));
    let element = Value::Array(Rc::clone(&list));
    list.borrow_mut().push(element);
    list.borrow_mut().push(Value::from("b"));

    let text = ser::to_string(&Value::Array(list), &JsonOptions::ignoring_cycles()).unwrap();
    // The loop-closing element leaves no hole behind
    assert_eq!(text, r#"["a","b"]"#);
}

#[test]
fn test_ignore_writes_non_cyclic_duplicates_twice() {
    let shared = employee(Some("Bob"));
    let root = new_object();
    root.borrow_mut()
        .insert("a", Value::Object(Rc::clone(&shared)));
    root.borrow_mut().insert("b", Value::Object(shared));

    let text = ser::to_string(&Value::Object(root), &JsonOptions::ignoring_cycles()).unwrap();
    assert_eq!(text, r#"{"a":{"Name":"Bob"},"b":{"Name":"Bob"}}"#);
}

#[test]
fn test_identifiers_allocated_in_traversal_order() {
    let first = employee(Some("A"));
    let second = employee(Some("B"));
    let root = new_object();
    root.borrow_mut().insert("x", Value::Object(first));
    root.borrow_mut().insert("y", Value::Object(second));

    let text = ser::to_string(&Value::Object(root), &JsonOptions::preserving()).unwrap();
    assert_eq!(
        text,
        r#"{"$id":"1","x":{"$id":"2","Name":"A"},"y":{"$id":"3","Name":"B"}}"#
    );
}

#[test]
fn test_serialization_is_deterministic() {
    let bob = employee(Some("Bob"));
    let root = new_object();
    root.borrow_mut()
        .insert("Manager", Value::Object(Rc::clone(&bob)));
    root.borrow_mut().insert("Manager2", Value::Object(bob));
    let root = Value::Object(root);

    let options = JsonOptions::preserving();
    let first = ser::to_string(&root, &options).unwrap();
    let second = ser::to_string(&root, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_struct_values_are_inlined_every_time() {
    let point = StructValue::new()
        .field("x", Value::from(1i64))
        .field("y", Value::from(2i64));
    let root = new_object();
    root.borrow_mut().insert("a", Value::Struct(point.clone()));
    root.borrow_mut().insert("b", Value::Struct(point));

    let text = ser::to_string(&Value::Object(root), &JsonOptions::preserving()).unwrap();
    // Two full copies; the struct itself never carries an identifier
    assert_eq!(
        text,
        r#"{"$id":"1","a":{"x":1,"y":2},"b":{"x":1,"y":2}}"#
    );
}

#[test]
fn test_struct_members_with_identity_are_still_tracked() {
    let shared = employee(Some("Bob"));
    let holder = StructValue::new()
        .field("first", Value::Object(Rc::clone(&shared)))
        .field("second", Value::Object(shared));

    let text = ser::to_string(&Value::Struct(holder), &JsonOptions::preserving()).unwrap();
    assert_eq!(
        text,
        r#"{"first":{"$id":"1","Name":"Bob"},"second":{"$ref":"1"}}"#
    );
}

#[test]
fn test_ignore_null_values_skips_null_members() {
    let root = employee(None);
    root.borrow_mut().insert("Age", Value::from(3i64));
    let options = JsonOptions {
        ignore_null_values: true,
        ..JsonOptions::default()
    };
    let text = ser::to_string(&Value::Object(root), &options).unwrap();
    assert_eq!(text, r#"{"Age":3}"#);
}

#[test]
fn test_null_slot_is_plain_null_even_in_preserve_mode() {
    let root = new_object();
    root.borrow_mut().insert("Manager", Value::Null);
    let text = ser::to_string(&Value::Object(root), &JsonOptions::preserving()).unwrap();
    assert_eq!(text, r#"{"$id":"1","Manager":null}"#);
}

#[test]
fn test_deep_nesting_fails_with_depth_exceeded_when_tracking() {
    let root = new_object();
    let mut cursor = Rc::clone(&root);
    for _ in 0..40 {
        let next = new_object();
        cursor
            .borrow_mut()
            .insert("child", Value::Object(Rc::clone(&next)));
        cursor = next;
    }
    let options = JsonOptions {
        max_depth: 16,
        ..JsonOptions::preserving()
    };
    let err = ser::to_string(&Value::Object(root), &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DepthExceeded);
}

#[test]
fn test_cycle_detected_error_names_the_looping_path() {
    let root = new_object();
    root.borrow_mut()
        .insert("next", Value::Object(Rc::clone(&root)));
    let options = JsonOptions {
        max_depth: 4,
        ..JsonOptions::default()
    };
    let err = ser::to_string(&Value::Object(root), &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CycleDetected);
    assert!(err.path().starts_with("$.next"));
}

#[test]
fn test_invalid_options_rejected_before_writing() {
    let options = JsonOptions {
        max_depth: 0,
        reference_mode: ReferenceMode::Preserve,
        ..JsonOptions::default()
    };
    let err = ser::to_string(&Value::object(), &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOptions);
}

#[test]
fn test_output_parses_as_plain_json() {
    let root = employee(Some("Ada"));
    root.borrow_mut()
        .insert("Self", Value::Object(Rc::clone(&root)));
    let text = ser::to_string(&Value::Object(root), &JsonOptions::preserving()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["$id"], "1");
    assert_eq!(parsed["Self"]["$ref"], "1");
}
