//! Read-side metadata interpretation and graph reconstruction

use refson_core::{de, JsonOptions, Value};

fn preserving() -> JsonOptions {
    JsonOptions::preserving()
}

fn member(value: &Value, name: &str) -> Value {
    value
        .as_object()
        .expect("object value")
        .borrow()
        .get(name)
        .cloned()
        .unwrap_or(Value::Null)
}

fn element(value: &Value, index: usize) -> Value {
    value
        .as_array()
        .expect("array value")
        .borrow()
        .get(index)
        .cloned()
        .unwrap_or(Value::Null)
}

#[test]
fn test_self_reference_resolves_to_same_instance() {
    let text = r#"{"$id":"1","Name":null,"Manager":{"$ref":"1"}}"#;
    let root = de::from_str(text, &preserving()).unwrap();
    assert!(member(&root, "Manager").same_instance(&root));
    assert!(member(&root, "Name").is_null());
}

#[test]
fn test_shared_sub_object_resolves_once() {
    let text = r#"{"$id":"1","Manager":{"$id":"2","Name":"Bob"},"Manager2":{"$ref":"2"}}"#;
    let root = de::from_str(text, &preserving()).unwrap();
    let manager = member(&root, "Manager");
    let manager2 = member(&root, "Manager2");
    assert!(manager.same_instance(&manager2));
    assert_eq!(member(&manager2, "Name").as_str(), Some("Bob"));
}

#[test]
fn test_preserved_array_unwraps() {
    let text = r#"{"$id":"1","$values":[1,2,3]}"#;
    let root = de::from_str(text, &preserving()).unwrap();
    let items = root.as_array().expect("array").borrow();
    assert_eq!(items.len(), 3);
    assert_eq!(items.get(0).and_then(Value::as_number).unwrap().as_i64(), Some(1));
}

#[test]
fn test_array_containing_itself() {
    let text = r#"{"$id":"1","$values":[{"$ref":"1"},{"$ref":"1"},{"$ref":"1"}]}"#;
    let root = de::from_str(text, &preserving()).unwrap();
    for index in 0..3 {
        assert!(element(&root, index).same_instance(&root));
    }
}

#[test]
fn test_reference_into_still_populating_ancestor() {
    let text = r#"{"$id":"1","Subordinates":{"$id":"2","$values":[{"$id":"3","Name":"A","Subordinates":{"$ref":"2"}}]}}"#;
    let root = de::from_str(text, &preserving()).unwrap();
    let subordinates = member(&root, "Subordinates");
    let first = element(&subordinates, 0);
    assert!(member(&first, "Subordinates").same_instance(&subordinates));
}

#[test]
fn test_unknown_reference_yields_null() {
    let text = r#"{"$id":"1","Manager":{"$ref":"42"}}"#;
    let root = de::from_str(text, &preserving()).unwrap();
    assert!(member(&root, "Manager").is_null());
}

#[test]
fn test_root_reference_to_unknown_id_is_null() {
    let root = de::from_str(r#"{"$ref":"7"}"#, &preserving()).unwrap();
    assert!(root.is_null());
}

#[test]
fn test_identifier_after_regular_members_is_tolerated() {
    let text = r#"{"Name":"X","$id":"1","Self":{"$ref":"1"}}"#;
    let root = de::from_str(text, &preserving()).unwrap();
    assert!(member(&root, "Self").same_instance(&root));
}

#[test]
fn test_metadata_ignored_when_reading_is_off() {
    let text = r#"{"$id":"1","$ref":"2"}"#;
    let root = de::from_str(text, &JsonOptions::default()).unwrap();
    assert_eq!(member(&root, "$id").as_str(), Some("1"));
    assert_eq!(member(&root, "$ref").as_str(), Some("2"));
}

#[test]
fn test_dollar_prefixed_names_outside_metadata_are_regular() {
    let text = r#"{"$id":"1","$custom":7,"$idx":"x"}"#;
    let root = de::from_str(text, &preserving()).unwrap();
    assert_eq!(
        member(&root, "$custom").as_number().unwrap().as_i64(),
        Some(7)
    );
    assert_eq!(member(&root, "$idx").as_str(), Some("x"));
}

#[test]
fn test_shared_array_reference() {
    let text = r#"{"$id":"1","a":{"$id":"2","$values":["x"]},"b":{"$ref":"2"}}"#;
    let root = de::from_str(text, &preserving()).unwrap();
    let a = member(&root, "a");
    let b = member(&root, "b");
    assert!(a.same_instance(&b));
    assert_eq!(element(&a, 0).as_str(), Some("x"));
}

#[test]
fn test_empty_preserved_object_is_referenceable() {
    let text = r#"{"$id":"1","a":{"$id":"2"},"b":{"$ref":"2"}}"#;
    let root = de::from_str(text, &preserving()).unwrap();
    assert!(member(&root, "a").same_instance(&member(&root, "b")));
}

#[test]
fn test_nested_preserved_arrays() {
    let text = r#"{"$id":"1","$values":[{"$id":"2","$values":[true]}]}"#;
    let root = de::from_str(text, &preserving()).unwrap();
    let inner = element(&root, 0);
    assert_eq!(element(&inner, 0).as_bool(), Some(true));
}

#[test]
fn test_scalar_root_values() {
    let options = preserving();
    assert_eq!(de::from_str("42", &options).unwrap().as_number().unwrap().as_i64(), Some(42));
    assert_eq!(de::from_str("\"x\"", &options).unwrap().as_str(), Some("x"));
    assert!(de::from_str("null", &options).unwrap().is_null());
}

#[test]
fn test_read_stats_count_identifiers_and_references() {
    let options = preserving();
    let mut deserializer = refson_core::Deserializer::new(&options).unwrap();
    deserializer
        .feed(br#"{"$id":"1","a":{"$ref":"1"},"b":{"$ref":"9"}}"#)
        .unwrap();
    let stats = deserializer.stats();
    assert_eq!(stats.identifiers_registered, 1);
    assert_eq!(stats.references_resolved, 2);
    assert!(stats.tokens > 0);
    assert!(deserializer.is_complete());
    deserializer.finish().unwrap();
}
