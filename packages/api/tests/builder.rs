//! Facade behavior: presets, fluent overrides, terminal operations

use refson::{ErrorKind, ObjectSchema, Refson, ReferenceMode, Schema, Value};
use std::rc::Rc;

fn self_referential() -> Value {
    let root = refson::value::new_object();
    root.borrow_mut().insert("Name", Value::from("Ada"));
    root.borrow_mut()
        .insert("Manager", Value::Object(Rc::clone(&root)));
    Value::Object(root)
}

#[test]
fn test_presets_select_reference_modes() {
    assert_eq!(
        Refson::new().options().reference_mode,
        ReferenceMode::Default
    );
    assert_eq!(
        Refson::ignore_cycles().options().reference_mode,
        ReferenceMode::Ignore
    );
    let preserve = Refson::preserve();
    assert_eq!(preserve.options().reference_mode, ReferenceMode::Preserve);
    assert!(preserve.options().read_references);
}

#[test]
fn test_preserve_round_trips_identity() {
    let text = Refson::preserve().to_string(&self_referential()).unwrap();
    assert_eq!(text, r#"{"$id":"1","Name":"Ada","Manager":{"$ref":"1"}}"#);

    let back = Refson::preserve().from_str(&text).unwrap();
    let manager = back
        .as_object()
        .unwrap()
        .borrow()
        .get("Manager")
        .cloned()
        .unwrap();
    assert!(manager.same_instance(&back));
}

#[test]
fn test_default_mode_fails_on_cycles() {
    let err = Refson::new().to_string(&self_referential()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CycleDetected);
}

#[test]
fn test_ignore_mode_drops_the_looping_member() {
    let text = Refson::ignore_cycles()
        .to_string(&self_referential())
        .unwrap();
    assert_eq!(text, r#"{"Name":"Ada"}"#);
}

#[test]
fn test_fluent_overrides_apply() {
    let builder = Refson::new()
        .reference_mode(ReferenceMode::Preserve)
        .read_references(true)
        .max_depth(7)
        .ignore_null_values(true);
    let options = builder.options();
    assert_eq!(options.reference_mode, ReferenceMode::Preserve);
    assert!(options.read_references);
    assert_eq!(options.max_depth, 7);
    assert!(options.ignore_null_values);
}

#[test]
fn test_schema_is_enforced_by_from_str() {
    let schema = Schema::object(
        ObjectSchema::new().property("items", Schema::immutable_array_of(Schema::Any)),
    );
    let err = Refson::preserve()
        .schema(schema)
        .from_str(r#"{"items":{"$id":"1","$values":[]}}"#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnresolvableTypeForPreservation);
}

#[test]
fn test_to_vec_matches_to_string() {
    let value = self_referential();
    let text = Refson::preserve().to_string(&value).unwrap();
    let bytes = Refson::preserve().to_vec(&value).unwrap();
    assert_eq!(bytes, text.into_bytes());
}

#[test]
fn test_incremental_deserializer_from_builder() {
    let mut deserializer = Refson::preserve().deserializer().unwrap();
    deserializer.feed(br#"{"$id":"1","a":"#).unwrap();
    deserializer.feed(br#"{"$ref":"1"}}"#).unwrap();
    let root = deserializer.finish().unwrap();
    let a = root
        .as_object()
        .unwrap()
        .borrow()
        .get("a")
        .cloned()
        .unwrap();
    assert!(a.same_instance(&root));
}

#[test]
fn test_zero_depth_rejected_at_operation_start() {
    let err = Refson::preserve()
        .max_depth(0)
        .to_string(&Value::object())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOptions);
}
