//! Reference-preserving JSON serialization
//!
//! JSON cannot express object graphs with cycles, shared sub-objects, or
//! self-references. This crate serializes such graphs by embedding
//! `$id`/`$ref`/`$values` metadata and rebuilds them, identity intact,
//! on the way back in.
//!
//! All configuration flows through a fluent builder:
//!
//! ```
//! use refson::{Refson, Value};
//!
//! // An object that reports to itself
//! let root = refson::value::new_object();
//! root.borrow_mut().insert("name", Value::from("Ada"));
//! root.borrow_mut().insert("manager", Value::Object(root.clone()));
//!
//! let text = Refson::preserve().to_string(&Value::Object(root)).unwrap();
//! assert_eq!(text, r#"{"$id":"1","name":"Ada","manager":{"$ref":"1"}}"#);
//!
//! let back = Refson::preserve().from_str(&text).unwrap();
//! let manager = back.as_object().unwrap().borrow().get("manager").cloned().unwrap();
//! assert!(manager.same_instance(&back));
//! ```
//!
//! The three write policies:
//!
//! - `Refson::new()`: no tracking; a reference loop fails with
//!   `CycleDetected` once the depth ceiling is hit.
//! - `Refson::ignore_cycles()`: members that would close a loop are
//!   silently omitted.
//! - `Refson::preserve()`: every composite gets an `$id`, repeats become
//!   `{"$ref": …}`, and reading resolves them back to shared instances.

#![deny(unsafe_code)]

pub use refson_core::{
    de, error, options, ser, value, ArrayKind, ArrayRef, Deserializer, Error, ErrorKind,
    JsonOptions, Number, ObjectRef, ObjectSchema, ReadStats, ReferenceMode, Result, Schema,
    StructValue, Value, DEFAULT_MAX_DEPTH,
};

pub mod builder;

pub use builder::JsonBuilder;

/// Entry point providing preset builder constructors
pub struct Refson;

impl Refson {
    /// Builder with default options: no reference tracking on either side
    pub fn new() -> JsonBuilder {
        JsonBuilder::new(JsonOptions::default())
    }

    /// Builder that preserves references on write and resolves them on read
    pub fn preserve() -> JsonBuilder {
        JsonBuilder::new(JsonOptions::preserving())
    }

    /// Builder that drops loop-closing members on write
    pub fn ignore_cycles() -> JsonBuilder {
        JsonBuilder::new(JsonOptions::ignoring_cycles())
    }
}
