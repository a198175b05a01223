//! Reference-preserving JSON engine
//!
//! JSON cannot express an object graph that contains cycles, shared
//! sub-objects, or self-references. This crate closes the gap with two
//! cooperating mechanisms:
//!
//! - **On write**, a policy ([`ReferenceMode`]) that fails loudly on
//!   runaway recursion (`Default`), suppresses members that would close a
//!   loop (`Ignore`), or embeds `$id`/`$ref`/`$values` metadata so the
//!   full graph round-trips (`Preserve`).
//! - **On read**, a metadata-aware pull parser that builds an
//!   identifier-to-object table as it goes, resolves references
//!   (including references into composites that are still being
//!   populated), and grafts the referents into the result.
//!
//! Values live in a graph model ([`Value`]) whose objects and arrays sit
//! behind shared handles, so identity is observable and cycles are
//! expressible.
//!
//! ```
//! use refson_core::{de, ser, JsonOptions, Value};
//!
//! let root = refson_core::value::new_object();
//! root.borrow_mut().insert("name", Value::from("Ada"));
//! root.borrow_mut().insert("manager", Value::Object(root.clone()));
//!
//! let options = JsonOptions::preserving();
//! let text = ser::to_string(&Value::Object(root), &options).unwrap();
//! assert_eq!(text, r#"{"$id":"1","name":"Ada","manager":{"$ref":"1"}}"#);
//!
//! let back = de::from_str(&text, &options).unwrap();
//! let manager = back.as_object().unwrap().borrow().get("manager").cloned().unwrap();
//! assert!(manager.same_instance(&back));
//! ```

#![deny(unsafe_code)]

pub mod de;
pub mod error;
pub mod options;
pub mod path;
pub mod ser;
pub mod text;
pub mod value;

pub use de::{Deserializer, ReadStats};
pub use error::{Error, ErrorKind, Result};
pub use options::{JsonOptions, ReferenceMode, DEFAULT_MAX_DEPTH};
pub use value::{
    ArrayKind, ArrayRef, Number, ObjectRef, ObjectSchema, Schema, StructValue, Value,
};
