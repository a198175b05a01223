//! Graph value model, numbers, expected shapes, and the serde_json bridge

mod convert;
mod node;
mod number;
mod schema;

pub use node::{
    new_array, new_object, ArrayNode, ArrayRef, IdentityKey, ObjectNode, ObjectRef, StructValue,
    Value,
};
pub use number::Number;
pub use schema::{ArrayKind, ArraySchema, ObjectSchema, Schema};
