//! Read side: metadata-aware deserialization into value graphs

mod driver;
mod frame;
mod metadata;
mod table;

pub use driver::{Deserializer, ReadStats};

use crate::error::Result;
use crate::options::JsonOptions;
use crate::value::{Schema, Value};

/// Deserialize a complete JSON document.
///
/// With `read_references` enabled in `options`, `$id`/`$ref`/`$values`
/// members are interpreted and shared or cyclic graphs are rebuilt;
/// otherwise `$`-prefixed names are ordinary members.
pub fn from_slice(input: &[u8], options: &JsonOptions) -> Result<Value> {
    from_slice_with_schema(input, Schema::Any, options)
}

/// Deserialize a complete JSON document, checking slots against `schema`.
pub fn from_slice_with_schema(
    input: &[u8],
    schema: Schema,
    options: &JsonOptions,
) -> Result<Value> {
    let mut deserializer = Deserializer::with_schema(schema, options)?;
    deserializer.feed(input)?;
    deserializer.finish()
}

/// Deserialize a complete JSON document from text. See [`from_slice`].
pub fn from_str(input: &str, options: &JsonOptions) -> Result<Value> {
    from_slice(input.as_bytes(), options)
}

/// Deserialize JSON text, checking slots against `schema`.
pub fn from_str_with_schema(input: &str, schema: Schema, options: &JsonOptions) -> Result<Value> {
    from_slice_with_schema(input.as_bytes(), schema, options)
}
