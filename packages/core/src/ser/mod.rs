//! Write side: reference-aware serialization of value graphs

mod driver;
mod resolver;

use crate::error::Result;
use crate::options::JsonOptions;
use crate::value::Value;

use driver::WriteDriver;

/// Serialize a value graph to JSON text.
///
/// In `Preserve` mode shared composites are written once with `$id` and
/// referenced with `{"$ref": …}` thereafter; arrays carrying an identifier
/// are wrapped as `{"$id": …, "$values": […]}`.
///
/// # Errors
///
/// `CycleDetected` when a `Default`-mode traversal exceeds the depth
/// ceiling, `DepthExceeded` for over-deep graphs in the other modes, and
/// `InvalidOptions` when the options fail validation.
pub fn to_string(value: &Value, options: &JsonOptions) -> Result<String> {
    WriteDriver::new(options)?.serialize(value)
}

/// Serialize a value graph to JSON bytes. See [`to_string`].
pub fn to_vec(value: &Value, options: &JsonOptions) -> Result<Vec<u8>> {
    to_string(value, options).map(String::into_bytes)
}
