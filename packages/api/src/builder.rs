//! Fluent configuration over the core engine
//!
//! A [`JsonBuilder`] carries one option set plus an optional read-side
//! schema and finishes with a terminal call: `to_string`/`to_vec` on the
//! write side, `from_str`/`from_slice`/`deserializer` on the read side.

use refson_core::{de, ser, Deserializer, JsonOptions, ReferenceMode, Result, Schema, Value};

/// Fluent builder for serialize and deserialize operations
#[derive(Debug, Clone, Default)]
pub struct JsonBuilder {
    options: JsonOptions,
    schema: Option<Schema>,
}

impl JsonBuilder {
    pub(crate) fn new(options: JsonOptions) -> Self {
        Self {
            options,
            schema: None,
        }
    }

    /// Set the write-side reference policy
    #[must_use]
    pub fn reference_mode(mut self, mode: ReferenceMode) -> Self {
        self.options.reference_mode = mode;
        self
    }

    /// Enable or disable metadata interpretation on read
    #[must_use]
    pub fn read_references(mut self, enabled: bool) -> Self {
        self.options.read_references = enabled;
        self
    }

    /// Set the nesting ceiling for both drivers
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Omit null-valued object members on write
    #[must_use]
    pub fn ignore_null_values(mut self, enabled: bool) -> Self {
        self.options.ignore_null_values = enabled;
        self
    }

    /// Check read slots against an expected-shape tree
    #[must_use]
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// The option set this builder has accumulated
    pub fn options(&self) -> &JsonOptions {
        &self.options
    }

    /// Serialize a value graph to JSON text
    pub fn to_string(&self, value: &Value) -> Result<String> {
        ser::to_string(value, &self.options)
    }

    /// Serialize a value graph to JSON bytes
    pub fn to_vec(&self, value: &Value) -> Result<Vec<u8>> {
        ser::to_vec(value, &self.options)
    }

    /// Deserialize a complete JSON document from text
    pub fn from_str(&self, input: &str) -> Result<Value> {
        self.from_slice(input.as_bytes())
    }

    /// Deserialize a complete JSON document
    pub fn from_slice(&self, input: &[u8]) -> Result<Value> {
        match &self.schema {
            Some(schema) => de::from_slice_with_schema(input, schema.clone(), &self.options),
            None => de::from_slice(input, &self.options),
        }
    }

    /// An incremental deserializer for chunked input
    pub fn deserializer(&self) -> Result<Deserializer> {
        match &self.schema {
            Some(schema) => Deserializer::with_schema(schema.clone(), &self.options),
            None => Deserializer::new(&self.options),
        }
    }
}
