//! Write driver
//!
//! A single-threaded traversal of the value graph. Each slot runs the
//! entry protocol: resolve the composite's identity, then emit it in full,
//! as a `{"$ref": …}` object, or not at all. The decision comes before the
//! member name so a suppressed slot leaves no trace in the output.

use tracing::debug;

use crate::error::{Error, Result};
use crate::options::{JsonOptions, ReferenceMode};
use crate::path::PathTracker;
use crate::text::TokenWriter;
use crate::value::{ArrayNode, ObjectNode, StructValue, Value};

use super::resolver::{EmitDecision, ReferenceResolver};

pub(crate) struct WriteDriver<'a> {
    options: &'a JsonOptions,
    resolver: ReferenceResolver,
    writer: TokenWriter,
    path: PathTracker,
    depth: usize,
}

impl<'a> WriteDriver<'a> {
    pub fn new(options: &'a JsonOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            resolver: ReferenceResolver::new(options.reference_mode),
            writer: TokenWriter::new(),
            path: PathTracker::new(),
            depth: 0,
        })
    }

    pub fn serialize(mut self, value: &Value) -> Result<String> {
        debug!(mode = ?self.options.reference_mode, "serializing value graph");
        self.write_slot(None, value)?;
        Ok(self.writer.finish())
    }

    /// Emit one slot: the optional member name and the value.
    ///
    /// Returns without emitting anything when the slot is suppressed.
    fn write_slot(&mut self, name: Option<&str>, value: &Value) -> Result<()> {
        let Some(key) = value.identity() else {
            self.emit_name(name);
            return self.write_leaf(value);
        };
        match self.resolver.enter(key) {
            EmitDecision::Skip => Ok(()),
            EmitDecision::AsRef { id } => {
                self.emit_name(name);
                self.write_reference(&id);
                Ok(())
            }
            EmitDecision::Full { id } => {
                self.emit_name(name);
                let result = self.write_composite(value, id);
                self.resolver.exit(key);
                result
            }
        }
    }

    fn emit_name(&mut self, name: Option<&str>) {
        if let Some(name) = name {
            self.writer.property_name(name);
        }
    }

    fn write_leaf(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.writer.null(),
            Value::Bool(b) => self.writer.bool(*b),
            Value::Number(n) => self.writer.number(*n),
            Value::String(s) => self.writer.string(s),
            Value::Struct(fields) => return self.write_struct(fields),
            Value::Object(_) | Value::Array(_) => unreachable!("composite handled by write_slot"),
        }
        Ok(())
    }

    fn write_reference(&mut self, id: &str) {
        self.writer.start_object();
        self.writer.property_name("$ref");
        self.writer.string(id);
        self.writer.end_object();
    }

    fn write_composite(&mut self, value: &Value, id: Option<String>) -> Result<()> {
        self.enter_depth()?;
        match value {
            Value::Object(obj) => {
                self.writer.start_object();
                if let Some(id) = &id {
                    self.writer.property_name("$id");
                    self.writer.string(id);
                }
                let node = obj.borrow();
                self.write_members(&node)?;
                self.writer.end_object();
            }
            Value::Array(arr) => {
                if let Some(id) = &id {
                    // Wrap the array in an object so it can carry its id
                    self.writer.start_object();
                    self.writer.property_name("$id");
                    self.writer.string(id);
                    self.writer.property_name("$values");
                    self.writer.start_array();
                    let node = arr.borrow();
                    self.write_elements(&node)?;
                    self.writer.end_array();
                    self.writer.end_object();
                } else {
                    self.writer.start_array();
                    let node = arr.borrow();
                    self.write_elements(&node)?;
                    self.writer.end_array();
                }
            }
            _ => unreachable!("write_composite takes identity-carrying values"),
        }
        self.depth -= 1;
        Ok(())
    }

    /// Value-type composite: plain inline object, no identity involvement
    fn write_struct(&mut self, fields: &StructValue) -> Result<()> {
        self.enter_depth()?;
        self.writer.start_object();
        for (name, field) in fields.fields() {
            if field.is_null() && self.options.ignore_null_values {
                continue;
            }
            self.path.push_property(name);
            self.write_slot(Some(name), field)?;
            self.path.pop();
        }
        self.writer.end_object();
        self.depth -= 1;
        Ok(())
    }

    fn write_members(&mut self, node: &ObjectNode) -> Result<()> {
        for (name, member) in node.entries() {
            if member.is_null() && self.options.ignore_null_values {
                continue;
            }
            self.path.push_property(name);
            self.write_slot(Some(name), member)?;
            self.path.pop();
        }
        Ok(())
    }

    fn write_elements(&mut self, node: &ArrayNode) -> Result<()> {
        for (index, element) in node.items().iter().enumerate() {
            self.path.push_index(index);
            self.write_slot(None, element)?;
            self.path.pop();
        }
        Ok(())
    }

    fn enter_depth(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(match self.options.reference_mode {
                ReferenceMode::Default => {
                    Error::cycle_detected(self.path.render(), self.options.max_depth)
                }
                _ => Error::depth_exceeded(self.path.render(), self.options.max_depth),
            });
        }
        Ok(())
    }
}
