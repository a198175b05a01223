//! Identifier-to-composite mapping for one read operation
//!
//! A composite is registered the moment it is allocated, which may precede
//! its population; that is what lets a `$ref` point back into an ancestor
//! that is still being filled in.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::value::Value;

#[derive(Debug, Default)]
pub(crate) struct ReferenceTable {
    entries: HashMap<String, Value>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a composite under `id`. Duplicate identifiers are fatal.
    pub fn register(&mut self, id: &str, value: Value, path: &str) -> Result<()> {
        match self.entries.entry(id.to_string()) {
            Entry::Occupied(_) => Err(Error::duplicate_identifier(path, id)),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    /// Look up `id`; `None` is not an error (the caller grafts null)
    pub fn resolve(&self, id: &str) -> Option<Value> {
        self.entries.get(id).cloned()
    }
}
