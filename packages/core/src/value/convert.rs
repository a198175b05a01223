//! Bridge between the graph value model and `serde_json` trees
//!
//! `from_json` builds a graph with fresh identities; `to_json` detaches a
//! plain tree, expanding shared composites by value. A cyclic graph has no
//! tree form, so `to_json` fails on one rather than recursing forever.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::path::PathTracker;

use super::node::{new_array, new_object, IdentityKey, Value};
use super::number::Number;

impl Value {
    /// Build a graph value from a `serde_json` tree.
    ///
    /// Every object and array in the tree becomes a fresh allocation, so
    /// the result contains no shared composites.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(number_from_json(n)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let arr = new_array();
                for item in items {
                    arr.borrow_mut().push(Value::from_json(item));
                }
                Value::Array(arr)
            }
            serde_json::Value::Object(members) => {
                let obj = new_object();
                for (name, value) in members {
                    obj.borrow_mut().insert(name.clone(), Value::from_json(value));
                }
                Value::Object(obj)
            }
        }
    }

    /// Detach this graph into a `serde_json` tree.
    ///
    /// Shared composites are expanded by value at every position.
    ///
    /// # Errors
    ///
    /// Fails with `ErrorKind::CycleDetected` when the graph is cyclic and
    /// with `ErrorKind::TypeMismatch` when a number is non-finite.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut on_path = HashSet::new();
        let mut path = PathTracker::new();
        to_json_inner(self, &mut on_path, &mut path)
    }
}

fn to_json_inner(
    value: &Value,
    on_path: &mut HashSet<IdentityKey>,
    path: &mut PathTracker,
) -> Result<serde_json::Value> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Number(n) => number_to_json(*n, path),
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Struct(fields) => {
            let mut members = serde_json::Map::new();
            for (name, field) in fields.fields() {
                path.push_property(name);
                let converted = to_json_inner(field, on_path, path)?;
                path.pop();
                members.insert(name.clone(), converted);
            }
            Ok(serde_json::Value::Object(members))
        }
        Value::Object(obj) => {
            let key = enter(IdentityKey::of_object(obj), on_path, path)?;
            let node = obj.borrow();
            let mut members = serde_json::Map::new();
            for (name, member) in node.entries() {
                path.push_property(name);
                let converted = to_json_inner(member, on_path, path)?;
                path.pop();
                members.insert(name.clone(), converted);
            }
            on_path.remove(&key);
            Ok(serde_json::Value::Object(members))
        }
        Value::Array(arr) => {
            let key = enter(IdentityKey::of_array(arr), on_path, path)?;
            let node = arr.borrow();
            let mut items = Vec::with_capacity(node.len());
            for (index, item) in node.items().iter().enumerate() {
                path.push_index(index);
                items.push(to_json_inner(item, on_path, path)?);
                path.pop();
            }
            on_path.remove(&key);
            Ok(serde_json::Value::Array(items))
        }
    }
}

fn enter(
    key: IdentityKey,
    on_path: &mut HashSet<IdentityKey>,
    path: &PathTracker,
) -> Result<IdentityKey> {
    if !on_path.insert(key) {
        return Err(Error::new(
            crate::error::ErrorKind::CycleDetected,
            path.render(),
            "cyclic graph has no tree representation",
        ));
    }
    Ok(key)
}

fn number_from_json(n: &serde_json::Number) -> Number {
    if let Some(u) = n.as_u64() {
        Number::PosInt(u)
    } else if let Some(i) = n.as_i64() {
        Number::NegInt(i)
    } else {
        Number::Float(n.as_f64().unwrap_or(0.0))
    }
}

fn number_to_json(n: Number, path: &PathTracker) -> Result<serde_json::Value> {
    let converted = match n {
        Number::PosInt(u) => Some(serde_json::Number::from(u)),
        Number::NegInt(i) => Some(serde_json::Number::from(i)),
        Number::Float(f) => serde_json::Number::from_f64(f),
    };
    converted
        .map(serde_json::Value::Number)
        .ok_or_else(|| Error::type_mismatch(path.render(), "finite number", "non-finite float"))
}
