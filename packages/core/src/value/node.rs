//! The graph value model
//!
//! Objects and arrays live behind shared handles so that one composite can
//! appear at several positions in a graph, including inside itself. The
//! handle's allocation is the composite's identity: two structurally equal
//! composites built separately are distinct, a cloned handle is the same
//! composite. `Struct` values are the exception: plain ordered fields
//! copied by value and never identity-tracked.
//!
//! A cyclic graph keeps itself alive through its strong handles; drop an
//! edge (or the whole graph before building cycles) when reclaiming it
//! matters.

use std::cell::RefCell;
use std::rc::Rc;

use super::number::Number;

/// Shared handle to an object or keyed-map node
pub type ObjectRef = Rc<RefCell<ObjectNode>>;

/// Shared handle to an array node
pub type ArrayRef = Rc<RefCell<ArrayNode>>;

/// Insertion-ordered object members; also the keyed-map representation
#[derive(Debug, Clone, Default)]
pub struct ObjectNode {
    entries: Vec<(String, Value)>,
}

impl ObjectNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member, replacing an existing member with the same name
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }
}

/// Array elements in order
#[derive(Debug, Clone, Default)]
pub struct ArrayNode {
    items: Vec<Value>,
}

impl ArrayNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

/// Value-type composite: ordered fields with copy semantics.
///
/// Struct values are emitted inline on every occurrence and never carry
/// `$id`, even in preserving mode.
#[derive(Debug, Clone, Default)]
pub struct StructValue {
    fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field append
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    #[inline]
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

/// Identity of a composite allocation
///
/// Derived from the shared handle's address; valid for comparison only
/// while the graph it came from is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityKey(usize);

impl IdentityKey {
    pub(crate) fn of_object(obj: &ObjectRef) -> Self {
        IdentityKey(Rc::as_ptr(obj) as usize)
    }

    pub(crate) fn of_array(arr: &ArrayRef) -> Self {
        IdentityKey(Rc::as_ptr(arr) as usize)
    }
}

/// A JSON value in graph form
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Value-type composite, serialized inline each time
    Struct(StructValue),
    Object(ObjectRef),
    Array(ArrayRef),
}

/// Allocate a fresh, empty object node
pub fn new_object() -> ObjectRef {
    Rc::new(RefCell::new(ObjectNode::new()))
}

/// Allocate a fresh, empty array node
pub fn new_array() -> ArrayRef {
    Rc::new(RefCell::new(ArrayNode::new()))
}

impl Value {
    /// A fresh empty object value
    pub fn object() -> Value {
        Value::Object(new_object())
    }

    /// A fresh empty array value
    pub fn array() -> Value {
        Value::Array(new_array())
    }

    /// Build from a float, mapping non-finite input to `Null`
    pub fn from_f64(value: f64) -> Value {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }

    /// Identity of this value's allocation, when it has one.
    ///
    /// Leaves and `Struct` values have no identity and are serialized by
    /// value on every occurrence.
    pub fn identity(&self) -> Option<IdentityKey> {
        match self {
            Value::Object(obj) => Some(IdentityKey::of_object(obj)),
            Value::Array(arr) => Some(IdentityKey::of_array(arr)),
            _ => None,
        }
    }

    /// Whether two values are the same composite allocation
    pub fn same_instance(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Shape name used in mismatch messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Struct(_) => "struct",
            Value::Object(_) => "object",
            Value::Array(_) => "array",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Value::Struct(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Object(value)
    }
}

impl From<ArrayRef> for Value {
    fn from(value: ArrayRef) -> Self {
        Value::Array(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_distinguishes_allocations() {
        let a = Value::object();
        let b = Value::object();
        assert_ne!(a.identity(), b.identity());
        let a2 = a.clone();
        assert_eq!(a.identity(), a2.identity());
        assert!(a.same_instance(&a2));
        assert!(!a.same_instance(&b));
    }

    #[test]
    fn leaves_have_no_identity() {
        assert!(Value::Null.identity().is_none());
        assert!(Value::from("x").identity().is_none());
        assert!(Value::from(StructValue::new()).identity().is_none());
    }

    #[test]
    fn object_insert_replaces_existing_member() {
        let obj = new_object();
        obj.borrow_mut().insert("a", Value::from(1i64));
        obj.borrow_mut().insert("a", Value::from(2i64));
        assert_eq!(obj.borrow().len(), 1);
        assert_eq!(
            obj.borrow().get("a").and_then(Value::as_number),
            Some(Number::from(2i64))
        );
    }

    #[test]
    fn cyclic_graphs_are_expressible() {
        let node = new_object();
        node.borrow_mut()
            .insert("me", Value::Object(Rc::clone(&node)));
        let inner = node.borrow().get("me").cloned().unwrap();
        assert!(inner.same_instance(&Value::Object(node)));
    }
}
