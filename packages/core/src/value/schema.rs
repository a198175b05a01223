//! Expected-shape descriptions consulted by the read driver
//!
//! A schema node tells the driver what a slot should hold: an object with
//! known members, a keyed map, a value-type struct, or an array together
//! with its mutability. `Any` places no expectation and is the default for
//! unknown members, so a partial schema constrains only what it names.

use super::node::Value;

static ANY: Schema = Schema::Any;

/// Expected shape of one slot
#[derive(Debug, Clone, Default)]
pub enum Schema {
    /// No expectation; metadata is interpreted tolerantly
    #[default]
    Any,
    /// Object with per-member expectations
    Object(ObjectSchema),
    /// Keyed map: every value shares one expectation
    Dictionary(Box<Schema>),
    /// Value-type composite: reference metadata is rejected at this slot
    Struct(ObjectSchema),
    /// Array-like slot
    Array(ArraySchema),
}

/// Member expectations for an object or struct slot
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    properties: Vec<(String, Schema)>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style member expectation
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.push((name.into(), schema));
        self
    }

    /// Expectation for a member, `Any` when the member is not described
    pub fn get(&self, name: &str) -> &Schema {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map_or(&ANY, |(_, s)| s)
    }
}

/// Array slot expectation
#[derive(Debug, Clone, Default)]
pub struct ArraySchema {
    element: Box<Schema>,
    kind: ArrayKind,
}

impl ArraySchema {
    pub fn new(element: Schema, kind: ArrayKind) -> Self {
        Self {
            element: Box::new(element),
            kind,
        }
    }

    #[inline]
    pub fn element(&self) -> &Schema {
        &self.element
    }

    #[inline]
    pub fn kind(&self) -> ArrayKind {
        self.kind
    }
}

/// Mutability of the collection backing an array slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayKind {
    /// Growable collection; preservation is supported
    #[default]
    List,
    /// Fixed-capacity collection; cannot be preserved
    FixedCapacity,
    /// Immutable collection; cannot be preserved
    Immutable,
}

impl ArrayKind {
    /// Whether a collection of this kind can carry `$id`/`$ref`
    #[inline]
    pub fn supports_preservation(self) -> bool {
        matches!(self, ArrayKind::List)
    }
}

impl Schema {
    /// Object slot with the given member expectations
    pub fn object(members: ObjectSchema) -> Schema {
        Schema::Object(members)
    }

    /// Keyed-map slot where every value shares `value` as its expectation
    pub fn dictionary_of(value: Schema) -> Schema {
        Schema::Dictionary(Box::new(value))
    }

    /// Value-type struct slot
    pub fn struct_of(members: ObjectSchema) -> Schema {
        Schema::Struct(members)
    }

    /// Growable array slot
    pub fn array_of(element: Schema) -> Schema {
        Schema::Array(ArraySchema::new(element, ArrayKind::List))
    }

    /// Fixed-capacity array slot
    pub fn fixed_array_of(element: Schema) -> Schema {
        Schema::Array(ArraySchema::new(element, ArrayKind::FixedCapacity))
    }

    /// Immutable array slot
    pub fn immutable_array_of(element: Schema) -> Schema {
        Schema::Array(ArraySchema::new(element, ArrayKind::Immutable))
    }

    /// The array expectation at this slot, when there is one
    pub fn as_array(&self) -> Option<&ArraySchema> {
        match self {
            Schema::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Expectation for a member read inside this slot
    pub fn member(&self, name: &str) -> &Schema {
        match self {
            Schema::Object(members) | Schema::Struct(members) => members.get(name),
            Schema::Dictionary(value) => value,
            _ => &ANY,
        }
    }

    /// Expectation for an element read inside this slot
    pub fn element(&self) -> &Schema {
        match self {
            Schema::Array(a) => a.element(),
            _ => &ANY,
        }
    }

    /// Shape name used in mismatch messages
    pub fn expected_name(&self) -> &'static str {
        match self {
            Schema::Any => "any value",
            Schema::Object(_) => "object",
            Schema::Dictionary(_) => "object",
            Schema::Struct(_) => "object",
            Schema::Array(_) => "array",
        }
    }

    /// Whether a resolved reference of this shape may be grafted here
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Schema::Any => true,
            Schema::Object(_) | Schema::Dictionary(_) => {
                matches!(value, Value::Object(_) | Value::Null)
            }
            Schema::Struct(_) => matches!(value, Value::Struct(_) | Value::Null),
            Schema::Array(_) => matches!(value, Value::Array(_) | Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_members_default_to_any() {
        let schema = Schema::object(ObjectSchema::new().property("a", Schema::array_of(Schema::Any)));
        assert!(schema.member("a").as_array().is_some());
        assert!(matches!(schema.member("b"), Schema::Any));
    }

    #[test]
    fn dictionary_members_share_one_expectation() {
        let schema = Schema::dictionary_of(Schema::array_of(Schema::Any));
        assert!(schema.member("anything").as_array().is_some());
    }

    #[test]
    fn only_list_arrays_support_preservation() {
        assert!(ArrayKind::List.supports_preservation());
        assert!(!ArrayKind::FixedCapacity.supports_preservation());
        assert!(!ArrayKind::Immutable.supports_preservation());
    }

    #[test]
    fn graft_compatibility_follows_shape() {
        let arrays = Schema::array_of(Schema::Any);
        assert!(arrays.accepts(&Value::array()));
        assert!(arrays.accepts(&Value::Null));
        assert!(!arrays.accepts(&Value::object()));
    }
}
