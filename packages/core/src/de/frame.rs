//! Read-side frame bookkeeping
//!
//! One frame per composite being populated. Object frames defer their
//! allocation until metadata is settled, so a `{"$ref": …}` object never
//! allocates a throwaway instance and an `$id` is registered before any
//! descendant can point back at it.

use crate::value::{ArrayRef, ObjectRef, Schema, StructValue};

/// State of an object frame as its members stream past
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ObjectState {
    /// `{` consumed; nothing decided yet
    Fresh,
    /// `$id` name consumed; its string value is next
    AwaitingIdValue,
    /// `$ref` name consumed; its string value is next
    AwaitingRefValue,
    /// `$ref` captured; only `}` is legal now
    RefSeen,
    /// A regular member name was consumed; its value is next
    AwaitingMemberValue,
    /// Between members; the target object is materialized
    Populating,
    /// `$values` name consumed; the wrapped array is next
    AwaitingValuesArray,
    /// The wrapped array closed; only `}` is legal now
    ValuesDone,
}

/// Frame for an object, keyed map, or preserved-array wrapper
#[derive(Debug)]
pub(crate) struct ObjectFrame {
    /// Expected shape of the slot this object was read into
    pub schema: Schema,
    /// Materialized target; `None` until deferred init fires
    pub target: Option<ObjectRef>,
    /// Array allocated for `$values` in wrapper form
    pub values_target: Option<ArrayRef>,
    pub id: Option<String>,
    pub ref_id: Option<String>,
    /// Count of non-metadata members seen
    pub regular_members: usize,
    pub pending_name: Option<String>,
    pub pending_schema: Schema,
    pub state: ObjectState,
}

impl ObjectFrame {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            target: None,
            values_target: None,
            id: None,
            ref_id: None,
            regular_members: 0,
            pending_name: None,
            pending_schema: Schema::Any,
            state: ObjectState::Fresh,
        }
    }
}

/// Frame for a value-type composite slot
#[derive(Debug)]
pub(crate) struct StructFrame {
    pub schema: Schema,
    pub fields: StructValue,
    pub pending_name: Option<String>,
    pub pending_schema: Schema,
}

impl StructFrame {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            fields: StructValue::new(),
            pending_name: None,
            pending_schema: Schema::Any,
        }
    }
}

/// Frame for an array being populated
#[derive(Debug)]
pub(crate) struct ArrayFrame {
    pub target: ArrayRef,
    pub element_schema: Schema,
    pub index: usize,
}

impl ArrayFrame {
    pub fn new(target: ArrayRef, element_schema: Schema) -> Self {
        Self {
            target,
            element_schema,
            index: 0,
        }
    }
}

#[derive(Debug)]
pub(crate) enum ReadFrame {
    Object(ObjectFrame),
    Struct(StructFrame),
    Array(ArrayFrame),
}
