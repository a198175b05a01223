//! Read driver
//!
//! Pulls tokens from the incremental reader and maintains a frame stack.
//! Metadata members are intercepted at every name inside an object
//! context; object allocation is deferred until metadata is settled; the
//! reference table makes an identifier resolvable before its composite is
//! fully populated, which is what makes cycles readable.

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::options::JsonOptions;
use crate::path::PathTracker;
use crate::text::{JsonToken, ReadStep, TokenReader};
use crate::value::{new_array, new_object, Schema, Value};

use super::frame::{ArrayFrame, ObjectFrame, ObjectState, ReadFrame, StructFrame};
use super::metadata::{classify, MetadataKind, ID, VALUES};
use super::table::ReferenceTable;

/// Counters kept while a document is read
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadStats {
    /// Tokens consumed so far
    pub tokens: u64,
    /// Deepest nesting reached
    pub max_depth: usize,
    /// `$id` members registered
    pub identifiers_registered: u64,
    /// `$ref` members resolved (including unresolved-as-null)
    pub references_resolved: u64,
}

/// Resumable deserializer
///
/// Feed input in as many chunks as it arrives in; every call consumes as
/// far as the buffered bytes allow and saves frame state across the
/// boundary. [`finish`](Self::finish) closes the input and returns the
/// root value.
#[derive(Debug)]
pub struct Deserializer {
    options: JsonOptions,
    schema: Schema,
    reader: TokenReader,
    table: ReferenceTable,
    stack: Vec<ReadFrame>,
    root: Option<Value>,
    path: PathTracker,
    stats: ReadStats,
}

impl Deserializer {
    /// Deserializer with no shape expectations
    pub fn new(options: &JsonOptions) -> Result<Self> {
        Self::with_schema(Schema::Any, options)
    }

    /// Deserializer that checks slots against `schema`
    pub fn with_schema(schema: Schema, options: &JsonOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options: options.clone(),
            schema,
            reader: TokenReader::new(),
            table: ReferenceTable::new(),
            stack: Vec::new(),
            root: None,
            path: PathTracker::new(),
            stats: ReadStats::default(),
        })
    }

    /// Buffer a chunk of input and consume as far as it allows
    pub fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        self.reader.feed(chunk);
        self.pump()
    }

    /// Whether a complete root value has been read
    pub fn is_complete(&self) -> bool {
        self.root.is_some() && self.stack.is_empty()
    }

    /// Counters for the operation so far
    pub fn stats(&self) -> ReadStats {
        self.stats
    }

    /// Close the input and return the root value
    ///
    /// # Errors
    ///
    /// `IncompleteInput` when the document ended mid-construct, plus any
    /// failure the remaining buffered tokens produce.
    pub fn finish(mut self) -> Result<Value> {
        self.reader.end_input();
        self.pump()?;
        match self.root.take() {
            Some(value) if self.stack.is_empty() => {
                debug!(
                    tokens = self.stats.tokens,
                    identifiers = self.stats.identifiers_registered,
                    "document complete"
                );
                Ok(value)
            }
            _ => Err(Error::incomplete_input(self.path.render())),
        }
    }

    fn pump(&mut self) -> Result<()> {
        loop {
            let step = self
                .reader
                .next()
                .map_err(|e| e.with_path(&self.path.render()))?;
            match step {
                ReadStep::Token(token) => self.process_token(token)?,
                ReadStep::NeedMoreData | ReadStep::End => return Ok(()),
            }
        }
    }

    fn process_token(&mut self, token: JsonToken) -> Result<()> {
        self.stats.tokens += 1;
        match token {
            JsonToken::PropertyName(name) => self.on_member_name(name),
            JsonToken::StartObject => self.on_start_object(),
            JsonToken::StartArray => self.on_start_array(),
            JsonToken::EndObject => self.on_end_object(),
            JsonToken::EndArray => self.on_end_array(),
            JsonToken::String(text) => self.on_string(text),
            JsonToken::Number(n) => self.on_scalar(Value::Number(n)),
            JsonToken::Bool(b) => self.on_scalar(Value::Bool(b)),
            JsonToken::Null => self.on_scalar(Value::Null),
        }
    }

    /// State of the innermost object frame, when the top frame is one
    fn top_object_state(&self) -> Option<ObjectState> {
        match self.stack.last() {
            Some(ReadFrame::Object(f)) => Some(f.state),
            _ => None,
        }
    }

    /// Expected shape of the slot a value is about to fill; pushes the
    /// element path segment when the slot is an array element
    fn begin_value(&mut self) -> Schema {
        match self.stack.last() {
            None => self.schema.clone(),
            Some(ReadFrame::Object(f)) => match f.state {
                ObjectState::AwaitingMemberValue => f.pending_schema.clone(),
                _ => Schema::Any,
            },
            Some(ReadFrame::Struct(f)) => f.pending_schema.clone(),
            Some(ReadFrame::Array(f)) => {
                let schema = f.element_schema.clone();
                self.path.push_index(f.index);
                schema
            }
        }
    }

    /// Graft a completed value into the parent slot
    fn complete_slot(&mut self, value: Value) -> Result<()> {
        match self.stack.last_mut() {
            None => {
                self.root = Some(value);
                Ok(())
            }
            Some(ReadFrame::Object(f)) => match f.state {
                ObjectState::AwaitingMemberValue => {
                    let name = f.pending_name.take().unwrap_or_default();
                    let Some(target) = f.target.as_ref() else {
                        unreachable!("member value precedes materialization")
                    };
                    target.borrow_mut().insert(name, value);
                    f.state = ObjectState::Populating;
                    self.path.pop();
                    Ok(())
                }
                ObjectState::AwaitingValuesArray => {
                    // The wrapped array closed; its elements were pushed
                    // into the registered allocation as they arrived
                    f.state = ObjectState::ValuesDone;
                    Ok(())
                }
                _ => unreachable!("value completed in non-value object state"),
            },
            Some(ReadFrame::Struct(f)) => {
                let name = f.pending_name.take().unwrap_or_default();
                f.fields.insert(name, value);
                self.path.pop();
                Ok(())
            }
            Some(ReadFrame::Array(f)) => {
                f.target.borrow_mut().push(value);
                f.index += 1;
                self.path.pop();
                Ok(())
            }
        }
    }

    fn on_member_name(&mut self, name: String) -> Result<()> {
        // Registration must wait until the frame borrow ends
        let mut register: Option<(String, Value)> = None;
        let mut push_property = false;

        match self.stack.last_mut() {
            Some(ReadFrame::Struct(f)) => {
                if self.options.read_references && classify(&name) != MetadataKind::None {
                    return Err(Error::unexpected_metadata(
                        self.path.render(),
                        format!("'{name}' is not allowed on a value-type slot"),
                    ));
                }
                f.pending_schema = f.schema.member(&name).clone();
                f.pending_name = Some(name.clone());
                push_property = true;
            }
            Some(ReadFrame::Object(f)) => {
                let meta = if self.options.read_references {
                    classify(&name)
                } else {
                    MetadataKind::None
                };
                match f.state {
                    ObjectState::RefSeen => {
                        return Err(Error::reference_object_has_other_properties(
                            self.path.render(),
                        ));
                    }
                    ObjectState::ValuesDone => {
                        return Err(wrapper_extra_member(&self.path, &name));
                    }
                    ObjectState::Fresh | ObjectState::Populating => {}
                    _ => unreachable!("member name in value position"),
                }
                match meta {
                    MetadataKind::Id => {
                        if let Some(existing) = &f.id {
                            return Err(Error::duplicate_identifier(
                                self.path.render_member(ID),
                                existing,
                            ));
                        }
                        f.state = ObjectState::AwaitingIdValue;
                    }
                    MetadataKind::Ref => {
                        if f.id.is_some() || f.regular_members > 0 {
                            return Err(Error::reference_object_has_other_properties(
                                self.path.render(),
                            ));
                        }
                        f.state = ObjectState::AwaitingRefValue;
                    }
                    MetadataKind::Values => {
                        if f.regular_members > 0 {
                            return Err(Error::unexpected_metadata(
                                self.path.render_member(VALUES),
                                "'$values' must directly follow '$id'",
                            ));
                        }
                        if f.id.is_none() {
                            return Err(if f.schema.as_array().is_some() {
                                Error::preserved_array_malformed(
                                    self.path.render(),
                                    "array wrapper is missing '$id'",
                                )
                            } else {
                                Error::unexpected_metadata(
                                    self.path.render_member(VALUES),
                                    "'$values' requires a sibling '$id'",
                                )
                            });
                        }
                        if matches!(f.schema, Schema::Object(_) | Schema::Dictionary(_)) {
                            return Err(Error::unexpected_metadata(
                                self.path.render_member(VALUES),
                                "'$values' is not allowed in a non-array slot",
                            ));
                        }
                        let values = new_array();
                        f.values_target = Some(values.clone());
                        f.state = ObjectState::AwaitingValuesArray;
                        if let Some(id) = &f.id {
                            register = Some((id.clone(), Value::Array(values)));
                        }
                    }
                    MetadataKind::None => {
                        if self.options.read_references && f.schema.as_array().is_some() {
                            return Err(wrapper_extra_member(&self.path, &name));
                        }
                        if f.target.is_none() {
                            let target = new_object();
                            f.target = Some(target.clone());
                            if let Some(id) = &f.id {
                                register = Some((id.clone(), Value::Object(target)));
                            }
                        }
                        f.regular_members += 1;
                        f.pending_schema = f.schema.member(&name).clone();
                        f.pending_name = Some(name.clone());
                        f.state = ObjectState::AwaitingMemberValue;
                        push_property = true;
                    }
                }
            }
            _ => unreachable!("member name outside an object"),
        }

        if let Some((id, value)) = register {
            self.register_id(&id, value)?;
        }
        if push_property {
            self.path.push_property(&name);
        }
        Ok(())
    }

    fn on_string(&mut self, text: String) -> Result<()> {
        match self.top_object_state() {
            Some(ObjectState::AwaitingIdValue) => return self.capture_id(text),
            Some(ObjectState::AwaitingRefValue) => {
                trace!(id = %text, "captured reference");
                if let Some(ReadFrame::Object(f)) = self.stack.last_mut() {
                    f.ref_id = Some(text);
                    f.state = ObjectState::RefSeen;
                }
                return Ok(());
            }
            _ => {}
        }
        self.on_scalar(Value::String(text))
    }

    fn capture_id(&mut self, id: String) -> Result<()> {
        let target = {
            let Some(ReadFrame::Object(f)) = self.stack.last_mut() else {
                unreachable!("identifier value outside an object frame")
            };
            f.id = Some(id.clone());
            f.state = ObjectState::Populating;
            f.target.clone()
        };
        // An identifier arriving after regular members lands on an object
        // that already exists; register it immediately
        if let Some(target) = target {
            self.register_id(&id, Value::Object(target))?;
        }
        Ok(())
    }

    fn register_id(&mut self, id: &str, value: Value) -> Result<()> {
        let path = self.path.render_member(ID);
        self.table.register(id, value, &path)?;
        self.stats.identifiers_registered += 1;
        trace!(id, "registered identifier");
        Ok(())
    }

    fn on_scalar(&mut self, value: Value) -> Result<()> {
        if let Some(err) = self.reject_in_metadata_position() {
            return Err(err);
        }
        let schema = self.begin_value();
        if !schema.accepts(&value) {
            return Err(Error::type_mismatch(
                self.path.render(),
                schema.expected_name(),
                value.kind_name(),
            ));
        }
        self.complete_slot(value)
    }

    fn on_start_object(&mut self) -> Result<()> {
        if let Some(err) = self.reject_in_metadata_position() {
            return Err(err);
        }
        let schema = self.begin_value();
        self.check_depth()?;
        let array_kind = schema.as_array().map(|a| a.kind());
        if let Some(kind) = array_kind {
            if !self.options.read_references {
                return Err(Error::type_mismatch(self.path.render(), "array", "object"));
            }
            // An object at an array slot is a wrapper or a reference,
            // either way a preservation attempt
            if !kind.supports_preservation() {
                return Err(Error::unresolvable_type_for_preservation(
                    self.path.render(),
                ));
            }
            self.push_frame(ReadFrame::Object(ObjectFrame::new(schema)));
            return Ok(());
        }
        if matches!(schema, Schema::Struct(_)) {
            self.push_frame(ReadFrame::Struct(StructFrame::new(schema)));
            return Ok(());
        }
        self.push_frame(ReadFrame::Object(ObjectFrame::new(schema)));
        Ok(())
    }

    fn on_start_array(&mut self) -> Result<()> {
        match self.top_object_state() {
            // The array carried by `$values` populates the registered
            // allocation directly
            Some(ObjectState::AwaitingValuesArray) => {
                let (target, element_schema) = {
                    let Some(ReadFrame::Object(f)) = self.stack.last() else {
                        unreachable!()
                    };
                    (f.values_target.clone(), f.schema.element().clone())
                };
                let Some(target) = target else {
                    unreachable!("wrapper array without allocation")
                };
                self.check_depth()?;
                self.push_frame(ReadFrame::Array(ArrayFrame::new(target, element_schema)));
                return Ok(());
            }
            Some(ObjectState::AwaitingIdValue | ObjectState::AwaitingRefValue) => {
                return Err(self.metadata_value_not_string());
            }
            _ => {}
        }
        let schema = self.begin_value();
        self.check_depth()?;
        if matches!(
            schema,
            Schema::Object(_) | Schema::Dictionary(_) | Schema::Struct(_)
        ) {
            return Err(Error::type_mismatch(self.path.render(), "object", "array"));
        }
        let element_schema = schema.element().clone();
        self.push_frame(ReadFrame::Array(ArrayFrame::new(
            new_array(),
            element_schema,
        )));
        Ok(())
    }

    fn on_end_object(&mut self) -> Result<()> {
        let Some(frame) = self.stack.pop() else {
            unreachable!("unbalanced end of object")
        };
        match frame {
            ReadFrame::Struct(f) => self.complete_slot(Value::Struct(f.fields)),
            ReadFrame::Object(f) => match f.state {
                ObjectState::RefSeen => {
                    let id = f.ref_id.unwrap_or_default();
                    self.stats.references_resolved += 1;
                    match self.table.resolve(&id) {
                        None => {
                            debug!(id = %id, "unresolved reference grafted as null");
                            self.complete_slot(Value::Null)
                        }
                        Some(value) => {
                            if !f.schema.accepts(&value) {
                                return Err(Error::type_mismatch(
                                    self.path.render(),
                                    f.schema.expected_name(),
                                    value.kind_name(),
                                ));
                            }
                            trace!(id = %id, "grafted resolved reference");
                            self.complete_slot(value)
                        }
                    }
                }
                ObjectState::ValuesDone => {
                    let Some(values) = f.values_target else {
                        unreachable!("wrapper completed without allocation")
                    };
                    self.complete_slot(Value::Array(values))
                }
                ObjectState::Fresh | ObjectState::Populating => {
                    if self.options.read_references && f.schema.as_array().is_some() {
                        return Err(Error::preserved_array_malformed(
                            self.path.render(),
                            if f.id.is_some() {
                                "array wrapper is missing '$values'"
                            } else {
                                "array wrapper is missing '$id'"
                            },
                        ));
                    }
                    let (value, register) = match f.target {
                        Some(target) => (Value::Object(target), None),
                        None => {
                            // Deferred init fired by end-of-object: the
                            // object was `{}` or `{"$id": …}` alone
                            let target = new_object();
                            let register = f
                                .id
                                .as_ref()
                                .map(|id| (id.clone(), Value::Object(target.clone())));
                            (Value::Object(target), register)
                        }
                    };
                    if let Some((id, registered)) = register {
                        self.register_id(&id, registered)?;
                    }
                    self.complete_slot(value)
                }
                _ => unreachable!("end of object in value position"),
            },
            ReadFrame::Array(_) => unreachable!("object close inside an array"),
        }
    }

    fn on_end_array(&mut self) -> Result<()> {
        let Some(ReadFrame::Array(f)) = self.stack.pop() else {
            unreachable!("unbalanced end of array")
        };
        self.complete_slot(Value::Array(f.target))
    }

    /// Reject any non-string token while a metadata value is pending and
    /// any non-array value after `$values`
    fn reject_in_metadata_position(&self) -> Option<Error> {
        match self.top_object_state() {
            Some(ObjectState::AwaitingIdValue | ObjectState::AwaitingRefValue) => {
                Some(self.metadata_value_not_string())
            }
            Some(ObjectState::AwaitingValuesArray) => Some(Error::preserved_array_malformed(
                self.path.render_member(VALUES),
                "'$values' must be an array",
            )),
            _ => None,
        }
    }

    fn metadata_value_not_string(&self) -> Error {
        Error::unexpected_metadata(
            self.path.render(),
            "metadata identifier values must be strings",
        )
    }

    fn check_depth(&self) -> Result<()> {
        if self.stack.len() >= self.options.max_depth {
            return Err(Error::depth_exceeded(
                self.path.render(),
                self.options.max_depth,
            ));
        }
        Ok(())
    }

    fn push_frame(&mut self, frame: ReadFrame) {
        self.stack.push(frame);
        self.stats.max_depth = self.stats.max_depth.max(self.stack.len());
    }
}

fn wrapper_extra_member(path: &PathTracker, name: &str) -> Error {
    if name.starts_with('$') {
        Error::unexpected_metadata(
            path.render(),
            format!("'{name}' is not allowed inside an array wrapper"),
        )
    } else {
        Error::preserved_array_malformed(
            path.render(),
            format!("unexpected member '{name}' in array wrapper"),
        )
    }
}
