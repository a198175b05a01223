//! Failure taxonomy for serialization and deserialization
//!
//! Every failure carries a kind, the JSON path at which it was detected,
//! and a human-readable message. Nothing is committed to the caller when a
//! composite fails partway through.

use std::fmt;

/// Classification of serialization and deserialization failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Write-side: recursion exceeded the depth ceiling in `Default` mode,
    /// where a reference loop is the likely cause
    CycleDetected,
    /// Read-side: two `$id` members share a value within one document
    DuplicateIdentifier,
    /// Read-side: `$ref` coexists with any other member in its object
    ReferenceObjectHasOtherProperties,
    /// Read-side: a metadata member appeared where it is not permitted
    UnexpectedMetadata,
    /// Read-side: preservation was attempted against an immutable or
    /// fixed-capacity collection slot
    UnresolvableTypeForPreservation,
    /// Read-side: a preserved-array wrapper object is missing `$id`, has a
    /// non-array `$values`, or carries extra members
    PreservedArrayMalformed,
    /// Input ended while a construct was still open
    IncompleteInput,
    /// The hard nesting ceiling was hit
    DepthExceeded,
    /// Malformed JSON text
    Syntax,
    /// A value's shape does not match the slot it was read into
    TypeMismatch,
    /// Options failed validation at construction time
    InvalidOptions,
}

impl ErrorKind {
    /// Stable name for this kind, used in rendered messages
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::CycleDetected => "cycle detected",
            ErrorKind::DuplicateIdentifier => "duplicate identifier",
            ErrorKind::ReferenceObjectHasOtherProperties => {
                "reference object has other properties"
            }
            ErrorKind::UnexpectedMetadata => "unexpected metadata",
            ErrorKind::UnresolvableTypeForPreservation => {
                "unresolvable type for preservation"
            }
            ErrorKind::PreservedArrayMalformed => "preserved array malformed",
            ErrorKind::IncompleteInput => "incomplete input",
            ErrorKind::DepthExceeded => "depth exceeded",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::InvalidOptions => "invalid options",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialization/deserialization failure with kind, JSON path and message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {path}: {message}")]
pub struct Error {
    kind: ErrorKind,
    path: String,
    message: String,
}

/// Result type for all serialize and deserialize operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create an error from its parts
    pub fn new(kind: ErrorKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    /// The failure classification
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// JSON path at which the failure was detected, `$.a.b[3]` style
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Human-readable detail
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attach a path to an error raised below the path-tracking layer.
    /// Errors that already carry a path keep it.
    pub(crate) fn with_path(mut self, path: &str) -> Self {
        if self.path.is_empty() {
            self.path = path.to_string();
        }
        self
    }

    pub(crate) fn cycle_detected(path: impl Into<String>, max_depth: usize) -> Self {
        Self::new(
            ErrorKind::CycleDetected,
            path,
            format!("nesting exceeded {max_depth} levels; the graph likely contains a reference loop"),
        )
    }

    pub(crate) fn depth_exceeded(path: impl Into<String>, max_depth: usize) -> Self {
        Self::new(
            ErrorKind::DepthExceeded,
            path,
            format!("nesting exceeded the configured ceiling of {max_depth} levels"),
        )
    }

    pub(crate) fn duplicate_identifier(path: impl Into<String>, id: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateIdentifier,
            path,
            format!("identifier '{id}' is already defined in this document"),
        )
    }

    pub(crate) fn reference_object_has_other_properties(path: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::ReferenceObjectHasOtherProperties,
            path,
            "a reference object must contain '$ref' as its only member",
        )
    }

    pub(crate) fn unexpected_metadata(
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::UnexpectedMetadata, path, message)
    }

    pub(crate) fn unresolvable_type_for_preservation(path: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::UnresolvableTypeForPreservation,
            path,
            "the target collection is immutable or fixed-capacity and cannot be preserved",
        )
    }

    pub(crate) fn preserved_array_malformed(
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::PreservedArrayMalformed, path, message)
    }

    pub(crate) fn incomplete_input(path: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::IncompleteInput,
            path,
            "input ended while a value was still open",
        )
    }

    pub(crate) fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, "", message)
    }

    pub(crate) fn type_mismatch(
        path: impl Into<String>,
        expected: &str,
        found: &str,
    ) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            path,
            format!("expected {expected}, found {found}"),
        )
    }

    pub(crate) fn invalid_options(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOptions, "", message)
    }
}
