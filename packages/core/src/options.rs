//! Serialization options and the reference-handling policy
//!
//! Options are immutable once an operation has started observing them.
//! Construction from untyped input (strings, wire integers) is validating;
//! the typed surface cannot go out of range.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Nesting ceiling applied when the caller does not configure one
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Reference-handling policy applied while writing object graphs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceMode {
    /// No identity tracking. The cheapest mode; a reference loop is caught
    /// by the depth ceiling.
    #[default]
    Default,
    /// Track identities on the current traversal path and suppress any
    /// member that would close a loop. Non-cyclic duplicates are written
    /// in full each time.
    Ignore,
    /// Give every written composite an `$id` and emit `{"$ref": …}` for
    /// every later occurrence, so cycles and shared sub-graphs round-trip.
    Preserve,
}

impl ReferenceMode {
    /// Whether this mode needs per-composite identity bookkeeping
    #[inline]
    pub fn tracks_identity(self) -> bool {
        !matches!(self, ReferenceMode::Default)
    }
}

impl FromStr for ReferenceMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(ReferenceMode::Default),
            "ignore" => Ok(ReferenceMode::Ignore),
            "preserve" => Ok(ReferenceMode::Preserve),
            other => Err(Error::invalid_options(format!(
                "unknown reference mode '{other}' (expected 'default', 'ignore' or 'preserve')"
            ))),
        }
    }
}

impl TryFrom<u8> for ReferenceMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ReferenceMode::Default),
            1 => Ok(ReferenceMode::Ignore),
            2 => Ok(ReferenceMode::Preserve),
            other => Err(Error::invalid_options(format!(
                "reference mode {other} is out of range (expected 0..=2)"
            ))),
        }
    }
}

/// Options governing one serialize or deserialize operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Write-side reference policy
    pub reference_mode: ReferenceMode,
    /// Whether the read side interprets `$id`/`$ref`/`$values`. When off,
    /// `$`-prefixed names are ordinary member names.
    pub read_references: bool,
    /// Nesting ceiling, enforced uniformly by both drivers and in every
    /// reference mode
    pub max_depth: usize,
    /// Omit null-valued object members on write
    pub ignore_null_values: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            reference_mode: ReferenceMode::Default,
            read_references: false,
            max_depth: DEFAULT_MAX_DEPTH,
            ignore_null_values: false,
        }
    }
}

impl JsonOptions {
    /// Options that preserve references on write and resolve them on read
    pub fn preserving() -> Self {
        Self {
            reference_mode: ReferenceMode::Preserve,
            read_references: true,
            ..Self::default()
        }
    }

    /// Options that silently drop loop-closing members on write
    pub fn ignoring_cycles() -> Self {
        Self {
            reference_mode: ReferenceMode::Ignore,
            ..Self::default()
        }
    }

    /// Validate the option set before an operation observes it
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::InvalidOptions` when `max_depth` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::invalid_options("max_depth cannot be zero"));
        }
        Ok(())
    }
}
