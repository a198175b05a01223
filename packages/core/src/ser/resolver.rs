//! Per-composite emission decisions
//!
//! The resolver owns the identity bookkeeping for one write operation: the
//! preserved set (identity to allocated identifier) in `Preserve` mode and
//! the loop stack (identities on the current traversal path) in `Ignore`
//! mode. Both live exactly as long as the operation.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::options::ReferenceMode;
use crate::value::IdentityKey;

/// What the driver should emit for a composite it is about to enter
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EmitDecision {
    /// Write the composite in full, carrying `id` when one was allocated
    Full { id: Option<String> },
    /// The composite was already written; emit `{"$ref": id}` instead
    AsRef { id: String },
    /// Suppress this slot entirely: no member name, no element
    Skip,
}

#[derive(Debug)]
pub(crate) struct ReferenceResolver {
    mode: ReferenceMode,
    /// Identity-to-identifier map for every composite written so far (`Preserve`)
    preserved: HashMap<IdentityKey, String>,
    /// Identities on the current root-to-leaf path (`Ignore`)
    loop_stack: HashSet<IdentityKey>,
    next_id: u64,
}

impl ReferenceResolver {
    pub fn new(mode: ReferenceMode) -> Self {
        Self {
            mode,
            preserved: HashMap::new(),
            loop_stack: HashSet::new(),
            next_id: 0,
        }
    }

    /// Decide how to emit the composite with identity `key`.
    ///
    /// A `Full` decision must be paired with an [`exit`](Self::exit) once
    /// the composite is written; `AsRef` and `Skip` must not be, which is
    /// what keeps a loop-closing identity on the stack for as long as its
    /// first occurrence is still open.
    pub fn enter(&mut self, key: IdentityKey) -> EmitDecision {
        match self.mode {
            ReferenceMode::Default => EmitDecision::Full { id: None },
            ReferenceMode::Ignore => {
                if self.loop_stack.insert(key) {
                    EmitDecision::Full { id: None }
                } else {
                    trace!(?key, "suppressing loop-closing composite");
                    EmitDecision::Skip
                }
            }
            ReferenceMode::Preserve => {
                if let Some(id) = self.preserved.get(&key) {
                    EmitDecision::AsRef { id: id.clone() }
                } else {
                    let id = self.allocate();
                    trace!(?key, id, "assigned reference identifier");
                    self.preserved.insert(key, id.clone());
                    EmitDecision::Full { id: Some(id) }
                }
            }
        }
    }

    /// Release the traversal-path entry taken by a `Full` decision
    pub fn exit(&mut self, key: IdentityKey) {
        if self.mode == ReferenceMode::Ignore {
            self.loop_stack.remove(&key);
        }
    }

    /// Next identifier in traversal order: decimal ASCII starting at "1"
    fn allocate(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn key_of(value: &Value) -> IdentityKey {
        value.identity().expect("composite")
    }

    #[test]
    fn default_mode_never_tracks() {
        let mut resolver = ReferenceResolver::new(ReferenceMode::Default);
        let v = Value::object();
        let k = key_of(&v);
        assert_eq!(resolver.enter(k), EmitDecision::Full { id: None });
        assert_eq!(resolver.enter(k), EmitDecision::Full { id: None });
    }

    #[test]
    fn ignore_mode_skips_only_while_on_path() {
        let mut resolver = ReferenceResolver::new(ReferenceMode::Ignore);
        let v = Value::object();
        let k = key_of(&v);
        assert_eq!(resolver.enter(k), EmitDecision::Full { id: None });
        assert_eq!(resolver.enter(k), EmitDecision::Skip);
        resolver.exit(k);
        // Off the path again: a sibling occurrence is written in full
        assert_eq!(resolver.enter(k), EmitDecision::Full { id: None });
    }

    #[test]
    fn preserve_mode_allocates_in_traversal_order() {
        let mut resolver = ReferenceResolver::new(ReferenceMode::Preserve);
        let a = Value::object();
        let b = Value::array();
        assert_eq!(
            resolver.enter(key_of(&a)),
            EmitDecision::Full { id: Some("1".into()) }
        );
        assert_eq!(
            resolver.enter(key_of(&b)),
            EmitDecision::Full { id: Some("2".into()) }
        );
        assert_eq!(
            resolver.enter(key_of(&a)),
            EmitDecision::AsRef { id: "1".into() }
        );
    }
}
