//! ID remapping.
//!
//! When data-blocks are merged, replaced or deleted, the host builds an
//! [`IdRemapper`] describing the change and hands it to everything that keeps
//! non-owning ID handles, so those handles can follow along.

use crate::document::id::{LocalId, SessionUid};
use std::collections::HashMap;

/// Result of applying a remapper to a single ID slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemapOutcome {
    /// The slot now points at the replacement data-block.
    Applied,
    /// The source data-block went away without replacement; the slot is now
    /// empty.
    SourceUnassigned,
    /// The remapper has nothing to say about the slot.
    Unchanged,
}

/// Mapping from old data-blocks to their replacement (or to nothing).
#[derive(Debug, Clone, Default)]
pub struct IdRemapper {
    mappings: HashMap<SessionUid, Option<LocalId>>,
}

impl IdRemapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `old` to `new`. `None` unassigns every user of `old`.
    pub fn add(&mut self, old: &LocalId, new: Option<LocalId>) {
        self.mappings.insert(old.session_uid(), new);
    }

    /// Shorthand for mapping `old` to nothing, as done when it's deleted.
    pub fn add_unassign(&mut self, old: &LocalId) {
        self.add(old, None);
    }

    pub fn contains(&self, id: &LocalId) -> bool {
        self.mappings.contains_key(&id.session_uid())
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Apply the mapping to one ID slot in place.
    pub fn apply(&self, slot: &mut Option<LocalId>) -> RemapOutcome {
        let Some(current) = slot.as_ref() else {
            return RemapOutcome::Unchanged;
        };

        match self.mappings.get(&current.session_uid()) {
            None => RemapOutcome::Unchanged,
            Some(None) => {
                *slot = None;
                RemapOutcome::SourceUnassigned
            }
            Some(Some(replacement)) => {
                *slot = Some(replacement.clone());
                RemapOutcome::Applied
            }
        }
    }
}
