//! Confirmation workflow — the per-category approval state machine.
//!
//! Each category is either `Idle` (no claim outstanding) or
//! `PendingApproval` (the head has claimed completion and a supervisor
//! confirmation is awaited). Approval consumes the pending record and is the
//! only path to a queue advance; at most one pending record exists per
//! category at any time.

use std::collections::BTreeMap;

use crate::error::RotationError;
use crate::rotation::model::{Participant, ParticipantId};

/// Per-category pending completion claims. Absence of a key means `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationWorkflow {
    pending: BTreeMap<String, Participant>,
}

impl ConfirmationWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted pending document.
    pub fn from_snapshot(pending: BTreeMap<String, Participant>) -> Self {
        Self { pending }
    }

    /// The persistable view of all pending claims.
    pub fn snapshot(&self) -> &BTreeMap<String, Participant> {
        &self.pending
    }

    /// The pending claimant for a category, if any.
    pub fn pending(&self, category: &str) -> Option<&Participant> {
        self.pending.get(category)
    }

    /// Record a completion claim.
    ///
    /// The claimant is captured by value so a later `leave` elsewhere cannot
    /// retroactively mutate the recorded identity. The caller (the engine)
    /// has already verified the claimant against the queue head; this only
    /// guards the one-pending-per-category invariant. A second claim while
    /// one is outstanding fails with `AlreadyPending` and does not replace
    /// the existing record.
    pub fn claim(
        &mut self,
        category: &str,
        claimant: Participant,
    ) -> Result<(), RotationError> {
        if self.pending.contains_key(category) {
            return Err(RotationError::AlreadyPending {
                category: category.to_string(),
            });
        }
        self.pending.insert(category.to_string(), claimant);
        Ok(())
    }

    /// Consume the pending claim for approval. `NoPendingClaim` when `Idle`.
    pub fn take(&mut self, category: &str) -> Result<Participant, RotationError> {
        self.pending
            .remove(category)
            .ok_or_else(|| RotationError::NoPendingClaim {
                category: category.to_string(),
            })
    }

    /// Clear the pending claim if it was made by `id`.
    ///
    /// Called when a participant is removed from a queue, so no orphaned
    /// pending record can reference someone no longer in rotation. Returns
    /// whether a record was cleared.
    pub fn clear_claimant(&mut self, category: &str, id: &ParticipantId) -> bool {
        if self.pending.get(category).is_some_and(|p| &p.id == id) {
            self.pending.remove(category);
            true
        } else {
            false
        }
    }
}
