//! Queue registry — the ordered per-category rotation queues.
//!
//! This is the authoritative record of who is in a rotation. Invariant: no
//! participant id appears twice in the same category's queue. Index 0 is the
//! head (current duty-holder); a confirmed completion moves the head to the
//! tail, it is never removed.

use std::collections::BTreeMap;

use crate::error::RotationError;
use crate::rotation::model::{Participant, ParticipantId};

/// Ordered participant queues, one per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueRegistry {
    queues: BTreeMap<String, Vec<Participant>>,
}

impl QueueRegistry {
    /// Build a registry with an empty queue per configured category.
    pub fn new(categories: &[String]) -> Self {
        Self {
            queues: categories
                .iter()
                .map(|c| (c.clone(), Vec::new()))
                .collect(),
        }
    }

    /// Rebuild from persisted queues, keeping only configured categories and
    /// dropping duplicate ids that a hand-edited snapshot may contain.
    pub fn from_snapshot(
        categories: &[String],
        mut snapshot: BTreeMap<String, Vec<Participant>>,
    ) -> Self {
        let mut registry = Self::new(categories);
        for (category, members) in registry.queues.iter_mut() {
            if let Some(loaded) = snapshot.remove(category) {
                for participant in loaded {
                    if !members.iter().any(|m| m.id == participant.id) {
                        members.push(participant);
                    }
                }
            }
        }
        registry
    }

    /// The persistable view of all queues.
    pub fn snapshot(&self) -> &BTreeMap<String, Vec<Participant>> {
        &self.queues
    }

    fn queue(&self, category: &str) -> Result<&Vec<Participant>, RotationError> {
        self.queues
            .get(category)
            .ok_or_else(|| RotationError::unknown_category(category))
    }

    fn queue_mut(&mut self, category: &str) -> Result<&mut Vec<Participant>, RotationError> {
        self.queues
            .get_mut(category)
            .ok_or_else(|| RotationError::unknown_category(category))
    }

    /// Insert `participant` at the tail unless an entry with the same id is
    /// already present. Returns whether an insertion occurred; an existing
    /// entry is a no-op, not an error.
    pub fn join(
        &mut self,
        category: &str,
        participant: Participant,
    ) -> Result<bool, RotationError> {
        let members = self.queue_mut(category)?;
        if members.iter().any(|m| m.id == participant.id) {
            return Ok(false);
        }
        members.push(participant);
        Ok(true)
    }

    /// Remove the entry with `id`. Returns the removed participant, or
    /// `NotFound` if absent.
    pub fn leave(
        &mut self,
        category: &str,
        id: &ParticipantId,
    ) -> Result<Participant, RotationError> {
        let members = self.queue_mut(category)?;
        let pos = members
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| RotationError::NotFound {
                entity: "participant",
                name: id.to_string(),
            })?;
        Ok(members.remove(pos))
    }

    /// Remove the first entry (in queue order) whose display name matches.
    ///
    /// If multiple entries share a display name, only the first match is
    /// removed.
    pub fn remove_by_display_name(
        &mut self,
        category: &str,
        username: &str,
    ) -> Result<Participant, RotationError> {
        let members = self.queue_mut(category)?;
        let pos = members
            .iter()
            .position(|m| m.username == username)
            .ok_or_else(|| RotationError::NotFound {
                entity: "participant",
                name: username.to_string(),
            })?;
        Ok(members.remove(pos))
    }

    /// The current duty-holder, or `Empty` if the queue has no members.
    /// Pure read.
    pub fn head(&self, category: &str) -> Result<&Participant, RotationError> {
        self.queue(category)?
            .first()
            .ok_or_else(|| RotationError::Empty {
                category: category.to_string(),
            })
    }

    /// Rotate: move the head to the tail. `Empty` on a memberless queue.
    ///
    /// This is the only operation that changes relative order. It must be
    /// called exactly once per confirmed completion; the confirmation
    /// workflow is responsible for gating it.
    pub fn advance(&mut self, category: &str) -> Result<Participant, RotationError> {
        let members = self.queue_mut(category)?;
        if members.is_empty() {
            return Err(RotationError::Empty {
                category: category.to_string(),
            });
        }
        let done = members.remove(0);
        members.push(done.clone());
        Ok(done)
    }

    /// All members of a category's queue, in rotation order.
    pub fn members(&self, category: &str) -> Result<&[Participant], RotationError> {
        Ok(self.queue(category)?.as_slice())
    }

    /// Whether `id` is in the category's queue.
    pub fn contains(&self, category: &str, id: &ParticipantId) -> bool {
        self.queues
            .get(category)
            .is_some_and(|members| members.iter().any(|m| &m.id == id))
    }
}
