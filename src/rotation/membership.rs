//! Membership tracker — advisory onboarding bookkeeping.
//!
//! Records which categories a participant has been auto-enrolled into, so
//! onboarding prompts are not repeated. This is never authoritative for
//! rotation: the queue registry is. A supervisor can remove someone from a
//! queue while these flags still show them as joined; that is intentional
//! and not reconciled.

use std::collections::BTreeMap;

use crate::rotation::model::ParticipantId;

/// Per-participant category flags, keyed by the participant id's string form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipTracker {
    flags: BTreeMap<String, BTreeMap<String, bool>>,
}

impl MembershipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted membership document.
    pub fn from_snapshot(flags: BTreeMap<String, BTreeMap<String, bool>>) -> Self {
        Self { flags }
    }

    /// The persistable view of all flags.
    pub fn snapshot(&self) -> &BTreeMap<String, BTreeMap<String, bool>> {
        &self.flags
    }

    /// Whether the participant has joined at least one category.
    pub fn has_joined_any(&self, id: &ParticipantId) -> bool {
        self.flags
            .get(&id.key())
            .is_some_and(|cats| cats.values().any(|v| *v))
    }

    /// Whether the participant has joined every configured category.
    pub fn has_joined_all(&self, id: &ParticipantId, categories: &[String]) -> bool {
        let Some(cats) = self.flags.get(&id.key()) else {
            return false;
        };
        categories
            .iter()
            .all(|c| cats.get(c).copied().unwrap_or(false))
    }

    /// Record that the participant joined a category.
    pub fn mark_joined(&mut self, id: &ParticipantId, category: &str) {
        self.flags
            .entry(id.key())
            .or_default()
            .insert(category.to_string(), true);
    }

    /// Configured categories the participant has not joined yet.
    pub fn missing_categories<'a>(
        &self,
        id: &ParticipantId,
        categories: &'a [String],
    ) -> Vec<&'a str> {
        let joined = self.flags.get(&id.key());
        categories
            .iter()
            .filter(|c| {
                !joined
                    .and_then(|cats| cats.get(c.as_str()))
                    .copied()
                    .unwrap_or(false)
            })
            .map(|c| c.as_str())
            .collect()
    }
}
