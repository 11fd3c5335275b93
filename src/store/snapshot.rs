//! File-backed snapshot store.
//!
//! One JSON file holds the three logical documents — queues, membership,
//! pending — so a single save keeps them consistent together. Saves go
//! through a temp-file-and-rename so a crash mid-write can never leave a
//! half-written snapshot (e.g. queues advanced but a stale pending claim).
//!
//! Loading tolerates an absent file (default state) and malformed documents:
//! each document degrades to its default independently, with a warning, and
//! startup never fails on bad data.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::StoreError;
use crate::rotation::model::Participant;

/// The persisted union of all rotation state.
///
/// Wire schema: queue entries as `{id, username}` objects in rotation order;
/// membership as object-of-objects keyed by participant id then category;
/// pending keyed by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub queues: BTreeMap<String, Vec<Participant>>,
    #[serde(default)]
    pub membership: BTreeMap<String, BTreeMap<String, bool>>,
    #[serde(default)]
    pub pending: BTreeMap<String, Participant>,
}

/// Stores the snapshot at a fixed path.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, degrading to defaults instead of failing.
    pub async fn load(&self) -> Snapshot {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No snapshot file, starting empty");
                return Snapshot::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to read snapshot: {e}");
                return Snapshot::default();
            }
        };

        let root: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(root) => root,
            Err(e) => {
                let err = StoreError::Malformed {
                    document: "snapshot".to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!(path = %self.path.display(), "{err}; starting empty");
                return Snapshot::default();
            }
        };

        Snapshot {
            queues: load_document(&root, "queues"),
            membership: load_document(&root, "membership"),
            pending: load_document(&root, "pending"),
        }
    }

    /// Persist the snapshot as one atomic unit.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_string_pretty(snapshot)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Parse one document out of the root value, defaulting on absence or
/// parse failure.
fn load_document<T>(root: &serde_json::Value, name: &str) -> T
where
    T: Default + for<'de> Deserialize<'de>,
{
    match root.get(name) {
        None => T::default(),
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                let err = StoreError::Malformed {
                    document: name.to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!("{err}; using defaults for this document");
                T::default()
            }
        },
    }
}
