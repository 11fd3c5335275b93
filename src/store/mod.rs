//! Persistence for the rotation state.

pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotStore};
