//! Collapsed tree nodes, shared by every view of every version.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::trace;

use crate::domain::{find_path, DisplayNode};

type CollapseKey = (NaiveDate, String);

/// Set of `(version, node_id)` pairs the user collapsed.
///
/// Applied to reconstructed trees by the presentation layer; reconstruction
/// itself never reads it.
#[derive(Debug, Default)]
pub struct CollapseSet {
    keys: RwLock<HashSet<CollapseKey>>,
}

impl CollapseSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashSet<CollapseKey>> {
        self.keys.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashSet<CollapseKey>> {
        self.keys.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_collapsed(&self, version: NaiveDate, node_id: &str) -> bool {
        self.read().contains(&(version, node_id.to_string()))
    }

    pub fn collapse(&self, version: NaiveDate, node_id: &str) {
        self.write().insert((version, node_id.to_string()));
    }

    pub fn expand(&self, version: NaiveDate, node_id: &str) {
        self.write().remove(&(version, node_id.to_string()));
    }

    /// Flip the state of a node and return whether it is now collapsed.
    pub fn toggle(&self, version: NaiveDate, node_id: &str) -> bool {
        let key = (version, node_id.to_string());
        let mut keys = self.write();
        if keys.remove(&key) {
            false
        } else {
            keys.insert(key);
            true
        }
    }

    /// Expand every node on the path to `node_id` so it becomes visible.
    ///
    /// Returns `false` when no node of `forest` answers to that id.
    pub fn reveal(&self, version: NaiveDate, forest: &[DisplayNode], node_id: &str) -> bool {
        let Some(path) = find_path(forest, node_id) else {
            return false;
        };
        trace!(%version, node_id, ?path, "revealing node");
        let mut keys = self.write();
        for id in path {
            keys.remove(&(version, id));
        }
        true
    }

    /// Forget every collapsed node of a version.
    pub fn clear_version(&self, version: NaiveDate) {
        self.write().retain(|(v, _)| *v != version);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
