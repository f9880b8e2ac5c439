//! Loaded classification versions, ordered by begin date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::application::collapse::CollapseSet;
use crate::application::session::ClassificationSession;
use crate::application::{ApplicationError, ApplicationResult};

/// Owns one session per version and the collapse state shared by their trees.
#[derive(Debug, Default)]
pub struct VersionCatalog {
    sessions: BTreeMap<NaiveDate, ClassificationSession>,
    collapse: CollapseSet,
}

impl VersionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a version, replacing any session loaded for the same date.
    #[instrument(level = "debug", skip(self, session), fields(version = %session.version()))]
    pub fn insert(&mut self, session: ClassificationSession) {
        if self.sessions.insert(session.version(), session).is_some() {
            debug!("replaced loaded session");
        }
    }

    /// Drop a version and its collapse state.
    pub fn reset(&mut self, version: NaiveDate) -> Option<ClassificationSession> {
        self.collapse.clear_version(version);
        self.sessions.remove(&version)
    }

    pub fn clear(&mut self) {
        for version in self.sessions.keys() {
            self.collapse.clear_version(*version);
        }
        self.sessions.clear();
    }

    pub fn get(&self, version: NaiveDate) -> ApplicationResult<&ClassificationSession> {
        self.sessions
            .get(&version)
            .ok_or(ApplicationError::UnknownVersion(version))
    }

    /// Version in force on `date`: the latest one beginning on or before it.
    pub fn in_force(&self, date: NaiveDate) -> Option<&ClassificationSession> {
        self.sessions.range(..=date).next_back().map(|(_, s)| s)
    }

    pub fn latest(&self) -> Option<&ClassificationSession> {
        self.sessions.values().next_back()
    }

    /// Version `offset` steps away from `version` (negative goes back in time).
    pub fn neighbour(&self, version: NaiveDate, offset: isize) -> ApplicationResult<Option<&ClassificationSession>> {
        let position = self
            .sessions
            .keys()
            .position(|v| *v == version)
            .ok_or(ApplicationError::UnknownVersion(version))?;
        let target = position.checked_add_signed(offset);
        Ok(target.and_then(|t| self.sessions.values().nth(t)))
    }

    /// Whether `version` prices the GHM root `root`.
    pub fn has_ghm_root(&self, version: NaiveDate, root: &str) -> bool {
        self.sessions
            .get(&version)
            .is_some_and(|s| s.has_ghm_root(root))
    }

    pub fn versions(&self) -> impl Iterator<Item = &ClassificationSession> {
        self.sessions.values()
    }

    pub fn collapse(&self) -> &CollapseSet {
        &self.collapse
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
