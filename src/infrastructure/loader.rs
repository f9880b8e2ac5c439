//! Loading classification versions from a data directory
//!
//! Layout:
//! ```text
//! <data_dir>/indexes.json                    optional version list
//! <data_dir>/<YYYY-MM-DD>/classifier_tree.json
//! <data_dir>/<YYYY-MM-DD>/price_map.json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, trace, warn};

use crate::application::{ApplicationError, ClassificationSession, VersionCatalog, VersionInfo};
use crate::domain::{DecisionNode, GhsPricingEntry, NodeStore, PricingTable};
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, InfraResult};

pub const TREE_FILE: &str = "classifier_tree.json";
pub const PRICE_MAP_FILE: &str = "price_map.json";
pub const VERSION_INDEX_FILE: &str = "indexes.json";

const VERSION_DIR_FORMAT: &str = "%Y-%m-%d";

/// Tariff lines of one GHM root as stored in `price_map.json`.
#[derive(Debug, Deserialize)]
struct PriceMapEntry {
    ghm_root: String,
    #[serde(default)]
    ghs: Vec<GhsPricingEntry>,
}

/// Reads versions, classifier trees and price maps below a data directory.
pub struct DataLoader {
    fs: Arc<dyn FileSystem>,
    data_dir: PathBuf,
}

impl DataLoader {
    pub fn new(fs: Arc<dyn FileSystem>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn version_dir(&self, version: NaiveDate) -> PathBuf {
        self.data_dir
            .join(version.format(VERSION_DIR_FORMAT).to_string())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> InfraResult<T> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("reading {}", path.display()), e))?;
        serde_json::from_str(&content).map_err(|e| InfraError::json(path, e))
    }

    /// Parse and validate a classifier tree file.
    #[instrument(level = "debug", skip(self))]
    pub fn load_tree(&self, path: &Path) -> InfraResult<NodeStore> {
        let nodes: Vec<DecisionNode> = self.read_json(path)?;
        debug!(nodes = nodes.len(), "parsed classifier tree");
        Ok(NodeStore::new(nodes).map_err(ApplicationError::from)?)
    }

    /// Parse a price map file into one table per GHM root.
    #[instrument(level = "debug", skip(self))]
    pub fn load_price_map(&self, path: &Path) -> InfraResult<Vec<PricingTable>> {
        let entries: Vec<PriceMapEntry> = self.read_json(path)?;
        debug!(roots = entries.len(), "parsed price map");
        Ok(entries
            .into_iter()
            .map(|e| PricingTable::new(e.ghm_root, e.ghs))
            .collect())
    }

    /// Known versions in begin-date order.
    ///
    /// Uses `indexes.json` when present, otherwise every date-named subdirectory.
    /// Missing end dates are filled with the begin date of the next version.
    #[instrument(level = "debug", skip(self), fields(data_dir = %self.data_dir.display()))]
    pub fn versions(&self) -> InfraResult<Vec<VersionInfo>> {
        if !self.fs.is_dir(&self.data_dir) {
            return Err(InfraError::io(
                format!("data directory {}", self.data_dir.display()),
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }
        let index = self.data_dir.join(VERSION_INDEX_FILE);
        let mut versions: Vec<VersionInfo> = if self.fs.exists(&index) {
            self.read_json(&index)?
        } else {
            self.scan_version_dirs()?
        };
        versions.sort_by_key(|v| v.begin_date);
        versions.dedup_by_key(|v| v.begin_date);

        let next_dates: Vec<Option<NaiveDate>> = versions
            .iter()
            .skip(1)
            .map(|v| Some(v.begin_date))
            .chain(std::iter::once(None))
            .collect();
        for (version, next) in versions.iter_mut().zip(next_dates) {
            if version.end_date.is_none() {
                version.end_date = next;
            }
        }
        debug!(count = versions.len(), "listed versions");
        Ok(versions)
    }

    fn scan_version_dirs(&self) -> InfraResult<Vec<VersionInfo>> {
        let names = self
            .fs
            .subdirectories(&self.data_dir)
            .map_err(|e| InfraError::io(format!("listing {}", self.data_dir.display()), e))?;
        Ok(names
            .iter()
            .filter_map(|name| match NaiveDate::parse_from_str(name, VERSION_DIR_FORMAT) {
                Ok(date) => Some(VersionInfo::new(date)),
                Err(_) => {
                    trace!(name = name.as_str(), "skipping non-version directory");
                    None
                }
            })
            .collect())
    }

    /// Load tree and tariffs of one version.
    ///
    /// The classifier tree is required; a version without a price map gets no tariffs.
    #[instrument(level = "debug", skip(self, info), fields(version = %info.begin_date))]
    pub fn load_session(&self, info: VersionInfo) -> InfraResult<ClassificationSession> {
        let dir = self.version_dir(info.begin_date);
        let nodes = self.load_tree(&dir.join(TREE_FILE))?;

        let price_map = dir.join(PRICE_MAP_FILE);
        let tables = if self.fs.exists(&price_map) {
            self.load_price_map(&price_map)?
        } else {
            warn!(path = %price_map.display(), "no price map for version");
            Vec::new()
        };
        Ok(ClassificationSession::new(info, nodes, tables))
    }

    /// Load every known version.
    pub fn load_catalog(&self) -> InfraResult<VersionCatalog> {
        let mut catalog = VersionCatalog::new();
        for info in self.versions()? {
            catalog.insert(self.load_session(info)?);
        }
        Ok(catalog)
    }
}
