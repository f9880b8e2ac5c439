//! Per-version classification state.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    compute_delta, compute_price, DeltaResult, DisplayNode, GhsPricingEntry, NodeStore,
    PriceResult, PricingTable, TreeReconstructor,
};

/// Validity period of a classification version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub begin_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Tariffs changed with this version
    #[serde(default)]
    pub changed_prices: bool,
}

impl VersionInfo {
    pub fn new(begin_date: NaiveDate) -> Self {
        Self {
            begin_date,
            end_date: None,
            changed_prices: false,
        }
    }

    /// `2019-03` for versions starting on the first of a month, full date otherwise.
    pub fn label(&self) -> String {
        if self.begin_date.day() == 1 {
            self.begin_date.format("%Y-%m").to_string()
        } else {
            self.begin_date.format("%Y-%m-%d").to_string()
        }
    }
}

/// Loaded, immutable data of one classification version.
///
/// Cheap to clone; node store and pricing tables are shared.
#[derive(Debug, Clone)]
pub struct ClassificationSession {
    info: VersionInfo,
    nodes: Arc<NodeStore>,
    pricing: BTreeMap<String, Arc<PricingTable>>,
}

impl ClassificationSession {
    #[instrument(level = "debug", skip(nodes, tables), fields(nodes = nodes.len(), roots = tables.len()))]
    pub fn new(info: VersionInfo, nodes: NodeStore, tables: Vec<PricingTable>) -> Self {
        let pricing = tables
            .into_iter()
            .map(|table| (table.ghm_root().to_string(), Arc::new(table)))
            .collect();
        debug!(version = %info.begin_date, "created classification session");
        Self {
            info,
            nodes: Arc::new(nodes),
            pricing,
        }
    }

    pub fn info(&self) -> &VersionInfo {
        &self.info
    }

    pub fn version(&self) -> NaiveDate {
        self.info.begin_date
    }

    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    /// Display tree of the whole classifier, or an empty forest for an empty store.
    pub fn tree(&self) -> ApplicationResult<Vec<DisplayNode>> {
        if self.nodes.is_empty() {
            return Ok(Vec::new());
        }
        self.subtree(0)
    }

    pub fn subtree(&self, start: usize) -> ApplicationResult<Vec<DisplayNode>> {
        Ok(TreeReconstructor::new(&self.nodes).reconstruct(start, &[])?)
    }

    /// Priced GHM roots in code order.
    pub fn ghm_roots(&self) -> impl Iterator<Item = &str> {
        self.pricing.keys().map(String::as_str)
    }

    pub fn has_ghm_root(&self, root: &str) -> bool {
        self.pricing.contains_key(root)
    }

    pub fn pricing_table(&self, root: &str) -> ApplicationResult<&PricingTable> {
        self.pricing
            .get(root)
            .map(Arc::as_ref)
            .ok_or_else(|| ApplicationError::UnknownGhmRoot {
                version: self.version(),
                root: root.to_string(),
            })
    }

    pub fn entry(&self, root: &str, ghs: u32) -> ApplicationResult<&GhsPricingEntry> {
        self.pricing_table(root)?
            .get(ghs)
            .ok_or_else(|| ApplicationError::UnknownGhs {
                root: root.to_string(),
                ghs,
            })
    }

    pub fn price(&self, root: &str, ghs: u32, duration: u32) -> ApplicationResult<Option<PriceResult>> {
        Ok(compute_price(self.entry(root, ghs)?, duration))
    }

    /// Tariff change of one GHS since `previous`, matched by GHS code.
    pub fn delta(
        &self,
        previous: &ClassificationSession,
        root: &str,
        ghs: u32,
        duration: u32,
    ) -> ApplicationResult<Option<DeltaResult>> {
        let current_table = self.pricing.get(root);
        let previous_table = previous.pricing.get(root);
        if current_table.is_none() && previous_table.is_none() {
            return Err(ApplicationError::UnknownGhmRoot {
                version: self.version(),
                root: root.to_string(),
            });
        }
        let current = current_table.and_then(|t| t.get(ghs));
        let prior = previous_table.and_then(|t| t.get(ghs));
        Ok(compute_delta(current, prior, duration))
    }
}
