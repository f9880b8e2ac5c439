//! Pricing grid service
//!
//! Lays out the tariffs of one GHM root as a table: one column per GHS,
//! a block of descriptive header rows, then one row per stay duration.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::{
    compute_delta, compute_price, duration_text, price_text, DeltaBand, GhsPricingEntry, PriceBand,
    PricingTable,
};

/// Style class of a header cell, used for merging and coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderClass {
    Desc,
    Conditions,
    Exb,
    Exh,
    Price,
    Age,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub text: String,
    pub class: HeaderClass,
    pub colspan: usize,
    /// Full text shown on hover (conditions list)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderRow {
    pub name: &'static str,
    pub cells: Vec<HeaderCell>,
}

/// Band of a body cell: absolute tariff or change since the comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CellBand {
    Price(PriceBand),
    Delta(DeltaBand),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub cents: i64,
    pub band: CellBand,
    pub text: String,
    /// Stay should have been grouped in CMD 28 (sessions)
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub warn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub duration: u32,
    pub label: String,
    pub cells: Vec<Option<GridCell>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingGrid {
    pub ghm_root: String,
    pub header: Vec<HeaderRow>,
    pub rows: Vec<GridRow>,
}

type Describe = fn(&GhsPricingEntry) -> (String, HeaderClass);

const HEADER_ROWS: [(&str, Describe); 11] = [
    ("GHS", |e| (e.ghs.to_string(), HeaderClass::Desc)),
    ("GHM", |e| (e.ghm.clone(), HeaderClass::Desc)),
    ("Niveau", |e| (format!("Niveau {}", e.ghm_mode), HeaderClass::Desc)),
    ("Conditions", |e| (conditions_count(e), HeaderClass::Conditions)),
    ("Borne basse", |e| (optional_duration(e.exb_threshold), HeaderClass::Exb)),
    ("Borne haute", |e| (optional_duration(e.high_bound()), HeaderClass::Exh)),
    ("Tarif €", |e| (price_text(e.ghs_cents), HeaderClass::Price)),
    ("Forfait EXB €", |e| (exb_text(e, true), HeaderClass::Exb)),
    ("Tarif EXB €", |e| (exb_text(e, false), HeaderClass::Exb)),
    ("Tarif EXH €", |e| (price_text(e.exh_cents), HeaderClass::Exh)),
    ("Age", |e| (e.age_caption(), HeaderClass::Age)),
];

fn conditions_count(entry: &GhsPricingEntry) -> String {
    match entry.conditions.len() {
        0 => String::new(),
        n => n.to_string(),
    }
}

fn optional_duration(nights: Option<u32>) -> String {
    nights.map(duration_text).unwrap_or_default()
}

fn exb_text(entry: &GhsPricingEntry, flat: bool) -> String {
    if entry.exb_once == flat {
        price_text(entry.exb_cents)
    } else {
        String::new()
    }
}

impl PricingGrid {
    /// Build the grid of `table` for durations `0..max_duration`.
    ///
    /// With a `comparison` table, body cells hold the change since that table,
    /// matched by GHS code.
    #[instrument(level = "debug", skip_all, fields(root = table.ghm_root(), delta = comparison.is_some()))]
    pub fn build(
        table: &PricingTable,
        comparison: Option<&PricingTable>,
        max_duration: u32,
        merge_cells: bool,
    ) -> Self {
        let header = HEADER_ROWS
            .iter()
            .map(|&(name, describe)| HeaderRow {
                name,
                cells: header_cells(table.entries(), describe, merge_cells),
            })
            .collect();

        let rows = (0..max_duration)
            .map(|duration| GridRow {
                duration,
                label: duration_text(duration),
                cells: table
                    .entries()
                    .iter()
                    .map(|entry| body_cell(entry, comparison, duration))
                    .collect(),
            })
            .collect::<Vec<_>>();

        debug!(columns = table.len(), rows = rows.len(), "built pricing grid");
        Self {
            ghm_root: table.ghm_root().to_string(),
            header,
            rows,
        }
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, |row| row.cells.len())
    }
}

fn header_cells(entries: &[GhsPricingEntry], describe: Describe, merge_cells: bool) -> Vec<HeaderCell> {
    let mut cells: Vec<HeaderCell> = Vec::new();
    for entry in entries {
        let (text, class) = describe(entry);
        let title = (class == HeaderClass::Conditions && !entry.conditions.is_empty())
            .then(|| entry.conditions.join("\n"));
        if merge_cells {
            if let Some(prev) = cells.last_mut() {
                if prev.text == text && prev.class == class && prev.title == title {
                    prev.colspan += 1;
                    continue;
                }
            }
        }
        cells.push(HeaderCell {
            text,
            class,
            colspan: 1,
            title,
        });
    }
    cells
}

fn body_cell(entry: &GhsPricingEntry, comparison: Option<&PricingTable>, duration: u32) -> Option<GridCell> {
    let (cents, band) = match comparison {
        None => compute_price(entry, duration).map(|p| (p.cents, CellBand::Price(p.band)))?,
        Some(previous) => compute_delta(Some(entry), previous.get(entry.ghs), duration)
            .map(|d| (d.cents, CellBand::Delta(d.band)))?,
    };
    Some(GridCell {
        cents,
        band,
        text: price_text(cents),
        warn: duration == 0 && entry.warn_cmd28,
    })
}
