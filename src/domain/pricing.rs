//! GHS tariffs: base price with low/high duration supplements, and version deltas.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::duration_mask::DurationMask;

/// Deserialize thresholds where `0` (or `null`) means "no threshold".
fn threshold<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<u32> = Option::deserialize(deserializer)?;
    Ok(value.filter(|&v| v != 0))
}

/// One tariff line of a GHM root for a classification version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhsPricingEntry {
    pub ghs: u32,
    pub ghm: String,
    /// Severity letter or digit of the GHM (`"1"`..`"4"`, `"A"`, `"Z"`, ...)
    #[serde(default)]
    pub ghm_mode: String,
    #[serde(alias = "durations", default = "all_durations")]
    pub duration_validity_mask: DurationMask,
    #[serde(alias = "exb_treshold", default, deserialize_with = "threshold")]
    pub exb_threshold: Option<u32>,
    #[serde(default)]
    pub exb_cents: i64,
    #[serde(default)]
    pub exb_once: bool,
    #[serde(alias = "exh_treshold", default, deserialize_with = "threshold")]
    pub exh_threshold: Option<u32>,
    #[serde(default)]
    pub exh_cents: i64,
    pub ghs_cents: i64,
    #[serde(alias = "young_age_treshold", default, deserialize_with = "threshold")]
    pub young_age_threshold: Option<u32>,
    #[serde(default)]
    pub young_severity_limit: u32,
    #[serde(alias = "old_age_treshold", default, deserialize_with = "threshold")]
    pub old_age_threshold: Option<u32>,
    #[serde(default)]
    pub old_severity_limit: u32,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub warn_cmd28: bool,
}

fn all_durations() -> DurationMask {
    DurationMask::ALL
}

impl GhsPricingEntry {
    /// Minimal entry valid for every duration, without supplements.
    pub fn new(ghs: u32, ghm: impl Into<String>, ghs_cents: i64) -> Self {
        Self {
            ghs,
            ghm: ghm.into(),
            ghm_mode: String::new(),
            duration_validity_mask: DurationMask::ALL,
            exb_threshold: None,
            exb_cents: 0,
            exb_once: false,
            exh_threshold: None,
            exh_cents: 0,
            ghs_cents,
            young_age_threshold: None,
            young_severity_limit: 0,
            old_age_threshold: None,
            old_severity_limit: 0,
            conditions: Vec::new(),
            warn_cmd28: false,
        }
    }

    /// GHM root: the first five characters of the GHM code.
    pub fn ghm_root(&self) -> &str {
        self.ghm.get(..5).unwrap_or(&self.ghm)
    }

    /// Last night of the normal band, when a high-duration threshold exists.
    pub fn high_bound(&self) -> Option<u32> {
        self.exh_threshold.and_then(|t| t.checked_sub(1))
    }

    /// Severity index for levels `1`..`4`.
    pub fn severity(&self) -> Option<u32> {
        match self.ghm_mode.as_bytes() {
            [c @ b'1'..=b'4'] => Some(u32::from(c - b'1')),
            _ => None,
        }
    }

    /// Age conditions that lift severity for this level, e.g. `"< 2, ≥ 80"`.
    pub fn age_caption(&self) -> String {
        let Some(severity) = self.severity() else {
            return String::new();
        };
        let mut texts = Vec::new();
        if severity < self.young_severity_limit {
            if let Some(age) = self.young_age_threshold {
                texts.push(format!("< {}", age));
            }
        }
        if severity < self.old_severity_limit {
            if let Some(age) = self.old_age_threshold {
                texts.push(format!("≥ {}", age));
            }
        }
        texts.join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceBand {
    Base,
    ExB,
    ExH,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaBand {
    Added,
    Removed,
    Higher,
    Lower,
    Neutral,
}

/// Absolute tariff of one entry at one duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceResult {
    pub cents: i64,
    pub band: PriceBand,
}

/// Signed difference between two versions of the same GHS at one duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaResult {
    pub cents: i64,
    pub band: DeltaBand,
}

/// Tariff of `entry` for a stay of `duration` nights.
///
/// Returns `None` when the duration is not valid for the entry. Negative or
/// otherwise anomalous amounts are returned as computed.
pub fn compute_price(entry: &GhsPricingEntry, duration: u32) -> Option<PriceResult> {
    if !entry.duration_validity_mask.allows(duration) {
        return None;
    }

    let nights = i64::from(duration);
    let result = match (entry.exb_threshold, entry.exh_threshold) {
        (Some(exb), _) if duration < exb => {
            let cents = if entry.exb_once {
                entry.ghs_cents - entry.exb_cents
            } else {
                entry.ghs_cents - (i64::from(exb) - nights) * entry.exb_cents
            };
            PriceResult {
                cents,
                band: PriceBand::ExB,
            }
        }
        (_, Some(exh)) if duration >= exh => PriceResult {
            cents: entry.ghs_cents + (nights - i64::from(exh) + 1) * entry.exh_cents,
            band: PriceBand::ExH,
        },
        _ => PriceResult {
            cents: entry.ghs_cents,
            band: PriceBand::Base,
        },
    };
    Some(result)
}

/// Difference between the current and previous tariff of a GHS.
///
/// Callers match `current` and `previous` by GHS code. A missing entry and an
/// invalid duration both mean "no price".
pub fn compute_delta(
    current: Option<&GhsPricingEntry>,
    previous: Option<&GhsPricingEntry>,
    duration: u32,
) -> Option<DeltaResult> {
    let p1 = current.and_then(|e| compute_price(e, duration));
    let p2 = previous.and_then(|e| compute_price(e, duration));

    match (p1, p2) {
        (Some(p1), Some(p2)) => {
            let cents = p1.cents - p2.cents;
            let band = match cents.signum() {
                -1 => DeltaBand::Lower,
                1 => DeltaBand::Higher,
                _ => DeltaBand::Neutral,
            };
            Some(DeltaResult { cents, band })
        }
        (Some(p1), None) => Some(DeltaResult {
            cents: p1.cents,
            band: DeltaBand::Added,
        }),
        (None, Some(p2)) => Some(DeltaResult {
            cents: -p2.cents,
            band: DeltaBand::Removed,
        }),
        (None, None) => None,
    }
}

/// Tariff lines of one GHM root, in source order, keyed by GHS code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricingTable {
    ghm_root: String,
    entries: Vec<GhsPricingEntry>,
    by_ghs: HashMap<u32, usize>,
}

impl PricingTable {
    pub fn new(ghm_root: impl Into<String>, entries: Vec<GhsPricingEntry>) -> Self {
        let by_ghs = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.ghs, i))
            .collect();
        Self {
            ghm_root: ghm_root.into(),
            entries,
            by_ghs,
        }
    }

    pub fn ghm_root(&self) -> &str {
        &self.ghm_root
    }

    pub fn entries(&self) -> &[GhsPricingEntry] {
        &self.entries
    }

    pub fn get(&self, ghs: u32) -> Option<&GhsPricingEntry> {
        self.by_ghs.get(&ghs).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `"1 nuit"`, `"2 nuits"`.
pub fn duration_text(nights: u32) -> String {
    format!("{} {}", nights, if nights >= 2 { "nuits" } else { "nuit" })
}

/// Euros with two decimals and a comma separator: `123456` → `"1234,56"`.
pub fn price_text(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{},{:02}", sign, abs / 100, abs % 100)
}
