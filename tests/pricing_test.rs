//! Tests for GHS tariffs, version deltas and pricing grids

use rstest::rstest;

use casemix::application::services::{CellBand, PricingGrid};
use casemix::domain::{
    compute_delta, compute_price, DeltaBand, DurationMask, GhsPricingEntry, PriceBand, PricingTable,
};

/// 100 € base, 5 €/night below 3 nights, 2 €/night from 10 nights.
fn entry() -> GhsPricingEntry {
    GhsPricingEntry {
        exb_threshold: Some(3),
        exb_cents: 500,
        exh_threshold: Some(10),
        exh_cents: 200,
        ..GhsPricingEntry::new(1500, "05C021", 10000)
    }
}

#[rstest]
#[case(0, 8500, PriceBand::ExB)]
#[case(1, 9000, PriceBand::ExB)]
#[case(2, 9500, PriceBand::ExB)]
#[case(3, 10000, PriceBand::Base)]
#[case(9, 10000, PriceBand::Base)]
#[case(10, 10200, PriceBand::ExH)]
#[case(12, 10600, PriceBand::ExH)]
#[case(45, 17200, PriceBand::ExH)]
fn given_supplements_when_pricing_then_applies_band(
    #[case] duration: u32,
    #[case] cents: i64,
    #[case] band: PriceBand,
) {
    let price = compute_price(&entry(), duration).unwrap();

    assert_eq!((price.cents, price.band), (cents, band));
}

#[test]
fn given_duration_outside_mask_when_pricing_then_no_price() {
    // Arrange: valid from 1 night only
    let entry = GhsPricingEntry {
        duration_validity_mask: DurationMask(!1),
        ..entry()
    };

    // Act + Assert
    assert_eq!(compute_price(&entry, 0), None);
    assert!(compute_price(&entry, 1).is_some());
}

#[test]
fn given_two_versions_when_computing_delta_then_classifies_change() {
    // Arrange
    let current = entry();
    let cheaper = GhsPricingEntry {
        ghs_cents: 9000,
        ..entry()
    };
    let dearer = GhsPricingEntry {
        ghs_cents: 11000,
        ..entry()
    };

    // Act
    let higher = compute_delta(Some(&current), Some(&cheaper), 5).unwrap();
    let lower = compute_delta(Some(&current), Some(&dearer), 5).unwrap();
    let same = compute_delta(Some(&current), Some(&current), 5).unwrap();
    let added = compute_delta(Some(&current), None, 5).unwrap();
    let removed = compute_delta(None, Some(&current), 5).unwrap();

    // Assert
    assert_eq!((higher.cents, higher.band), (1000, DeltaBand::Higher));
    assert_eq!((lower.cents, lower.band), (-1000, DeltaBand::Lower));
    assert_eq!((same.cents, same.band), (0, DeltaBand::Neutral));
    assert_eq!((added.cents, added.band), (10000, DeltaBand::Added));
    assert_eq!((removed.cents, removed.band), (-10000, DeltaBand::Removed));
    assert_eq!(compute_delta(None, None, 5), None);
}

#[test]
fn given_reordered_comparison_table_when_building_delta_grid_then_matches_by_ghs() {
    // Arrange: same GHS codes, swapped order and prices
    let current = PricingTable::new(
        "05C02",
        vec![
            GhsPricingEntry::new(1500, "05C021", 10000),
            GhsPricingEntry::new(1501, "05C022", 20000),
            GhsPricingEntry::new(1502, "05C023", 30000),
        ],
    );
    let previous = PricingTable::new(
        "05C02",
        vec![
            GhsPricingEntry::new(1501, "05C022", 20000),
            GhsPricingEntry::new(1500, "05C021", 12000),
        ],
    );

    // Act
    let grid = PricingGrid::build(&current, Some(&previous), 2, true);

    // Assert
    assert_eq!(grid.column_count(), 3);
    let cells: Vec<_> = grid.rows[1]
        .cells
        .iter()
        .map(|c| c.as_ref().map(|c| (c.cents, c.band)))
        .collect();
    assert_eq!(
        cells,
        vec![
            Some((-2000, CellBand::Delta(DeltaBand::Lower))),
            Some((0, CellBand::Delta(DeltaBand::Neutral))),
            Some((30000, CellBand::Delta(DeltaBand::Added))),
        ]
    );
}

#[test]
fn given_grid_when_serialized_then_bands_are_plain_names() {
    // Arrange
    let table = PricingTable::new("05C02", vec![entry()]);

    // Act
    let grid = PricingGrid::build(&table, None, 12, false);
    let json = serde_json::to_value(&grid).unwrap();

    // Assert
    assert_eq!(json["ghm_root"], "05C02");
    assert_eq!(json["rows"][1]["label"], "1 nuit");
    assert_eq!(json["rows"][1]["cells"][0]["text"], "90,00");
    assert_eq!(json["rows"][11]["cells"][0]["cents"], 10400);
    assert!(json["rows"][1]["cells"][0].get("warn").is_none());
    assert_eq!(json["header"][0]["name"], "GHS");
}
