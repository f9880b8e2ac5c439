//! Integration tests for loading versions from a data directory on disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use casemix::application::services::PricingGrid;
use casemix::domain::{DeltaBand, PriceBand};
use casemix::infrastructure::traits::RealFileSystem;
use casemix::infrastructure::{DataLoader, PRICE_MAP_FILE, TREE_FILE, VERSION_INDEX_FILE};
use casemix::util::testing;

const TREE: &str = r#"[
    {"test": 1, "text": "Acte A-1", "children_idx": 1, "children_count": 2},
    {"test": 0, "text": "Medical"},
    {"test": 0, "text": "GHM 05C021"}
]"#;

fn price_map(ghs_cents: i64) -> String {
    format!(
        r#"[{{"ghm_root": "05C02", "ghs": [
            {{"ghs": 1500, "ghm": "05C021", "ghm_mode": "1", "ghs_cents": {ghs_cents},
              "exh_treshold": 10, "exh_cents": 200}}
        ]}}]"#
    )
}

fn write_version(data_dir: &Path, name: &str, price_map: Option<&str>) {
    let dir = data_dir.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(TREE_FILE), TREE).unwrap();
    if let Some(content) = price_map {
        fs::write(dir.join(PRICE_MAP_FILE), content).unwrap();
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn loader(dir: &TempDir) -> DataLoader {
    DataLoader::new(Arc::new(RealFileSystem), dir.path())
}

#[test]
fn given_version_directories_when_loading_catalog_then_sessions_are_date_ordered() {
    testing::init_test_setup();
    // Arrange
    let data = TempDir::new().unwrap();
    write_version(data.path(), "2019-03-01", Some(&price_map(11000)));
    write_version(data.path(), "2018-03-01", Some(&price_map(10000)));
    fs::create_dir(data.path().join("scratch")).unwrap();

    // Act
    let catalog = loader(&data).load_catalog().unwrap();

    // Assert
    let labels: Vec<_> = catalog.versions().map(|s| s.info().label()).collect();
    assert_eq!(labels, vec!["2018-03", "2019-03"]);
    assert_eq!(
        catalog.versions().next().unwrap().info().end_date,
        Some(date(2019, 3, 1))
    );
    assert_eq!(catalog.latest().unwrap().version(), date(2019, 3, 1));
    assert_eq!(catalog.in_force(date(2018, 12, 31)).unwrap().version(), date(2018, 3, 1));
}

#[test]
fn given_two_versions_when_pricing_then_delta_reflects_tariff_change() {
    testing::init_test_setup();
    // Arrange
    let data = TempDir::new().unwrap();
    write_version(data.path(), "2018-03-01", Some(&price_map(10000)));
    write_version(data.path(), "2019-03-01", Some(&price_map(11000)));
    let catalog = loader(&data).load_catalog().unwrap();
    let current = catalog.get(date(2019, 3, 1)).unwrap();
    let previous = catalog.neighbour(current.version(), -1).unwrap().unwrap();

    // Act
    let price = current.price("05C02", 1500, 12).unwrap().unwrap();
    let delta = current.delta(previous, "05C02", 1500, 12).unwrap().unwrap();

    // Assert
    assert_eq!((price.cents, price.band), (11600, PriceBand::ExH));
    assert_eq!((delta.cents, delta.band), (1000, DeltaBand::Higher));

    let grid = PricingGrid::build(
        current.pricing_table("05C02").unwrap(),
        Some(previous.pricing_table("05C02").unwrap()),
        3,
        true,
    );
    assert_eq!(grid.rows.len(), 3);
    assert_eq!(grid.rows[2].cells[0].as_ref().map(|c| c.cents), Some(1000));
}

#[test]
fn given_loaded_version_when_building_tree_then_links_are_scanned() {
    // Arrange
    let data = TempDir::new().unwrap();
    write_version(data.path(), "2019-03-01", None);
    let catalog = loader(&data).load_catalog().unwrap();

    // Act
    let forest = catalog.latest().unwrap().tree().unwrap();

    // Assert
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0].label_text(), "Acte A-1");
    assert_eq!(forest[1].label_text(), "Medical");
    assert_eq!(forest[0].children[0].label_text(), "GHM 05C021");
    assert!(forest[0].find_path("0").is_some());
}

#[test]
fn given_version_index_when_listing_then_index_wins_over_directories() {
    // Arrange
    let data = TempDir::new().unwrap();
    write_version(data.path(), "2018-03-01", None);
    write_version(data.path(), "2019-03-01", None);
    fs::write(
        data.path().join(VERSION_INDEX_FILE),
        r#"[{"begin_date": "2019-03-01", "changed_prices": true}]"#,
    )
    .unwrap();

    // Act
    let versions = loader(&data).versions().unwrap();

    // Assert
    assert_eq!(versions.len(), 1);
    assert!(versions[0].changed_prices);
}

#[test]
fn given_invalid_json_when_loading_then_error_names_file() {
    // Arrange
    let data = TempDir::new().unwrap();
    write_version(data.path(), "2019-03-01", Some("{not json"));

    // Act
    let err = loader(&data).load_catalog().unwrap_err();

    // Assert
    let message = err.to_string();
    assert!(message.contains(PRICE_MAP_FILE), "{message}");
}

#[test]
fn given_missing_data_dir_when_loading_then_not_found() {
    let data = TempDir::new().unwrap();
    let loader = DataLoader::new(Arc::new(RealFileSystem), data.path().join("absent"));

    let err = loader.load_catalog().unwrap_err();

    assert!(err.is_not_found());
}
