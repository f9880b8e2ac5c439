//! Integration tests for Settings loading with a local config file.
//!
//! These tests write config files into temp directories only; the global
//! config of the machine running them may still contribute a baseline.

use std::fs;

use tempfile::TempDir;

use casemix::config::{expand_env_vars, Settings};

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("casemix.toml");
    fs::write(
        &path,
        r#"
data_dir = "/srv/casemix"

[pricing]
max_duration = 40
merge_cells = false

[tree]
start_node = 7
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.data_dir.to_string_lossy(), "/srv/casemix");
    assert_eq!(settings.pricing.max_duration, 40);
    assert!(!settings.pricing.merge_cells);
    assert_eq!(settings.tree.start_node, 7);
}

#[test]
fn given_partial_local_config_when_load_then_keeps_other_sections() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("casemix.toml");
    fs::write(&path, "[tree]\nstart_node = 3\n").unwrap();
    let baseline = Settings::load(None).expect("load baseline");

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.tree.start_node, 3);
    assert_eq!(settings.pricing, baseline.pricing);
    assert_eq!(settings.data_dir, baseline.data_dir);
}

#[test]
fn given_missing_local_config_when_load_then_fails() {
    let dir = TempDir::new().unwrap();

    let result = Settings::load(Some(&dir.path().join("absent.toml")));

    assert!(result.is_err());
}

#[test]
fn given_malformed_local_config_when_load_then_error_names_file() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[pricing]\nmax_duration = \"many\"\n").unwrap();

    // Act
    let err = Settings::load(Some(&path)).unwrap_err();

    // Assert
    assert!(err.to_string().contains("broken.toml"), "{err}");
}

#[test]
fn given_home_relative_path_when_expanding_then_uses_home() {
    let home = std::env::var("HOME").expect("HOME should be set");

    assert_eq!(expand_env_vars("~/data"), format!("{home}/data"));
    assert_eq!(expand_env_vars("/plain/path"), "/plain/path");
}
