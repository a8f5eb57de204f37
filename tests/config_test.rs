//! Integration tests for layered Settings loading from project-local files.
//!
//! These tests only use temp directories as project dirs; no global config is
//! written and no `FMODEL_*` variables are set.

use std::fs;

use tempfile::TempDir;

use fmodel::application::ApplicationError;
use fmodel::config::{local_config_path, Settings};
use fmodel::domain::RootPolicy;

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let project = TempDir::new().unwrap();

    let settings = Settings::load(Some(project.path())).unwrap();

    assert_eq!(settings.note_tag_cap, 5);
    assert_eq!(settings.root_policy, RootPolicy::LastWins);
}

#[test]
fn given_local_config_when_load_then_values_override_defaults() {
    // Arrange
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        r#"
root_policy = "strict"
note_tag_cap = 3
default_scope = "EHR-S FM"
store_path = "models/fm.toml"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(project.path())).unwrap();

    // Assert
    assert_eq!(settings.root_policy, RootPolicy::Strict);
    assert_eq!(settings.note_tag_cap, 3);
    assert_eq!(settings.default_scope.as_deref(), Some("EHR-S FM"));
    assert_eq!(
        settings.store_path.as_deref(),
        Some(std::path::Path::new("models/fm.toml"))
    );
}

#[test]
fn given_zero_tag_cap_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "note_tag_cap = 0\n").unwrap();

    let result = Settings::load(Some(project.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_unknown_root_policy_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "root_policy = \"first-wins\"\n").unwrap();

    let result = Settings::load(Some(project.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_template_when_parsed_then_valid_config() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), Settings::template()).unwrap();

    let settings = Settings::load(Some(project.path())).unwrap();

    assert_eq!(settings, Settings::default());
}
