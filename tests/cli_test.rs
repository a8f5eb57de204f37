//! End-to-end tests of command dispatch against a store file in a temp dir

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

use fmodel::application::services::InterchangeService;
use fmodel::cli::args::Cli;
use fmodel::cli::commands::{execute, ROUNDTRIP_DIR_PREFIX};
use fmodel::cli::CliError;
use fmodel::domain::stereotype::{ST_COMPILER_INSTRUCTION, ST_CRITERION, ST_FM, ST_FM_PROFILE};
use fmodel::domain::{Model, ObjectRecord, RelationshipRecord};
use fmodel::exitcode;
use fmodel::infrastructure::traits::RealFileSystem;
use fmodel::util::testing;

struct Workspace {
    dir: TempDir,
    store: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        testing::init_test_setup();
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("store.toml");
        let model = Model::new(
            vec![
                ObjectRecord::new("fm", ST_FM, "EHR-S FM"),
                ObjectRecord::new("c1", ST_CRITERION, "RT-1#01")
                    .with_parent("fm")
                    .with_notes("The system SHALL retain records.")
                    .with_tagged_value("Row", "5"),
                ObjectRecord::new("profile", ST_FM_PROFILE, "Profile"),
                ObjectRecord::new("ci-c1", ST_COMPILER_INSTRUCTION, "RT-1#01")
                    .with_parent("profile"),
            ],
            vec![RelationshipRecord::generalization("ci-c1", "c1")],
        );
        interchange().write(&store, &model).unwrap();
        Self { dir, store }
    }

    fn run(&self, args: &[&str]) -> Result<(), CliError> {
        let mut argv = vec![
            "fmodel",
            "--store",
            self.store.to_str().unwrap(),
            "-C",
            self.dir.path().to_str().unwrap(),
        ];
        argv.extend_from_slice(args);
        execute(&Cli::try_parse_from(argv).unwrap())
    }

    fn load(&self) -> Model {
        interchange().read(&self.store).unwrap()
    }
}

fn interchange() -> InterchangeService {
    InterchangeService::new(std::sync::Arc::new(RealFileSystem))
}

fn object<'a>(model: &'a Model, id: &str) -> &'a ObjectRecord {
    model.objects.iter().find(|o| o.id == id).unwrap()
}

#[test]
fn given_override_when_set_row_via_cli_then_store_file_updated() {
    let ws = Workspace::new();

    ws.run(&["set", "ci-c1", "row", "7"]).unwrap();

    let model = ws.load();
    assert_eq!(object(&model, "ci-c1").tagged_values.get("Row").map(String::as_str), Some("7"));
    assert_eq!(object(&model, "c1").tagged_values.get("Row").map(String::as_str), Some("5"));
    assert!(object(&model, "ci-c1").modified.is_some());
}

#[test]
fn given_override_when_set_row_back_to_base_via_cli_then_tag_removed() {
    let ws = Workspace::new();

    ws.run(&["set", "ci-c1", "row", "7"]).unwrap();
    ws.run(&["set", "ci-c1", "row", "5"]).unwrap();

    assert!(!object(&ws.load(), "ci-c1").tagged_values.contains_key("Row"));
}

#[test]
fn given_read_commands_when_executed_then_succeed() {
    let ws = Workspace::new();

    ws.run(&["tree", "fm", "--ids"]).unwrap();
    ws.run(&["show", "ci-c1"]).unwrap();
    ws.run(&["get", "c1", "text"]).unwrap();
    ws.run(&["notes", "unpack", "$OV$intro$EX$sample"]).unwrap();
    ws.run(&["notes", "pack", "OV=intro", "EX=sample"]).unwrap();
    ws.run(&["config", "show"]).unwrap();
}

#[test]
fn given_non_numeric_row_when_set_then_invalid_args() {
    let ws = Workspace::new();

    let err = ws.run(&["set", "c1", "row", "seven"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_field_of_other_kind_when_get_then_data_error() {
    let ws = Workspace::new();

    let err = ws.run(&["get", "c1", "overview"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_lowercase_tag_when_packing_then_invalid_args() {
    let ws = Workspace::new();

    let err = ws.run(&["notes", "pack", "ov=intro"]).unwrap_err();

    assert!(matches!(err, CliError::InvalidArgs(_)));
}

#[test]
fn given_missing_store_when_reading_then_noinput() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");
    let cli = Cli::try_parse_from([
        "fmodel",
        "--store",
        missing.to_str().unwrap(),
        "-C",
        dir.path().to_str().unwrap(),
        "tree",
    ])
    .unwrap();

    let err = execute(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_store_with_duplicate_ids_when_reading_then_dataerr() {
    let ws = Workspace::new();
    let mut model = ws.load();
    model.objects.push(ObjectRecord::new("c1", ST_CRITERION, "RT-1#02"));
    interchange().write(&ws.store, &model).unwrap();

    let err = ws.run(&["show", "c1"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_scope_when_export_then_import_then_elements_copied() {
    // Arrange
    let ws = Workspace::new();
    let exported = ws.dir.path().join("out/fm.toml");

    // Act
    ws.run(&["export", "fm", "-o", exported.to_str().unwrap()]).unwrap();

    // Assert
    let document = interchange().read(&exported).unwrap();
    assert_eq!(document.objects.len(), 2);
    assert!(document.export_date.is_some());

    // Importing the same ids again is rejected
    let err = ws
        .run(&["import", exported.to_str().unwrap(), "--into", "profile"])
        .unwrap_err();
    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_scope_when_roundtrip_then_both_files_written() {
    let ws = Workspace::new();
    let dir = ws.dir.path().join("rt");

    ws.run(&["roundtrip", "fm", "-d", dir.to_str().unwrap()]).unwrap();

    assert!(Path::new(&dir).join("roundtrip-1.toml").exists());
    assert!(Path::new(&dir).join("roundtrip-2.toml").exists());
}

fn roundtrip_dirs() -> HashSet<PathBuf> {
    std::fs::read_dir(std::env::temp_dir())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(ROUNDTRIP_DIR_PREFIX))
        .map(|e| e.path())
        .collect()
}

#[test]
fn given_no_dir_when_roundtrip_then_temporary_exports_removed() {
    let ws = Workspace::new();
    let before = roundtrip_dirs();

    ws.run(&["roundtrip", "fm"]).unwrap();

    let left_behind: Vec<PathBuf> = roundtrip_dirs().difference(&before).cloned().collect();
    assert!(left_behind.is_empty(), "left behind: {left_behind:?}");
}

#[test]
fn given_no_command_when_executing_then_usage() {
    let cli = Cli::try_parse_from(["fmodel"]).unwrap();

    let err = execute(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}
