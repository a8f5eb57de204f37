//! Integration tests for ModelService and InterchangeService with real files

use std::sync::Arc;

use tempfile::TempDir;

use fmodel::application::services::InterchangeService;
use fmodel::application::ApplicationError;
use fmodel::config::Settings;
use fmodel::domain::stereotype::{
    ST_COMPILER_INSTRUCTION, ST_CONSEQUENCE_LINK, ST_CRITERION, ST_FM, ST_FM_PROFILE, ST_FUNCTION,
    ST_SECTION,
};
use fmodel::domain::{DomainError, Model, ObjectRecord, RelationshipRecord, RootPolicy};
use fmodel::infrastructure::di::ServiceContainer;
use fmodel::infrastructure::traits::{ModelStore, RealFileSystem};
use fmodel::infrastructure::InMemoryStore;
use fmodel::util::testing;

fn container() -> ServiceContainer {
    testing::init_test_setup();
    ServiceContainer::with_deps(Settings::default(), Arc::new(RealFileSystem))
}

fn sample_model() -> Model {
    Model::new(
        vec![
            ObjectRecord::new("fm", ST_FM, "EHR-S FM"),
            ObjectRecord::new("cp", ST_SECTION, "Care Provision")
                .with_parent("fm")
                .with_alias("CP")
                .with_notes("$OV$overview$EX$example$AC$actors"),
            ObjectRecord::new("cp.1", ST_FUNCTION, "Manage Problem List")
                .with_parent("cp")
                .with_alias("CP.1")
                .with_notes("$ST$statement$DE$description$EX$"),
            ObjectRecord::new("cp.1#01", ST_CRITERION, "CP.1#01")
                .with_parent("cp.1")
                .with_notes("The system SHALL capture problems.")
                .with_tagged_value("Row", "1"),
            ObjectRecord::new("cp.2", ST_FUNCTION, "Manage Medication List")
                .with_parent("cp")
                .with_alias("CP.2"),
            ObjectRecord::new("profile", ST_FM_PROFILE, "Profile"),
            ObjectRecord::new("ci-cp", ST_COMPILER_INSTRUCTION, "Care").with_parent("profile"),
        ],
        vec![
            RelationshipRecord::new("cp.1", "cp.2", "Dependency", ST_CONSEQUENCE_LINK),
            RelationshipRecord::generalization("ci-cp", "cp"),
        ],
    )
}

fn store() -> InMemoryStore {
    InMemoryStore::from_model(sample_model()).unwrap()
}

// ============================================================
// Interchange files
// ============================================================

#[test]
fn given_model_when_written_and_read_then_identical() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/dir/model.toml");
    let container = container();
    let model = sample_model();

    // Act
    container.interchange.write(&path, &model).unwrap();
    let loaded = container.interchange.read(&path).unwrap();

    // Assert
    assert_eq!(loaded, model);
}

#[test]
fn given_invalid_toml_when_reading_then_interchange_error_names_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    std::fs::write(&path, "objects = [ not toml").unwrap();

    let err = container().interchange.read(&path).unwrap_err();

    match err {
        ApplicationError::Interchange { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn given_missing_file_when_reading_then_operation_failed() {
    let temp = TempDir::new().unwrap();

    let err = container()
        .interchange
        .read(&temp.path().join("missing.toml"))
        .unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
}

#[test]
fn given_models_differing_only_in_timestamps_when_stripped_then_same_digest() {
    let mut first = sample_model();
    first.export_date = Some("2024-01-01T00:00:00Z".to_string());
    first.objects[1].modified = Some("2024-01-01T00:00:00Z".to_string());
    let mut second = sample_model();
    second.export_date = Some("2025-06-30T12:00:00Z".to_string());

    assert_ne!(
        InterchangeService::digest(&first).unwrap(),
        InterchangeService::digest(&second).unwrap()
    );

    first.strip_volatile();
    second.strip_volatile();
    assert_eq!(
        InterchangeService::digest(&first).unwrap(),
        InterchangeService::digest(&second).unwrap()
    );
}

// ============================================================
// Export and import
// ============================================================

#[test]
fn given_scope_when_exporting_then_scope_root_parentless_and_stamped() {
    let container = container();

    let model = container.model.export(&store(), "cp").unwrap();

    let ids: Vec<&str> = model.objects.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["cp", "cp.1", "cp.1#01", "cp.2"]);
    assert_eq!(model.objects[0].parent_id, None);
    assert_eq!(model.relationships.len(), 1);
    assert!(model.export_date.is_some());
}

#[test]
fn given_unknown_scope_when_exporting_then_element_not_found() {
    let err = container().model.export(&store(), "nowhere").unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::ElementNotFound(_))
    ));
}

#[test]
fn given_document_when_importing_then_root_attached_below_target() {
    // Arrange
    let container = container();
    let mut target = InMemoryStore::from_model(Model::new(
        vec![ObjectRecord::new("workspace", ST_FM_PROFILE, "Workspace")],
        vec![],
    ))
    .unwrap();
    let document = container.model.export(&store(), "cp").unwrap();

    // Act
    let root = container
        .model
        .import(&mut target, "workspace", &document)
        .unwrap();

    // Assert
    assert_eq!(root, "cp");
    assert_eq!(target.len(), 5);
    assert_eq!(
        target.object("cp").unwrap().parent_id.as_deref(),
        Some("workspace")
    );
    assert!(target.object("cp.1#01").unwrap().modified.is_some());
    assert_eq!(target.pending().count(), 0);
    assert_eq!(target.list_relationships("cp").unwrap().len(), 1);
}

#[test]
fn given_document_without_root_when_importing_then_empty_model() {
    let container = container();
    let mut target = store();
    let document = Model::new(
        vec![ObjectRecord::new("x", ST_SECTION, "X").with_parent("y")],
        vec![],
    );

    let err = container.model.import(&mut target, "fm", &document).unwrap_err();

    assert!(matches!(err, ApplicationError::EmptyModel(_)));
}

#[test]
fn given_strict_policy_when_loading_scope_with_two_roots_then_error() {
    testing::init_test_setup();
    let settings = Settings {
        root_policy: RootPolicy::Strict,
        ..Settings::default()
    };
    let container = ServiceContainer::with_deps(settings, Arc::new(RealFileSystem));
    let document = Model::new(
        vec![
            ObjectRecord::new("a", ST_SECTION, "A"),
            ObjectRecord::new("b", ST_SECTION, "B"),
        ],
        vec![],
    );

    let err = container.model.import(&mut store(), "fm", &document).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::MultipleRoots { .. })
    ));
}

#[test]
fn given_tree_when_classifying_then_catalog_entries_in_pre_order() {
    let container = container();
    let store = store();
    let tree = container.model.load_tree(&store, "fm").unwrap();

    let entries = container.model.classify_tree(&store, &tree).unwrap();

    let ids: Vec<&str> = entries.iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec!["cp", "cp.1", "cp.1#01", "cp.2"]);
}

// ============================================================
// Round trip
// ============================================================

#[test]
fn given_scope_when_round_tripping_then_exports_identical() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let container = container();
    let source = store();
    let mut scratch = InMemoryStore::new();

    // Act
    let report = container
        .model
        .roundtrip(&source, "cp", &mut scratch, temp.path())
        .unwrap();

    // Assert
    assert!(report.is_identical(), "digests: {} vs {}", report.first_digest, report.second_digest);
    assert_eq!(report.objects, 4);
    assert_eq!(report.relationships, 1);
    assert!(report.first_path.exists());
    assert!(report.second_path.exists());
    assert!(report.scratch_scope.starts_with("scratch-"));
    assert!(scratch.object(&report.scratch_scope).is_ok());
}
