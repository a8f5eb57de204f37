//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent integrity violations in the source model.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("relationship source not found: {source_id} (target {target_id})")]
    RelationshipSourceNotFound {
        source_id: String,
        target_id: String,
    },

    #[error("duplicate object id: {0}")]
    DuplicateObject(String),

    #[error("multiple root objects: {first} and {second}")]
    MultipleRoots { first: String, second: String },

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("compiler instruction {0} has no generalization")]
    MissingGeneralization(String),

    #[error("compiler instruction {id} has {count} generalizations (expected 1)")]
    AmbiguousGeneralization { id: String, count: usize },

    #[error("unsupported stereotype '{stereotype}' on element {id}")]
    UnsupportedStereotype { id: String, stereotype: String },

    #[error("field '{field}' is not available on {kind}")]
    UnsupportedField { kind: String, field: String },

    #[error("field '{field}' expects {expected}, got '{value}'")]
    FieldTypeMismatch {
        field: String,
        expected: String,
        value: String,
    },

    #[error("malformed identifier '{0}': missing '#' separator")]
    MalformedIdentifier(String),

    #[error("malformed ordinal '{ordinal}' in identifier '{name}'")]
    MalformedOrdinal { name: String, ordinal: String },

    #[error("invalid tagged value {tag}='{value}' on element {id}")]
    InvalidTaggedValue {
        id: String,
        tag: String,
        value: String,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
