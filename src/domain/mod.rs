//! Domain layer: entities and model logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod identifier;
pub mod notes;
pub mod overlay;
pub mod stereotype;

pub use arena::{TreeArena, TreeLink, TreeNode, TreeObject};
pub use builder::{RootPolicy, TreeBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use identifier::CriterionName;
pub use notes::{NoteFields, NoteLayout};
pub use stereotype::{classify, Classification, EntryKind};
