//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, ModelStore)
//! but are themselves concrete structs, not traits.

mod interchange;
mod model;

pub use interchange::InterchangeService;
pub use model::{ModelService, ModelTree, RoundTripReport};
