//! Wiring of settings, filesystem and model services for one command run

use std::sync::Arc;

use crate::application::services::{InterchangeService, ModelService};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

pub struct ServiceContainer {
    pub settings: Arc<Settings>,
    pub fs: Arc<dyn FileSystem>,

    pub interchange: Arc<InterchangeService>,

    pub model: ModelService,
}

impl ServiceContainer {
    /// Services on the real filesystem.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Services on a caller-supplied filesystem, e.g. a test double.
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let interchange = Arc::new(InterchangeService::new(fs.clone()));
        let model = ModelService::new(interchange.clone(), settings.clone());

        Self {
            settings,
            fs,
            interchange,
            model,
        }
    }
}
