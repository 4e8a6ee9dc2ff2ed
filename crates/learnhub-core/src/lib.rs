//! Quiz grading, progress aggregation and performance reporting
//!
//! Services in this crate take their collaborators explicitly: a
//! [`LearningStore`] for persistence and a
//! [`UserDirectory`](learnhub_directory::UserDirectory) for user lookups.
//! Nothing here holds ambient database state.

pub mod aggregator;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod grading;
pub mod progress;
pub mod reporting;
pub mod store;

pub use aggregator::ProgressAggregator;
pub use catalog::CourseCatalog;
pub use engine::GradingEngine;
pub use error::CoreError;
pub use reporting::PerformanceReporter;
pub use store::{LearningStore, SeaOrmStore};

use learnhub_directory::UserDirectory;
use std::sync::Arc;

/// Bundle of every service, sharing one store and one directory
#[derive(Clone)]
pub struct Services {
    pub grading: GradingEngine,
    pub progress: ProgressAggregator,
    pub reporting: PerformanceReporter,
    pub catalog: CourseCatalog,
}

impl Services {
    pub fn new(store: Arc<dyn LearningStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            grading: GradingEngine::new(store.clone(), directory.clone()),
            progress: ProgressAggregator::new(store.clone()),
            reporting: PerformanceReporter::new(store.clone(), directory.clone()),
            catalog: CourseCatalog::new(store, directory),
        }
    }
}
