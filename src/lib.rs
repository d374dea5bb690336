pub mod app;
pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod intake;
pub mod pipeline;

pub use config::Settings;
pub use coordinator::{ClassificationCoordinator, CoordinatorBuilder};
pub use error::AppError;
pub use pipeline::services::{Classifier, OnnxClassifier};
