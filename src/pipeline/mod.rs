pub mod services;
pub mod types;

pub use services::{AverageColorService, Classifier, ClassifierService};
pub use types::{AverageColor, Classification, Classifications, Completion, RequestToken};
