mod classifier;
pub mod classifier_service;
#[cfg(test)]
pub(crate) mod fake;
pub mod onnx_classifier;

pub use classifier::Classifier;
pub use classifier_service::{BoxedClassifierService, ClassificationRequest, ClassifierService};
pub use onnx_classifier::OnnxClassifier;
