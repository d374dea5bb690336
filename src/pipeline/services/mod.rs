pub mod classifier;
pub mod image;

pub use classifier::{Classifier, ClassifierService, OnnxClassifier};
pub use self::image::AverageColorService;
