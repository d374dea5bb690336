use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Failed to compute average color: {0}")]
    Compute(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Failed to load model: {0}")]
    Model(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid settings: {0}")]
    Settings(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("UI error: {0}")]
    Ui(String),
    #[error("Request was cancelled")]
    Cancelled,
}

impl From<image::ImageError> for AppError {
    fn from(error: image::ImageError) -> Self {
        AppError::InvalidImage(error.to_string())
    }
}

impl From<tower::BoxError> for AppError {
    fn from(error: tower::BoxError) -> Self {
        if error.is::<tower::timeout::error::Elapsed>() {
            return AppError::Inference("classification timed out".to_string());
        }
        match error.downcast::<AppError>() {
            Ok(app_error) => *app_error,
            Err(other) => AppError::Inference(other.to_string()),
        }
    }
}
