use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::Level;

use crate::error::AppError;

const SETTINGS_FILE: &str = "photo_classifier";
const ENV_PREFIX: &str = "PHOTO_CLASSIFIER";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub classifier: ClassifierSettings,
    pub display: DisplaySettings,
    pub logging: LoggingSettings,
    pub channels: ChannelSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub input_size: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
    pub apply_softmax: bool,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub top_n: usize,
    pub target_label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub update_buffer_size: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            update_buffer_size: 16,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            classifier: ClassifierSettings::default(),
            display: DisplaySettings::default(),
            logging: LoggingSettings::default(),
            channels: ChannelSettings::default(),
        }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/resnet50.onnx"),
            labels_path: PathBuf::from("models/labels.txt"),
            input_size: 224,
            // ImageNet statistics
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
            apply_softmax: true,
            timeout_ms: None,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            top_n: 2,
            target_label: Some("crash helmet".to_string()),
        }
    }
}

impl Settings {
    /// Loads defaults, then `photo_classifier.toml` if present, then
    /// `PHOTO_CLASSIFIER__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, AppError> {
        Self::load_from(
            Config::builder().add_source(File::with_name(SETTINGS_FILE).required(false)),
        )
    }

    fn load_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, AppError> {
        let settings: Settings = Config::builder()
            .add_source(builder.build()?)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.display.top_n == 0 {
            return Err(AppError::Settings(
                "display.top_n must be greater than 0".to_string(),
            ));
        }

        if self.classifier.input_size == 0 {
            return Err(AppError::Settings(
                "classifier.input_size must be greater than 0".to_string(),
            ));
        }

        if self.classifier.std.iter().any(|s| *s == 0.0) {
            return Err(AppError::Settings(
                "classifier.std must not contain zeros".to_string(),
            ));
        }

        if self.channels.update_buffer_size == 0 {
            return Err(AppError::Settings(
                "channels.update_buffer_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn log_level(&self) -> Level {
        self.logging.level.parse().unwrap_or(Level::INFO)
    }
}
