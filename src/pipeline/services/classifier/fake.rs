use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;

use crate::common::Orientation;
use crate::error::AppError;
use crate::pipeline::services::classifier::Classifier;
use crate::pipeline::types::{Classification, Classifications};

enum Outcome {
    Results(Vec<Classification>),
    Failure(String),
}

/// Scripted classifier for tests.
pub struct FakeClassifier {
    outcome: Outcome,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl FakeClassifier {
    pub fn returning(results: Vec<Classification>) -> Self {
        Self {
            outcome: Outcome::Results(results),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Outcome::Failure(message.to_string()),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(
        &self,
        _image: Arc<DynamicImage>,
        _orientation: Orientation,
    ) -> Result<Classifications, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            Outcome::Results(results) => Ok(Classifications::ranked(results.clone())),
            Outcome::Failure(message) => Err(AppError::Inference(message.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "FakeClassifier"
    }
}

/// Answers based on the image's top-left red channel, so tests can tell
/// which photo a result belongs to.
pub struct ByRedChannelClassifier {
    pub slow_red: u8,
    pub slow_delay: Duration,
}

#[async_trait]
impl Classifier for ByRedChannelClassifier {
    async fn classify(
        &self,
        image: Arc<DynamicImage>,
        _orientation: Orientation,
    ) -> Result<Classifications, AppError> {
        let red = image.to_rgba8().get_pixel(0, 0)[0];
        if red == self.slow_red {
            tokio::time::sleep(self.slow_delay).await;
        }
        Ok(Classifications::ranked(vec![Classification::new(
            format!("red {red}"),
            0.9,
        )]))
    }

    fn name(&self) -> &'static str {
        "ByRedChannelClassifier"
    }
}
