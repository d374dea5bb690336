use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tracing::{debug, info, warn};

use crate::common::Photo;
use crate::config::Settings;
use crate::error::AppError;
use crate::pipeline::services::classifier::{
    BoxedClassifierService, ClassificationRequest, Classifier, ClassifierService,
};
use crate::pipeline::services::AverageColorService;
use crate::pipeline::types::{Completion, PhotoAnalysis, RequestToken};

struct InFlight {
    token: RequestToken,
    cancel_token: CancellationToken,
    task: JoinHandle<()>,
}

/// Runs color extraction and classification for submitted photos in the
/// background and reports one `Completion` per request.
///
/// Submitting a new photo cancels the request still in flight. Completions
/// that were already on their way are tagged with their token so the
/// receiver can discard them.
pub struct ClassificationCoordinator {
    classifier: BoxedClassifierService,
    runtime: Handle,
    completion_tx: Sender<Completion>,
    cancel_token: CancellationToken,
    last_token: RequestToken,
    in_flight: Option<InFlight>,
}

impl ClassificationCoordinator {
    fn new(
        classifier: BoxedClassifierService,
        runtime: Handle,
        completion_tx: Sender<Completion>,
    ) -> Self {
        Self {
            classifier,
            runtime,
            completion_tx,
            cancel_token: CancellationToken::new(),
            last_token: RequestToken::INITIAL,
            in_flight: None,
        }
    }

    pub fn submit(&mut self, photo: Photo) -> RequestToken {
        self.cancel_in_flight();

        let token = self.last_token.next();
        self.last_token = token;

        let cancel_token = self.cancel_token.child_token();
        let task = self.runtime.spawn(Self::run_request(
            token,
            photo,
            self.classifier.clone(),
            self.completion_tx.clone(),
            cancel_token.clone(),
        ));
        self.in_flight = Some(InFlight {
            token,
            cancel_token,
            task,
        });
        token
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            if !in_flight.task.is_finished() {
                info!("Cancelling superseded request {}", in_flight.token);
            }
            in_flight.cancel_token.cancel();
        }
    }

    async fn run_request(
        token: RequestToken,
        photo: Photo,
        classifier: BoxedClassifierService,
        completion_tx: Sender<Completion>,
        cancel_token: CancellationToken,
    ) {
        let photo_id = photo.id();
        debug!("Request {} started for {}", token, photo.describe());

        let result = tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!("Request {} cancelled before completion", token);
                return;
            }
            result = Self::analyze(photo, classifier) => result,
        };

        if let Err(e) = &result {
            warn!("Request {} failed: {}", token, e);
        }
        let completion = Completion {
            token,
            photo_id,
            result,
        };
        if completion_tx.send(completion).await.is_err() {
            debug!("Completion receiver dropped, discarding request {}", token);
        }
    }

    /// Both halves always run to completion before a result is produced.
    async fn analyze(
        photo: Photo,
        classifier: BoxedClassifierService,
    ) -> Result<PhotoAnalysis, AppError> {
        let request = ClassificationRequest {
            image: photo.image().clone(),
            orientation: photo.orientation(),
        };
        let (color, classifications) = tokio::join!(
            AverageColorService::new().oneshot(photo.image().clone()),
            classifier.oneshot(request),
        );

        let classifications = classifications.map_err(AppError::from)?;
        Ok(PhotoAnalysis {
            color: color?,
            classifications,
        })
    }

    pub fn stop(&mut self) {
        self.cancel_token.cancel();
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
        }
    }
}

impl Drop for ClassificationCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct CoordinatorBuilder {
    classifier: Arc<dyn Classifier>,
    classify_timeout: Option<Duration>,
}

impl CoordinatorBuilder {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            classify_timeout: None,
        }
    }

    // Applies the classifier timeout and other relevant values from settings.
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.classify_timeout = settings.classifier.timeout_ms.map(Duration::from_millis);
        self
    }

    pub fn build(
        self,
        completion_tx: Sender<Completion>,
    ) -> Result<ClassificationCoordinator, AppError> {
        // Background work runs on the runtime the coordinator is built in.
        let runtime = Handle::try_current()
            .map_err(|e| AppError::Ui(format!("no async runtime available: {e}")))?;
        let classifier = ClassifierService::boxed(self.classifier, self.classify_timeout);
        Ok(ClassificationCoordinator::new(
            classifier,
            runtime,
            completion_tx,
        ))
    }
}
