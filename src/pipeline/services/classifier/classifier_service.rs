use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use image::DynamicImage;
use tower::timeout::TimeoutLayer;
use tower::util::BoxCloneService;
use tower::{BoxError, Service, ServiceBuilder};
use tracing::{debug, debug_span, Instrument};

use crate::common::Orientation;
use crate::pipeline::services::classifier::Classifier;
use crate::pipeline::types::Classifications;

#[derive(Clone)]
pub struct ClassificationRequest {
    pub image: Arc<DynamicImage>,
    pub orientation: Orientation,
}

/// Classification pipeline handed to the coordinator, with the optional
/// timeout already applied.
pub type BoxedClassifierService = BoxCloneService<ClassificationRequest, Classifications, BoxError>;

/// Adapts any `Classifier` to a tower `Service`.
#[derive(Clone)]
pub struct ClassifierService {
    inner: Arc<dyn Classifier>,
}

impl ClassifierService {
    pub fn new(inner: Arc<dyn Classifier>) -> Self {
        Self { inner }
    }

    pub fn boxed(inner: Arc<dyn Classifier>, timeout: Option<Duration>) -> BoxedClassifierService {
        let service = ServiceBuilder::new()
            .option_layer(timeout.map(TimeoutLayer::new))
            .service(ClassifierService::new(inner));
        BoxCloneService::new(service)
    }
}

// Errors are boxed so the optional timeout layer can wrap this service.
impl Service<ClassificationRequest> for ClassifierService {
    type Response = Classifications;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ClassificationRequest) -> Self::Future {
        let inner = self.inner.clone();
        let span = debug_span!("classify", classifier = inner.name());

        Box::pin(
            async move {
                let classifications = inner.classify(req.image, req.orientation).await?;
                debug!("{} returned {} results", inner.name(), classifications.len());
                Ok(classifications)
            }
            .instrument(span),
        )
    }
}
