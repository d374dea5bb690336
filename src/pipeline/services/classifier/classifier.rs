use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;

use crate::common::Orientation;
use crate::error::AppError;
use crate::pipeline::types::Classifications;

/// Image recognition capability. Implementations may take arbitrarily long;
/// callers drop the returned future to cancel a request they no longer need.
///
/// An empty `Classifications` means the model recognized nothing, which is
/// a successful outcome distinct from an `Err`.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        image: Arc<DynamicImage>,
        orientation: Orientation,
    ) -> Result<Classifications, AppError>;

    fn name(&self) -> &'static str;
}
