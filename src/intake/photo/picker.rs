use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::common::Photo;
use crate::error::AppError;
use crate::intake::photo::{LibrarySource, PhotoSource, SourceKind};

/// Chooses where a photo comes from. Camera requests fall back to the
/// library when no camera source is installed.
#[derive(Clone, Default)]
pub struct PhotoPicker {
    camera: Option<Arc<dyn PhotoSource>>,
}

impl PhotoPicker {
    pub fn new() -> Self {
        Self { camera: None }
    }

    pub fn with_camera(mut self, camera: Arc<dyn PhotoSource>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn camera_available(&self) -> bool {
        self.camera.is_some()
    }

    pub fn source_for(
        &self,
        requested: SourceKind,
        library_selection: Option<PathBuf>,
    ) -> Arc<dyn PhotoSource> {
        match (requested, &self.camera) {
            (SourceKind::Camera, Some(camera)) => camera.clone(),
            (SourceKind::Camera, None) => {
                info!("No camera available, falling back to the photo library");
                Arc::new(LibrarySource::new(library_selection))
            }
            (SourceKind::Library, _) => Arc::new(LibrarySource::new(library_selection)),
        }
    }

    pub async fn pick(
        &self,
        requested: SourceKind,
        library_selection: Option<PathBuf>,
    ) -> Result<Option<Photo>, AppError> {
        let source = self.source_for(requested, library_selection);
        debug!("Picking a photo from {:?}", source.kind());
        source.acquire().await
    }
}
