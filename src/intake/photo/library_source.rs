use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::common::{Photo, PhotoOrigin};
use crate::error::AppError;
use crate::intake::photo::{decode_photo, PhotoSource, SourceKind};

/// Reads a photo the user picked from disk. An empty selection means the
/// picker was dismissed.
pub struct LibrarySource {
    selection: Option<PathBuf>,
}

impl LibrarySource {
    pub fn new(selection: Option<PathBuf>) -> Self {
        Self {
            selection: selection.filter(|path| !path.as_os_str().is_empty()),
        }
    }
}

#[async_trait]
impl PhotoSource for LibrarySource {
    async fn acquire(&self) -> Result<Option<Photo>, AppError> {
        let Some(path) = &self.selection else {
            debug!("Photo library selection cancelled");
            return Ok(None);
        };

        let bytes = tokio::fs::read(path).await?;
        let origin = PhotoOrigin::Library(path.clone());
        let photo = tokio::task::spawn_blocking(move || decode_photo(&bytes, origin))
            .await
            .map_err(|e| AppError::InvalidImage(e.to_string()))??;
        info!(
            "Loaded {} ({}x{}, {:?})",
            path.display(),
            photo.image().width(),
            photo.image().height(),
            photo.orientation()
        );
        Ok(Some(photo))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Library
    }
}
