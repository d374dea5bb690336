use async_trait::async_trait;
use image::ImageReader;
use std::io::Cursor;

use crate::common::{Orientation, Photo, PhotoOrigin};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Camera,
    Library,
}

/// Anything that can hand over a single photo.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Yields `Ok(None)` when the user backed out without choosing a photo.
    async fn acquire(&self) -> Result<Option<Photo>, AppError>;

    fn kind(&self) -> SourceKind;
}

/// Decodes encoded image bytes, keeping the EXIF orientation alongside the
/// stored pixels.
pub fn decode_photo(bytes: &[u8], origin: PhotoOrigin) -> Result<Photo, AppError> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(AppError::InvalidImage("decoded image has zero area".to_string()));
    }
    let orientation = Orientation::read_from(bytes);
    Ok(Photo::new(image, orientation, origin))
}
