use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::DynamicImage;
use uuid::Uuid;

use crate::common::Orientation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoOrigin {
    Camera,
    Library(PathBuf),
}

/// A decoded photo together with the orientation it was captured in.
#[derive(Clone)]
pub struct Photo {
    id: Uuid,
    image: Arc<DynamicImage>,
    orientation: Orientation,
    origin: PhotoOrigin,
    acquired_at: DateTime<Utc>,
}

impl Photo {
    pub fn new(image: DynamicImage, orientation: Orientation, origin: PhotoOrigin) -> Self {
        Self {
            id: Uuid::new_v4(),
            image: Arc::new(image),
            orientation,
            origin,
            acquired_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Pixels as stored, before the orientation is applied.
    pub fn image(&self) -> &Arc<DynamicImage> {
        &self.image
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn origin(&self) -> &PhotoOrigin {
        &self.origin
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    pub fn upright(&self) -> DynamicImage {
        self.orientation.apply(&self.image)
    }

    pub fn describe(&self) -> String {
        match &self.origin {
            PhotoOrigin::Camera => format!("camera photo {}", self.id),
            PhotoOrigin::Library(path) => path.display().to_string(),
        }
    }
}
