use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::pipeline::types::{AverageColor, Classifications, RequestToken};

/// Color and classification of one photo, produced together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoAnalysis {
    pub color: AverageColor,
    pub classifications: Classifications,
}

/// The single message a request sends back to the UI context.
#[derive(Debug)]
pub struct Completion {
    pub token: RequestToken,
    pub photo_id: Uuid,
    pub result: Result<PhotoAnalysis, AppError>,
}
