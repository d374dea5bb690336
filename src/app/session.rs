use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TryRecvError, Receiver};
use tracing::{error, info};

use crate::app::display::DisplaySlot;
use crate::common::Photo;
use crate::config::Settings;
use crate::coordinator::{ClassificationCoordinator, CoordinatorBuilder};
use crate::error::AppError;
use crate::pipeline::services::Classifier;
use crate::pipeline::types::{Completion, RequestToken};

/// UI-side state for one screen: the displayed photo, its result slot and
/// the coordinator doing the background work.
pub struct ClassificationSession {
    coordinator: ClassificationCoordinator,
    completion_rx: Receiver<Completion>,
    slot: DisplaySlot,
    photo: Option<Photo>,
}

impl ClassificationSession {
    pub fn new(classifier: Arc<dyn Classifier>, settings: &Settings) -> Result<Self, AppError> {
        let (completion_tx, completion_rx) = mpsc::channel(settings.channels.update_buffer_size);
        let coordinator = CoordinatorBuilder::new(classifier)
            .settings(settings)
            .build(completion_tx)?;
        Ok(Self {
            coordinator,
            completion_rx,
            slot: DisplaySlot::new(&settings.display),
            photo: None,
        })
    }

    /// Shows the photo immediately and starts classifying it. Any earlier
    /// request stops mattering from this point on.
    pub fn submit(&mut self, photo: Photo) -> RequestToken {
        let photo_id = photo.id();
        info!("Classifying {}", photo.describe());
        let token = self.coordinator.submit(photo.clone());
        self.slot.begin(token, photo_id);
        self.photo = Some(photo);
        token
    }

    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    pub fn slot(&self) -> &DisplaySlot {
        &self.slot
    }

    pub fn slot_mut(&mut self) -> &mut DisplaySlot {
        &mut self.slot
    }

    /// Applies every completion already delivered without waiting. Returns
    /// whether the displayed result changed.
    pub fn poll_completions(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.completion_rx.try_recv() {
                Ok(completion) => changed |= self.slot.apply(completion),
                Err(TryRecvError::Empty) => return changed,
                Err(TryRecvError::Disconnected) => {
                    error!("Completion channel disconnected");
                    return changed;
                }
            }
        }
    }

    /// Waits until the most recent submission has been resolved.
    pub async fn settle(&mut self) -> Result<(), AppError> {
        while self.slot.is_pending() {
            match self.completion_rx.recv().await {
                Some(completion) => {
                    self.slot.apply(completion);
                }
                None => {
                    return Err(AppError::Ui(
                        "completion channel closed while a request was pending".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }
}
