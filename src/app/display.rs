use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::DisplaySettings;
use crate::pipeline::types::{
    AverageColor, Classification, Completion, PhotoAnalysis, RequestToken,
};

pub const CLASSIFYING_TEXT: &str = "Classifying...";
pub const NOTHING_RECOGNIZED_TEXT: &str = "Nothing recognized.";
pub const FAILURE_HEADER: &str = "Unable to classify image.";

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    Idle,
    Classifying {
        token: RequestToken,
        photo_id: Uuid,
    },
    Classified {
        token: RequestToken,
        photo_id: Uuid,
        analysis: PhotoAnalysis,
    },
    Failed {
        token: RequestToken,
        photo_id: Uuid,
        message: String,
    },
}

/// Shown once when a displayed label matches the configured target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    fn target_found() -> Self {
        Self {
            title: "WOW Congrats".to_string(),
            message: "You searched it..".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub token: RequestToken,
    pub text: String,
    pub color: Option<AverageColor>,
    pub classifications: Vec<Classification>,
    pub target_found: bool,
}

/// The one place the UI context keeps the currently displayed result.
/// Only completions carrying the most recent token may change it.
pub struct DisplaySlot {
    state: DisplayState,
    current: RequestToken,
    top_n: usize,
    target_label: Option<String>,
    pending_alert: Option<Alert>,
}

impl DisplaySlot {
    pub fn new(settings: &DisplaySettings) -> Self {
        Self {
            state: DisplayState::Idle,
            current: RequestToken::INITIAL,
            top_n: settings.top_n,
            target_label: settings.target_label.clone(),
            pending_alert: None,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DisplayState::Classifying { .. })
    }

    pub fn begin(&mut self, token: RequestToken, photo_id: Uuid) {
        if token <= self.current {
            debug!("Ignoring out of order submission {}", token);
            return;
        }
        self.current = token;
        self.pending_alert = None;
        self.state = DisplayState::Classifying { token, photo_id };
    }

    /// Returns whether the completion was applied.
    pub fn apply(&mut self, completion: Completion) -> bool {
        let Completion {
            token,
            photo_id,
            result,
        } = completion;

        match self.state {
            DisplayState::Classifying {
                token: pending,
                photo_id: pending_photo,
            } if pending == token && pending_photo == photo_id => {}
            _ => {
                debug!(
                    "Discarding stale completion {} (current {})",
                    token, self.current
                );
                return false;
            }
        }

        self.state = match result {
            Ok(analysis) => {
                if self.shows_target(&analysis) {
                    self.pending_alert = Some(Alert::target_found());
                }
                DisplayState::Classified {
                    token,
                    photo_id,
                    analysis,
                }
            }
            Err(e) => DisplayState::Failed {
                token,
                photo_id,
                message: e.to_string(),
            },
        };
        true
    }

    fn shows_target(&self, analysis: &PhotoAnalysis) -> bool {
        let Some(target) = &self.target_label else {
            return false;
        };
        analysis
            .classifications
            .top(self.top_n)
            .iter()
            .any(|c| &c.label == target)
    }

    pub fn take_alert(&mut self) -> Option<Alert> {
        self.pending_alert.take()
    }

    pub fn swatch(&self) -> Option<AverageColor> {
        match &self.state {
            DisplayState::Classified { analysis, .. } => Some(analysis.color),
            _ => None,
        }
    }

    pub fn text(&self) -> String {
        match &self.state {
            DisplayState::Idle => String::new(),
            DisplayState::Classifying { .. } => CLASSIFYING_TEXT.to_string(),
            DisplayState::Failed { message, .. } => format!("{FAILURE_HEADER}\n{message}"),
            DisplayState::Classified { analysis, .. } => {
                if analysis.classifications.is_empty() {
                    return NOTHING_RECOGNIZED_TEXT.to_string();
                }
                let [r, g, b, a] = analysis.color.normalized();
                let descriptions: Vec<String> = analysis
                    .classifications
                    .top(self.top_n)
                    .iter()
                    .map(|c| format!("  ({:.2}) {}", c.confidence, c.label))
                    .collect();
                format!(
                    "Color: ({r:.2}, {g:.2}, {b:.2}, {a:.2})\nClassification:\n{}",
                    descriptions.join("\n")
                )
            }
        }
    }

    pub fn report(&self) -> Report {
        let classifications = match &self.state {
            DisplayState::Classified { analysis, .. } => {
                analysis.classifications.top(self.top_n).to_vec()
            }
            _ => Vec::new(),
        };
        let target_found = match &self.state {
            DisplayState::Classified { analysis, .. } => self.shows_target(analysis),
            _ => false,
        };
        Report {
            token: self.current,
            text: self.text(),
            color: self.swatch(),
            classifications,
            target_found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::pipeline::types::Classifications;

    fn settings() -> DisplaySettings {
        DisplaySettings {
            top_n: 2,
            target_label: Some("crash helmet".to_string()),
        }
    }

    fn analysis(labels: &[(&str, f32)], color: AverageColor) -> PhotoAnalysis {
        PhotoAnalysis {
            color,
            classifications: Classifications::ranked(
                labels
                    .iter()
                    .map(|(label, confidence)| Classification::new(*label, *confidence))
                    .collect(),
            ),
        }
    }

    fn completion(
        token: RequestToken,
        photo_id: Uuid,
        result: Result<PhotoAnalysis, AppError>,
    ) -> Completion {
        Completion {
            token,
            photo_id,
            result,
        }
    }

    #[test]
    fn pending_request_shows_classifying() {
        let mut slot = DisplaySlot::new(&settings());
        assert_eq!(slot.text(), "");
        slot.begin(RequestToken::INITIAL.next(), Uuid::new_v4());
        assert_eq!(slot.text(), "Classifying...");
        assert!(slot.is_pending());
        assert!(slot.swatch().is_none());
    }

    #[test]
    fn results_show_color_and_top_two() {
        let mut slot = DisplaySlot::new(&settings());
        let token = RequestToken::INITIAL.next();
        let photo = Uuid::new_v4();
        slot.begin(token, photo);
        let result = analysis(
            &[("tabby", 0.5), ("tiger cat", 0.3), ("lynx", 0.2)],
            AverageColor::new(255, 0, 51, 255),
        );
        assert!(slot.apply(completion(token, photo, Ok(result))));
        assert_eq!(
            slot.text(),
            "Color: (1.00, 0.00, 0.20, 1.00)\nClassification:\n  (0.50) tabby\n  (0.30) tiger cat"
        );
        assert_eq!(slot.swatch(), Some(AverageColor::new(255, 0, 51, 255)));
        assert!(slot.take_alert().is_none());
    }

    #[test]
    fn empty_results_are_nothing_recognized() {
        let mut slot = DisplaySlot::new(&settings());
        let token = RequestToken::INITIAL.next();
        let photo = Uuid::new_v4();
        slot.begin(token, photo);
        slot.apply(completion(
            token,
            photo,
            Ok(analysis(&[], AverageColor::new(1, 2, 3, 4))),
        ));
        assert_eq!(slot.text(), "Nothing recognized.");
    }

    #[test]
    fn errors_are_described() {
        let mut slot = DisplaySlot::new(&settings());
        let token = RequestToken::INITIAL.next();
        let photo = Uuid::new_v4();
        slot.begin(token, photo);
        slot.apply(completion(
            token,
            photo,
            Err(AppError::Inference("model unavailable".to_string())),
        ));
        assert_eq!(
            slot.text(),
            "Unable to classify image.\nInference failed: model unavailable"
        );
        assert!(slot.swatch().is_none());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut slot = DisplaySlot::new(&settings());
        let first = RequestToken::INITIAL.next();
        let second = first.next();
        let (photo_a, photo_b) = (Uuid::new_v4(), Uuid::new_v4());
        slot.begin(first, photo_a);
        slot.begin(second, photo_b);

        let late_a = analysis(&[("from a", 0.9)], AverageColor::new(255, 0, 0, 255));
        assert!(!slot.apply(completion(first, photo_a, Ok(late_a))));
        assert!(slot.is_pending());

        let b = analysis(&[("from b", 0.8)], AverageColor::new(0, 0, 255, 255));
        assert!(slot.apply(completion(second, photo_b, Ok(b))));

        // A arriving after B must not overwrite anything either
        let later_a = analysis(&[("from a", 0.9)], AverageColor::new(255, 0, 0, 255));
        assert!(!slot.apply(completion(first, photo_a, Ok(later_a))));

        let report = slot.report();
        assert_eq!(report.token, second);
        assert_eq!(report.color, Some(AverageColor::new(0, 0, 255, 255)));
        assert_eq!(report.classifications[0].label, "from b");
    }

    #[test]
    fn duplicate_completion_is_applied_once() {
        let mut slot = DisplaySlot::new(&settings());
        let token = RequestToken::INITIAL.next();
        let photo = Uuid::new_v4();
        slot.begin(token, photo);
        let result = analysis(&[("x", 0.1)], AverageColor::new(0, 0, 0, 0));
        assert!(slot.apply(completion(token, photo, Ok(result.clone()))));
        assert!(!slot.apply(completion(token, photo, Ok(result))));
    }

    #[test]
    fn target_label_raises_alert_once() {
        let mut slot = DisplaySlot::new(&settings());
        let token = RequestToken::INITIAL.next();
        let photo = Uuid::new_v4();
        slot.begin(token, photo);
        let result = analysis(
            &[("football helmet", 0.6), ("crash helmet", 0.35)],
            AverageColor::new(9, 9, 9, 255),
        );
        slot.apply(completion(token, photo, Ok(result)));
        assert!(slot.report().target_found);
        assert_eq!(slot.take_alert(), Some(Alert::target_found()));
        assert!(slot.take_alert().is_none());
    }

    #[test]
    fn target_outside_top_n_is_ignored() {
        let mut slot = DisplaySlot::new(&settings());
        let token = RequestToken::INITIAL.next();
        let photo = Uuid::new_v4();
        slot.begin(token, photo);
        let result = analysis(
            &[("a", 0.5), ("b", 0.3), ("crash helmet", 0.2)],
            AverageColor::new(9, 9, 9, 255),
        );
        slot.apply(completion(token, photo, Ok(result)));
        assert!(slot.take_alert().is_none());
    }
}
