use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, error, info};

use crate::app::display::Alert;
use crate::app::session::ClassificationSession;
use crate::app::views::result_view::{PhotoTexture, ResultView};
use crate::app::views::View;
use crate::common::Photo;
use crate::config::Settings;
use crate::error::AppError;
use crate::intake::photo::{PhotoPicker, SourceKind};
use crate::pipeline::services::Classifier;

const TITLE: &str = "Photo Classifier";

type PickResult = Result<Option<Photo>, AppError>;

pub struct ClassifierApp {
    session: ClassificationSession,
    picker: PhotoPicker,
    runtime: Handle,
    library_path: String,
    pick_tx: mpsc::Sender<PickResult>,
    pick_rx: mpsc::Receiver<PickResult>,
    texture: PhotoTexture,
    alert: Option<Alert>,
    errors: Vec<AppError>,
}

impl ClassifierApp {
    pub fn new(
        session: ClassificationSession,
        picker: PhotoPicker,
        runtime: Handle,
        settings: &Settings,
    ) -> Self {
        let (pick_tx, pick_rx) = mpsc::channel(settings.channels.update_buffer_size);
        Self {
            session,
            picker,
            runtime,
            library_path: String::new(),
            pick_tx,
            pick_rx,
            texture: PhotoTexture::default(),
            alert: None,
            errors: Vec::new(),
        }
    }

    pub fn start_gui(settings: &Settings, classifier: Arc<dyn Classifier>) -> Result<(), AppError> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(egui::vec2(720.0, 800.0))
                .with_title(TITLE),
            ..Default::default()
        };

        let runtime = Handle::try_current()
            .map_err(|e| AppError::Ui(format!("no async runtime available: {e}")))?;
        let session = ClassificationSession::new(classifier, settings)?;
        let app = ClassifierApp::new(session, PhotoPicker::new(), runtime, settings);

        eframe::run_native(TITLE, options, Box::new(move |_cc| Ok(Box::new(app))))
            .map_err(|e| AppError::Ui(e.to_string()))
    }

    fn request_photo(&self, kind: SourceKind) {
        let selection = Some(PathBuf::from(self.library_path.trim()));
        let picker = self.picker.clone();
        let pick_tx = self.pick_tx.clone();
        self.runtime.spawn(async move {
            let result = picker.pick(kind, selection).await;
            if pick_tx.send(result).await.is_err() {
                debug!("Photo picked after the window closed");
            }
        });
    }

    fn poll_picks(&mut self) {
        loop {
            match self.pick_rx.try_recv() {
                Ok(Ok(Some(photo))) => {
                    self.alert = None;
                    self.session.submit(photo);
                }
                Ok(Ok(None)) => info!("No photo chosen"),
                Ok(Err(e)) => {
                    error!("Unable to load photo: {}", e);
                    self.errors.push(e);
                }
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    error!("Photo picker channel disconnected");
                    return;
                }
            }
        }
    }

    fn draw_alert(&mut self, ctx: &egui::Context) {
        let Some(alert) = &self.alert else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new(alert.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(alert.message.as_str());
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.alert = None;
        }
    }
}

impl eframe::App for ClassifierApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_picks();
        if self.session.poll_completions() {
            if let Some(alert) = self.session.slot_mut().take_alert() {
                self.alert = Some(alert);
            }
        }

        egui::TopBottomPanel::top("photo_picker").show(ctx, |ui| {
            ui.heading(TITLE);
            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Photo file:");
                ui.text_edit_singleline(&mut self.library_path);
            });
            ui.horizontal(|ui| {
                let take_photo = ui.button("Take Photo");
                let take_photo = if self.picker.camera_available() {
                    take_photo
                } else {
                    take_photo.on_hover_text("No camera found, the photo file is used instead")
                };
                if take_photo.clicked() {
                    self.request_photo(SourceKind::Camera);
                }
                if ui.button("Choose Photo").clicked() {
                    self.request_photo(SourceKind::Library);
                }
            });
        });

        egui::TopBottomPanel::bottom("error_panel")
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("Error Log");
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for error in self.errors.iter().rev() {
                        ui.label(format!("[ERROR] {}", error));
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let mut view =
                ResultView::new(self.session.photo(), self.session.slot(), &mut self.texture);
            view.draw(ui);
        });

        self.draw_alert(ctx);
        ctx.request_repaint();
    }
}
