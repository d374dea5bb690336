use egui::{Color32, TextureHandle, TextureOptions};
use uuid::Uuid;

use crate::app::display::DisplaySlot;
use crate::app::views::View;
use crate::common::Photo;

const PHOTO_MAX_SIZE: f32 = 480.0;
const SWATCH_SIZE: f32 = 48.0;

/// Texture of the photo currently on screen, rebuilt only when the photo
/// changes.
#[derive(Default)]
pub struct PhotoTexture {
    cached: Option<(Uuid, TextureHandle)>,
}

impl PhotoTexture {
    fn get(&mut self, ctx: &egui::Context, photo: &Photo) -> TextureHandle {
        if let Some((id, handle)) = &self.cached {
            if *id == photo.id() {
                return handle.clone();
            }
        }
        let image = photo.upright().to_rgba8();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [image.width() as usize, image.height() as usize],
            image.as_raw().as_slice(),
        );
        let handle = ctx.load_texture("photo", color_image, TextureOptions::LINEAR);
        self.cached = Some((photo.id(), handle.clone()));
        handle
    }
}

/// The photo, its average color and the classification text.
pub struct ResultView<'a> {
    photo: Option<&'a Photo>,
    slot: &'a DisplaySlot,
    texture: &'a mut PhotoTexture,
}

impl<'a> ResultView<'a> {
    pub fn new(
        photo: Option<&'a Photo>,
        slot: &'a DisplaySlot,
        texture: &'a mut PhotoTexture,
    ) -> Self {
        Self {
            photo,
            slot,
            texture,
        }
    }

    fn draw_photo(&mut self, ui: &mut egui::Ui, photo: &Photo) {
        ui.group(|ui| {
            let texture = self.texture.get(ui.ctx(), photo);
            ui.add(
                egui::Image::new(&texture)
                    .max_size(egui::vec2(PHOTO_MAX_SIZE, PHOTO_MAX_SIZE))
                    .maintain_aspect_ratio(true),
            );
            ui.small(format!(
                "{} ({})",
                photo.describe(),
                photo.acquired_at().format("%Y-%m-%d %H:%M:%S")
            ));
        });
    }

    fn draw_result(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(
                egui::vec2(SWATCH_SIZE, SWATCH_SIZE),
                egui::Sense::hover(),
            );
            match self.slot.swatch() {
                Some(color) => {
                    let [r, g, b, a] = color.bytes();
                    ui.painter()
                        .rect_filled(rect, 4.0, Color32::from_rgba_unmultiplied(r, g, b, a));
                }
                None => {
                    ui.painter().rect_filled(rect, 4.0, Color32::TRANSPARENT);
                }
            }
            ui.label(egui::RichText::new(self.slot.text()).monospace());
        });
    }
}

impl View for ResultView<'_> {
    fn draw(&mut self, ui: &mut egui::Ui) {
        match self.photo {
            Some(photo) => {
                self.draw_photo(ui, photo);
                ui.separator();
                self.draw_result(ui);
            }
            None => {
                ui.heading("No photo selected");
            }
        }
    }
}
