use std::io::Cursor;

use image::DynamicImage;
use serde::Serialize;

/// EXIF orientation (tag 0x0112) describing how the stored pixels must be
/// transformed to appear upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Orientation {
    #[default]
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    LeftMirrored,
    Right,
    RightMirrored,
    Left,
}

impl Orientation {
    /// Values outside 1..=8 are treated as `Up`.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Orientation::UpMirrored,
            3 => Orientation::Down,
            4 => Orientation::DownMirrored,
            5 => Orientation::LeftMirrored,
            6 => Orientation::Right,
            7 => Orientation::RightMirrored,
            8 => Orientation::Left,
            _ => Orientation::Up,
        }
    }

    /// Reads the orientation tag from encoded image bytes. Missing or
    /// unreadable EXIF data yields `Up`.
    pub fn read_from(bytes: &[u8]) -> Self {
        let mut cursor = Cursor::new(bytes);
        let value = exif::Reader::new()
            .read_from_container(&mut cursor)
            .ok()
            .and_then(|exif| {
                exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
                    .and_then(|field| field.value.get_uint(0))
            })
            .unwrap_or(1);
        Self::from_exif(value)
    }

    pub fn apply(self, image: &DynamicImage) -> DynamicImage {
        match self {
            Orientation::Up => image.clone(),
            Orientation::UpMirrored => image.fliph(),
            Orientation::Down => image.rotate180(),
            Orientation::DownMirrored => image.flipv(),
            Orientation::LeftMirrored => image.rotate90().fliph(),
            Orientation::Right => image.rotate90(),
            Orientation::RightMirrored => image.rotate270().fliph(),
            Orientation::Left => image.rotate270(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn marked_image() -> DynamicImage {
        // 3x2 with a single red pixel in the top-left corner
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(3, 2, |x, y| {
            if x == 0 && y == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 0])
            }
        }))
    }

    #[test]
    fn exif_values_map_to_orientations() {
        assert_eq!(Orientation::from_exif(1), Orientation::Up);
        assert_eq!(Orientation::from_exif(3), Orientation::Down);
        assert_eq!(Orientation::from_exif(6), Orientation::Right);
        assert_eq!(Orientation::from_exif(8), Orientation::Left);
        assert_eq!(Orientation::from_exif(0), Orientation::Up);
        assert_eq!(Orientation::from_exif(42), Orientation::Up);
    }

    #[test]
    fn bytes_without_exif_are_upright() {
        assert_eq!(Orientation::read_from(b"not an image"), Orientation::Up);
    }

    #[test]
    fn right_rotates_clockwise() {
        let rotated = Orientation::Right.apply(&marked_image()).to_rgb8();
        assert_eq!(rotated.dimensions(), (2, 3));
        // top-left moves to top-right after a clockwise quarter turn
        assert_eq!(rotated.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn down_keeps_dimensions() {
        let rotated = Orientation::Down.apply(&marked_image()).to_rgb8();
        assert_eq!(rotated.dimensions(), (3, 2));
        assert_eq!(rotated.get_pixel(2, 1), &Rgb([255, 0, 0]));
    }
}
