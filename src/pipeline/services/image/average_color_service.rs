use image::{DynamicImage, ImageBuffer, Pixel, Primitive};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::Service;
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::pipeline::types::AverageColor;

/// Reduces the whole image to a single pixel holding the per-channel mean.
///
/// Every channel, alpha included, is averaged independently and rounded half
/// up to a byte. Channels wider than 8 bits are rescaled to `0..=255` with the
/// same rounding. Gray images contribute their luma to red, green and blue.
pub fn average_color(image: &DynamicImage) -> Result<AverageColor, AppError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(AppError::InvalidImage(format!(
            "image has zero area ({width}x{height})"
        )));
    }
    let count = u64::from(width) * u64::from(height);

    match image {
        DynamicImage::ImageLuma8(buffer) => integer_mean(buffer, count),
        DynamicImage::ImageLumaA8(buffer) => integer_mean(buffer, count),
        DynamicImage::ImageRgb8(buffer) => integer_mean(buffer, count),
        DynamicImage::ImageRgba8(buffer) => integer_mean(buffer, count),
        DynamicImage::ImageLuma16(buffer) => integer_mean(buffer, count),
        DynamicImage::ImageLumaA16(buffer) => integer_mean(buffer, count),
        DynamicImage::ImageRgb16(buffer) => integer_mean(buffer, count),
        DynamicImage::ImageRgba16(buffer) => integer_mean(buffer, count),
        DynamicImage::ImageRgb32F(buffer) => float_mean(buffer, count),
        DynamicImage::ImageRgba32F(buffer) => float_mean(buffer, count),
        other => Err(AppError::Compute(format!(
            "unsupported pixel format {:?}",
            other.color()
        ))),
    }
}

fn integer_mean<P>(
    buffer: &ImageBuffer<P, Vec<P::Subpixel>>,
    count: u64,
) -> Result<AverageColor, AppError>
where
    P: Pixel,
    P::Subpixel: Into<u64>,
{
    let mut sums = [0u64; 4];
    for pixel in buffer.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.to_rgba().0) {
            *sum = sum
                .checked_add(channel.into())
                .ok_or_else(|| AppError::Compute("channel sum overflowed".to_string()))?;
        }
    }

    let max: u64 = <P::Subpixel as Primitive>::DEFAULT_MAX_VALUE.into();
    let [red, green, blue, alpha] = sums.map(|sum| round_to_byte(sum, count, max));
    Ok(AverageColor::new(red, green, blue, alpha))
}

/// `floor(sum * 255 / (count * max) + 1/2)` without leaving integers.
fn round_to_byte(sum: u64, count: u64, max: u64) -> u8 {
    let numerator = u128::from(sum) * 255;
    let denominator = u128::from(count) * u128::from(max);
    // sum <= count * max, so the quotient never exceeds 255
    ((numerator + denominator / 2) / denominator) as u8
}

fn float_mean<P>(
    buffer: &ImageBuffer<P, Vec<f32>>,
    count: u64,
) -> Result<AverageColor, AppError>
where
    P: Pixel<Subpixel = f32>,
{
    let mut sums = [0f64; 4];
    for pixel in buffer.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.to_rgba().0) {
            if !channel.is_finite() {
                return Err(AppError::Compute("non-finite channel value".to_string()));
            }
            *sum += f64::from(channel);
        }
    }

    let [red, green, blue, alpha] =
        sums.map(|sum| ((sum / count as f64).clamp(0.0, 1.0) * 255.0).round() as u8);
    Ok(AverageColor::new(red, green, blue, alpha))
}

pub struct AverageColorService;

impl AverageColorService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AverageColorService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Arc<DynamicImage>> for AverageColorService {
    type Response = AverageColor;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AppError>> {
        Poll::Ready(Ok(()))
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn call(&mut self, image: Arc<DynamicImage>) -> Self::Future {
        Box::pin(async move {
            let color = tokio::task::spawn_blocking(move || average_color(&image))
                .await
                .map_err(|e| {
                    if e.is_cancelled() {
                        AppError::Cancelled
                    } else {
                        AppError::Compute(e.to_string())
                    }
                })??;
            debug!("Average color computed: {}", color.to_hex());
            Ok(color)
        })
    }
}
