use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, info};
use tract_onnx::prelude::*;

use crate::common::Orientation;
use crate::config::ClassifierSettings;
use crate::error::AppError;
use crate::pipeline::services::classifier::Classifier;
use crate::pipeline::types::{Classification, Classifications};

type ModelRunner = dyn Fn(Tensor) -> TractResult<TVec<TValue>> + Send + Sync;

/// Runs an ONNX image classification model (NCHW float input, one score per
/// label) on the blocking thread pool.
pub struct OnnxClassifier {
    runner: Arc<ModelRunner>,
    labels: Arc<Vec<String>>,
    preprocessing: Preprocessing,
    apply_softmax: bool,
}

#[derive(Debug, Clone, Copy)]
struct Preprocessing {
    input_size: u32,
    mean: [f32; 3],
    std: [f32; 3],
}

impl OnnxClassifier {
    pub fn load(settings: &ClassifierSettings) -> Result<Self, AppError> {
        let labels = std::fs::read_to_string(&settings.labels_path).map_err(|e| {
            AppError::Model(format!(
                "cannot read labels {}: {e}",
                settings.labels_path.display()
            ))
        })?;
        let labels = parse_labels(&labels);
        if labels.is_empty() {
            return Err(AppError::Model(format!(
                "labels file {} is empty",
                settings.labels_path.display()
            )));
        }

        let runner = load_runner(&settings.model_path, settings.input_size)?;
        info!(
            "Loaded model {} with {} labels",
            settings.model_path.display(),
            labels.len()
        );

        Ok(Self {
            runner,
            labels: Arc::new(labels),
            preprocessing: Preprocessing {
                input_size: settings.input_size,
                mean: settings.mean,
                std: settings.std,
            },
            apply_softmax: settings.apply_softmax,
        })
    }
}

fn load_runner(model_path: &Path, input_size: u32) -> Result<Arc<ModelRunner>, AppError> {
    let size = input_size as usize;
    let plan = tract_onnx::onnx()
        .model_for_path(model_path)
        .and_then(|model| model.with_input_fact(0, f32::fact([1, 3, size, size]).into()))
        .and_then(|model| model.into_optimized())
        .and_then(|model| model.into_runnable())
        .map_err(|e| AppError::Model(format!("{}: {e}", model_path.display())))?;
    Ok(Arc::new(move |input: Tensor| plan.run(tvec!(input.into()))))
}

/// One label per line; blank lines are ignored.
pub fn parse_labels(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Uprights the image, crops the centered square, scales it to the model
/// input and normalizes each channel as `(v / 255 - mean) / std`.
fn prepare_input(
    image: &DynamicImage,
    orientation: Orientation,
    preprocessing: Preprocessing,
) -> Result<Tensor, AppError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(AppError::InvalidImage("image has zero area".to_string()));
    }
    let upright = orientation.apply(image);
    let (width, height) = (upright.width(), upright.height());
    let side = width.min(height);
    let cropped = upright.crop_imm((width - side) / 2, (height - side) / 2, side, side);

    let size = preprocessing.input_size;
    let rgb = cropped.resize_exact(size, size, FilterType::Triangle).to_rgb8();
    let Preprocessing { mean, std, .. } = preprocessing;

    let input = tract_ndarray::Array4::from_shape_fn(
        (1, 3, size as usize, size as usize),
        |(_, c, y, x)| {
            let value = rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
            (value - mean[c]) / std[c]
        },
    );
    Ok(input.into())
}

/// Pairs scores with labels and ranks them.
fn rank(
    scores: &[f32],
    labels: &[String],
    apply_softmax: bool,
) -> Result<Classifications, AppError> {
    if scores.len() != labels.len() {
        return Err(AppError::Inference(format!(
            "model produced {} scores for {} labels",
            scores.len(),
            labels.len()
        )));
    }

    let probabilities = if apply_softmax {
        softmax(scores)
    } else {
        scores.to_vec()
    };

    Ok(Classifications::ranked(
        labels
            .iter()
            .zip(probabilities)
            .map(|(label, confidence)| Classification::new(label.clone(), confidence))
            .collect(),
    ))
}

fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

#[async_trait]
impl Classifier for OnnxClassifier {
    async fn classify(
        &self,
        image: Arc<DynamicImage>,
        orientation: Orientation,
    ) -> Result<Classifications, AppError> {
        let runner = self.runner.clone();
        let labels = self.labels.clone();
        let preprocessing = self.preprocessing;
        let apply_softmax = self.apply_softmax;

        tokio::task::spawn_blocking(move || {
            let input = prepare_input(&image, orientation, preprocessing)?;
            let outputs = runner(input).map_err(|e| AppError::Inference(e.to_string()))?;
            let output = outputs
                .first()
                .ok_or_else(|| AppError::Inference("model produced no outputs".to_string()))?;
            let scores: Vec<f32> = output
                .to_array_view::<f32>()
                .map_err(|e| AppError::Inference(e.to_string()))?
                .iter()
                .copied()
                .collect();
            debug!("Model produced {} scores", scores.len());
            rank(&scores, &labels, apply_softmax)
        })
        .await
        .map_err(|e| AppError::Inference(e.to_string()))?
    }

    fn name(&self) -> &'static str {
        "OnnxClassifier"
    }
}
