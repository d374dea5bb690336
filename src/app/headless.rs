use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::session::ClassificationSession;
use crate::config::Settings;
use crate::error::AppError;
use crate::intake::photo::{LibrarySource, PhotoSource};
use crate::pipeline::services::Classifier;

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Invocation {
    pub paths: Vec<PathBuf>,
    pub json: bool,
}

impl Invocation {
    pub fn parse<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut invocation = Self::default();
        for arg in args {
            match arg.as_str() {
                "--json" => invocation.json = true,
                _ => invocation.paths.push(PathBuf::from(arg)),
            }
        }
        invocation
    }

    pub fn is_headless(&self) -> bool {
        !self.paths.is_empty()
    }
}

/// Classifies each path in turn and writes one report per photo. A photo
/// that cannot be read is reported and the rest still run.
pub async fn run<W: Write>(
    out: &mut W,
    invocation: &Invocation,
    settings: &Settings,
    classifier: Arc<dyn Classifier>,
) -> Result<(), AppError> {
    let mut session = ClassificationSession::new(classifier, settings)?;

    for path in &invocation.paths {
        let photo = match LibrarySource::new(Some(path.clone())).acquire().await {
            Ok(Some(photo)) => photo,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                writeln!(out, "{}: Unable to classify image.\n{}", path.display(), e)?;
                continue;
            }
        };

        session.submit(photo);
        session.settle().await?;

        let alert = session.slot_mut().take_alert();
        if invocation.json {
            let report = session.slot().report();
            let line = serde_json::to_string(&report)
                .map_err(|e| AppError::Ui(format!("unable to encode report: {e}")))?;
            writeln!(out, "{line}")?;
        } else {
            writeln!(out, "{}:\n{}", path.display(), session.slot().text())?;
            if let Some(alert) = alert {
                writeln!(out, "{} {}", alert.title, alert.message)?;
            }
        }
    }
    info!("Classified {} photo(s)", invocation.paths.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::services::classifier::fake::FakeClassifier;
    use crate::pipeline::types::Classification;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::path::Path;

    fn write_png(dir: &Path, name: &str, pixel: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        DynamicImage::ImageRgba8(ImageBuffer::from_pixel(4, 4, Rgba(pixel)))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("{name}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parse_splits_paths_and_flags() {
        let invocation = Invocation::parse(
            ["cat.png", "--json", "dog.jpg"].into_iter().map(String::from),
        );
        assert!(invocation.json);
        assert!(invocation.is_headless());
        assert_eq!(
            invocation.paths,
            vec![PathBuf::from("cat.png"), PathBuf::from("dog.jpg")]
        );
        assert!(!Invocation::parse(Vec::new()).is_headless());
    }

    #[tokio::test]
    async fn prints_text_report_and_alert() {
        let dir = scratch_dir("headless-text");
        let path = write_png(&dir, "helmet.png", [255, 0, 51, 255]);
        let classifier = FakeClassifier::returning(vec![
            Classification::new("crash helmet", 0.7),
            Classification::new("football helmet", 0.2),
        ]);
        let invocation = Invocation {
            paths: vec![path.clone()],
            json: false,
        };

        let mut out = Vec::new();
        run(&mut out, &invocation, &Settings::default(), Arc::new(classifier))
            .await
            .unwrap();

        let expected = format!(
            "{}:\nColor: (1.00, 0.00, 0.20, 1.00)\nClassification:\n  (0.70) crash helmet\n  (0.20) football helmet\nWOW Congrats You searched it..\n",
            path.display()
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn json_report_per_photo() {
        let dir = scratch_dir("headless-json");
        let first = write_png(&dir, "a.png", [0, 0, 0, 255]);
        let second = write_png(&dir, "b.png", [255, 255, 255, 255]);
        let classifier = FakeClassifier::returning(vec![Classification::new("tabby", 0.9)]);
        let invocation = Invocation {
            paths: vec![first, second],
            json: true,
        };

        let mut out = Vec::new();
        run(&mut out, &invocation, &Settings::default(), Arc::new(classifier))
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let reports: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["color"]["red"], 0);
        assert_eq!(reports[1]["color"]["red"], 255);
        assert_eq!(reports[1]["classifications"][0]["label"], "tabby");
        assert_eq!(reports[1]["target_found"], false);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn unreadable_file_is_reported_and_skipped() {
        let dir = scratch_dir("headless-missing");
        let good = write_png(&dir, "good.png", [10, 10, 10, 255]);
        let missing = dir.join("missing.png");
        let invocation = Invocation {
            paths: vec![missing.clone(), good],
            json: false,
        };

        let mut out = Vec::new();
        run(
            &mut out,
            &invocation,
            &Settings::default(),
            Arc::new(FakeClassifier::returning(vec![])),
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(&format!("{}: Unable to classify image.", missing.display())));
        assert!(text.ends_with("Nothing recognized.\n"));
        std::fs::remove_dir_all(dir).unwrap();
    }
}
