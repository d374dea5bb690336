use std::sync::Arc;

use photo_classifier::app::headless::{self, Invocation};
use photo_classifier::app::ClassifierApp;
use photo_classifier::{AppError, Classifier, OnnxClassifier, Settings};
use tracing::{info, Level};

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let settings = Settings::load()?;
    init_logging(settings.log_level());

    let classifier = OnnxClassifier::load(&settings.classifier)?;
    info!("Loaded classifier {}", classifier.name());
    let classifier: Arc<dyn Classifier> = Arc::new(classifier);

    let invocation = Invocation::parse(std::env::args().skip(1));
    if invocation.is_headless() {
        let mut stdout = std::io::stdout();
        headless::run(&mut stdout, &invocation, &settings, classifier).await
    } else {
        ClassifierApp::start_gui(&settings, classifier)
    }
}
