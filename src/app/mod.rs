pub mod classifier_app;
pub mod display;
pub mod headless;
pub mod session;
pub mod views;

pub use classifier_app::ClassifierApp;
pub use display::{DisplaySlot, DisplayState, Report};
pub use session::ClassificationSession;
pub use views::result_view::ResultView;
