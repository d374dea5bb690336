mod average_color;
mod classification;
mod completion;
mod request_token;

pub use average_color::AverageColor;
pub use classification::{Classification, Classifications};
pub use completion::{Completion, PhotoAnalysis};
pub use request_token::RequestToken;
