pub mod orientation;
pub mod photo;

pub use orientation::Orientation;
pub use photo::{Photo, PhotoOrigin};
