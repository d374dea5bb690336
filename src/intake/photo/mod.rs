pub mod library_source;
pub mod photo_source;
pub mod picker;

pub use library_source::LibrarySource;
pub use photo_source::{decode_photo, PhotoSource, SourceKind};
pub use picker::PhotoPicker;
