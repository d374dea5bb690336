pub mod average_color_service;

pub use average_color_service::{average_color, AverageColorService};
