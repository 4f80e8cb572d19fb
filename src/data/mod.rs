// Series loading and demo data
pub mod series_file;
pub mod synthetic;

// Re-export commonly used types
pub use series_file::{SeriesFile, load_series_file, save_series_file};
pub use synthetic::synthetic_impulse_series;
