// Domain types and value objects
pub mod degree;
pub mod series;
pub mod swing_point;

// Re-export commonly used types
pub use degree::{Sensitivity, WaveDegree};
pub use series::PriceSeries;
pub use swing_point::{SwingKind, SwingPoint};
