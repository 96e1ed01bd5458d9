pub mod recognizer;
pub mod report;
pub mod types;

pub use recognizer::Recognizer;
pub use report::ConsoleReporter;
pub use types::{ConfidenceTier, ImageAnalysis, Prediction};
