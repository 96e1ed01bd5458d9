pub mod config;
pub mod image;
pub mod models;
pub mod recognition;
pub mod utils;

// 重新导出主要类型
pub use config::Config;
pub use recognition::{ConsoleReporter, ImageAnalysis, Prediction, Recognizer};
pub use utils::error::RecognitionError;

pub type Result<T> = std::result::Result<T, RecognitionError>;
