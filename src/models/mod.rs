pub mod classifier;
pub mod vocabulary;

pub use classifier::{ClassificationModel, OnnxClassifier};
pub use vocabulary::Vocabulary;
