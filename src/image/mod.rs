pub mod loader;
pub mod preprocessing;

pub use loader::{ImageLoader, SUPPORTED_EXTENSIONS};
pub use preprocessing::ImagePreprocessor;
