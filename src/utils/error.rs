use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Could not load image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Vocabulary error: {0}")]
    Vocabulary(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ORT error: {0}")]
    Ort(#[from] ort::Error),
}

impl RecognitionError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RecognitionError::ModelLoad(_) => "MODEL_LOAD_ERROR",
            RecognitionError::ImageLoad { .. } => "IMAGE_LOAD_ERROR",
            RecognitionError::ImageProcessing(_) => "IMAGE_PROCESSING_ERROR",
            RecognitionError::Inference(_) => "INFERENCE_ERROR",
            RecognitionError::Vocabulary(_) => "VOCABULARY_ERROR",
            RecognitionError::InvalidInput(_) => "INVALID_INPUT",
            RecognitionError::Config(_) => "CONFIG_ERROR",
            RecognitionError::Io(_) => "IO_ERROR",
            RecognitionError::Json(_) => "JSON_ERROR",
            RecognitionError::Ort(_) => "ORT_ERROR",
        }
    }

    /// 是否只影响单张图像（批处理可以继续）
    pub fn is_per_image(&self) -> bool {
        matches!(
            self,
            RecognitionError::ImageLoad { .. }
                | RecognitionError::ImageProcessing(_)
        )
    }
}
