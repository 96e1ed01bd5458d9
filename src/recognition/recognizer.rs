use crate::image::{ImageLoader, ImagePreprocessor};
use crate::models::{ClassificationModel, OnnxClassifier, Vocabulary};
use crate::recognition::{ConsoleReporter, ImageAnalysis, Prediction};
use crate::{Config, Result};
use ndarray::Array4;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// 持有已加载的模型，提供单张与批量图像分析
pub struct Recognizer<M: ClassificationModel = OnnxClassifier> {
    model: M,
    vocabulary: Vocabulary,
    preprocessor: ImagePreprocessor,
}

impl Recognizer<OnnxClassifier> {
    /// 加载ONNX模型与类别表，任何失败都视为致命错误
    pub fn new(config: &Config) -> Result<Self> {
        let model = OnnxClassifier::new(config)?;
        let vocabulary = Vocabulary::from_path(&config.labels_path())?;
        let preprocessor = ImagePreprocessor::new(config.preprocess.clone());

        Ok(Self::with_model(model, vocabulary, preprocessor))
    }
}

impl<M: ClassificationModel> Recognizer<M> {
    pub fn with_model(model: M, vocabulary: Vocabulary, preprocessor: ImagePreprocessor) -> Self {
        tracing::info!(
            "Recognizer ready: model '{}', {} classes",
            model.name(),
            vocabulary.len()
        );
        Self {
            model,
            vocabulary,
            preprocessor,
        }
    }

    pub fn find_images(&self, folder: &Path) -> Vec<PathBuf> {
        ImageLoader::find_images(folder)
    }

    pub fn preprocess(&self, path: &Path) -> Result<Array4<f32>> {
        self.preprocessor.preprocess_path(path)
    }

    pub fn predict(&self, tensor: Array4<f32>, top_k: usize) -> Result<Vec<Prediction>> {
        let scores = self.model.infer(tensor)?;
        self.vocabulary.decode(&scores, top_k)
    }

    /// 分析单张图像。错误在此被吸收，转为不含预测的结果
    pub fn analyze_image(&self, path: &Path, top_k: usize) -> ImageAnalysis {
        let start = Instant::now();

        let result = self
            .preprocess(path)
            .and_then(|tensor| self.predict(tensor, top_k));

        match result {
            Ok(predictions) => {
                tracing::debug!(
                    "Analyzed {} in {:?}",
                    path.display(),
                    start.elapsed()
                );
                ImageAnalysis::success(path, predictions)
            }
            Err(e) => {
                let analysis = ImageAnalysis::failure(path, &e);
                // 失败已由报告输出，这里只留日志记录
                if e.is_per_image() {
                    tracing::info!(
                        code = e.error_code(),
                        "Error processing {}: {}",
                        analysis.image_name,
                        e
                    );
                } else {
                    tracing::warn!(
                        code = e.error_code(),
                        "Error processing {}: {}",
                        analysis.image_name,
                        e
                    );
                }
                analysis
            }
        }
    }

    /// 按路径顺序逐张分析并立即输出
    pub fn analyze_all_images<W: Write>(
        &self,
        folder: &Path,
        top_k: usize,
        reporter: &mut ConsoleReporter<W>,
    ) -> Result<()> {
        let images = self.find_images(folder);

        if images.is_empty() {
            tracing::info!("No images found in {}", folder.display());
            reporter.no_images()?;
            return Ok(());
        }

        reporter.found_images(images.len())?;

        let total = images.len();
        for (index, path) in images.iter().enumerate() {
            let analysis = self.analyze_image(path, top_k);
            reporter.image(index + 1, total, &analysis)?;
        }

        reporter.summary(total)?;
        Ok(())
    }
}
