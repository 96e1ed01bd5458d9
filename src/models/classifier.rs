use crate::utils::error::RecognitionError;
use crate::{Config, Result};
use ndarray::{Array4, ArrayD};
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use parking_lot::Mutex;
use std::path::Path;

/// 图像分类模型：输入一个batch为1的张量，输出每个类别的分数
pub trait ClassificationModel {
    fn name(&self) -> &str;

    fn infer(&self, input: Array4<f32>) -> Result<Vec<f32>>;
}

/// 基于ONNX Runtime的分类模型
pub struct OnnxClassifier {
    session: Mutex<Session>,
    name: String,
    input_name: String,  // 动态发现的输入名称
    output_name: String, // 动态发现的输出名称
}

impl OnnxClassifier {
    pub fn new(config: &Config) -> Result<Self> {
        let model_path = config.model_path();

        if !model_path.exists() {
            return Err(RecognitionError::ModelLoad(format!(
                "Classification model not found: {}",
                model_path.display()
            )));
        }

        tracing::info!("Loading classification model from: {}", model_path.display());

        let session = Session::builder()?
            .with_optimization_level(optimization_level(config.onnx_config.optimization_level))?
            .with_intra_threads(config.onnx_config.intra_threads)?
            .commit_from_file(&model_path)
            .map_err(|e| {
                RecognitionError::ModelLoad(format!(
                    "Failed to load {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        Self::from_session(session, &model_path)
    }

    fn from_session(session: Session, model_path: &Path) -> Result<Self> {
        let input_name = match session.inputs.first() {
            Some(input) => input.name.clone(),
            None => {
                return Err(RecognitionError::ModelLoad(
                    "Classification model has no inputs".to_string(),
                ))
            }
        };

        let output_name = match session.outputs.first() {
            Some(output) => output.name.clone(),
            None => {
                return Err(RecognitionError::ModelLoad(
                    "Classification model has no outputs".to_string(),
                ))
            }
        };

        tracing::info!(
            "Classification model input: '{}', output: '{}'",
            input_name,
            output_name
        );
        for (i, output) in session.outputs.iter().enumerate() {
            tracing::debug!("Classification output[{}]: '{}'", i, output.name);
        }

        let name = model_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx".to_string());

        Ok(Self {
            session: Mutex::new(session),
            name,
            input_name,
            output_name,
        })
    }
}

impl ClassificationModel for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn infer(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        tracing::debug!("Running inference on tensor with shape {:?}", input.shape());

        let input_tensor = Tensor::from_array(input)?;
        let predictions = {
            let mut session = self.session.lock();
            let outputs = session.run(inputs![self.input_name.as_str() => input_tensor])?;

            match outputs.get(&self.output_name) {
                Some(output) => output.try_extract_array::<f32>()?.into_owned(),
                None => {
                    let available_outputs: Vec<String> =
                        outputs.keys().map(|s| s.to_string()).collect();
                    return Err(RecognitionError::Inference(format!(
                        "Output '{}' not found. Available outputs: {:?}",
                        self.output_name, available_outputs
                    )));
                }
            }
        };

        first_row(predictions)
    }
}

fn optimization_level(level: u8) -> GraphOptimizationLevel {
    match level {
        0 => GraphOptimizationLevel::Disable,
        1 => GraphOptimizationLevel::Level1,
        2 => GraphOptimizationLevel::Level2,
        _ => GraphOptimizationLevel::Level3,
    }
}

/// 取出batch中唯一一行的类别分数
fn first_row(predictions: ArrayD<f32>) -> Result<Vec<f32>> {
    let shape = predictions.shape().to_vec();
    match shape.as_slice() {
        [_] | [1, ..] => Ok(predictions.into_iter().collect()),
        _ => Err(RecognitionError::Inference(format!(
            "Expected batch size 1 classification output, got shape {:?}",
            shape
        ))),
    }
}
