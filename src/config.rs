use crate::utils::error::RecognitionError;
use crate::Result;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 模型输入边长（MobileNetV2）
pub const INPUT_SIZE: u32 = 224;

/// 默认返回的预测数量
pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    /// 待分析图像目录
    pub images_dir: PathBuf,

    /// 模型文件目录
    pub models_dir: PathBuf,

    /// 每张图像返回的预测数量
    pub top_k: usize,

    /// ONNX Runtime配置
    pub onnx_config: OnnxConfig,

    /// 预处理配置
    pub preprocess: PreprocessConfig,
}

#[derive(Debug, Clone)]
pub struct OnnxConfig {
    /// CPU线程数
    pub intra_threads: usize,

    /// 优化级别 (0-3)
    pub optimization_level: u8,
}

#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// (宽, 高)
    pub input_size: (u32, u32),
    pub layout: TensorLayout,
    pub normalization: Normalization,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            input_size: (INPUT_SIZE, INPUT_SIZE),
            layout: TensorLayout::Nhwc,
            normalization: Normalization::Tf,
        }
    }
}

/// 输入张量的维度顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// (1, H, W, 3)，Keras 导出的模型
    Nhwc,
    /// (1, 3, H, W)，PyTorch 导出的模型
    Nchw,
}

impl FromStr for TensorLayout {
    type Err = RecognitionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nhwc" => Ok(TensorLayout::Nhwc),
            "nchw" => Ok(TensorLayout::Nchw),
            other => Err(RecognitionError::Config(format!(
                "Unknown tensor layout '{}', expected 'nhwc' or 'nchw'",
                other
            ))),
        }
    }
}

/// 像素值归一化方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// x / 127.5 - 1，范围 [-1, 1]
    Tf,
    /// x / 255 后按 ImageNet 均值方差标准化
    Torch,
}

impl Config {
    pub fn new(
        images_dir: Option<PathBuf>,
        models_dir: impl Into<PathBuf>,
        top_k: usize,
        threads: Option<usize>,
        layout: TensorLayout,
    ) -> Result<Self> {
        if top_k == 0 {
            return Err(RecognitionError::Config(
                "top_k must be at least 1".to_string(),
            ));
        }

        let cpu_cores = num_cpus::get();
        let onnx_config = OnnxConfig {
            intra_threads: threads.unwrap_or((cpu_cores * 3 / 4).max(1)), // 使用75%的CPU核心
            optimization_level: 3,
        };

        let preprocess = PreprocessConfig {
            layout,
            normalization: match layout {
                TensorLayout::Nhwc => Normalization::Tf,
                TensorLayout::Nchw => Normalization::Torch,
            },
            ..PreprocessConfig::default()
        };

        Ok(Self {
            images_dir: images_dir.unwrap_or_else(default_images_dir),
            models_dir: models_dir.into(),
            top_k,
            onnx_config,
            preprocess,
        })
    }

    /// 获取分类模型路径
    pub fn model_path(&self) -> PathBuf {
        self.models_dir.join("mobilenetv2/mobilenetv2.onnx")
    }

    /// 获取类别索引文件路径
    pub fn labels_path(&self) -> PathBuf {
        self.models_dir.join("mobilenetv2/imagenet_class_index.json")
    }
}

/// 可执行文件旁的 `images` 目录，不存在时退回到当前目录下的 `images`
pub fn default_images_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .map(|dir| dir.join("images"))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("images"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_top_k() {
        let err = Config::new(None, "models", 0, None, TensorLayout::Nhwc).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn model_paths_live_under_models_dir() {
        let config = Config::new(
            Some(PathBuf::from("pics")),
            "/opt/models",
            3,
            Some(2),
            TensorLayout::Nhwc,
        )
        .unwrap();

        assert_eq!(config.images_dir, PathBuf::from("pics"));
        assert_eq!(config.onnx_config.intra_threads, 2);
        assert!(config.model_path().starts_with("/opt/models"));
        assert!(config.labels_path().ends_with("imagenet_class_index.json"));
    }

    #[test]
    fn layout_selects_normalization() {
        let nchw = Config::new(None, "models", 5, None, TensorLayout::Nchw).unwrap();
        assert_eq!(nchw.preprocess.normalization, Normalization::Torch);

        let nhwc = Config::new(None, "models", 5, None, TensorLayout::Nhwc).unwrap();
        assert_eq!(nhwc.preprocess.normalization, Normalization::Tf);
        assert_eq!(nhwc.preprocess.input_size, (224, 224));
    }

    #[test]
    fn parses_layout_case_insensitively() {
        assert_eq!("NCHW".parse::<TensorLayout>().unwrap(), TensorLayout::Nchw);
        assert!("hwc".parse::<TensorLayout>().is_err());
    }
}
