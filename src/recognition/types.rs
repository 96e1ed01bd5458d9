use std::path::{Path, PathBuf};

/// 单个类别预测
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// 词表中的类别ID（ImageNet为WordNet ID）
    pub class_id: String,
    /// 原始标签，如 `golden_retriever`
    pub label: String,
    /// 置信度 (0.0 - 1.0)
    pub score: f32,
}

impl Prediction {
    pub fn new(class_id: impl Into<String>, label: impl Into<String>, score: f32) -> Self {
        Self {
            class_id: class_id.into(),
            label: label.into(),
            score,
        }
    }

    pub fn percentage(&self) -> f32 {
        self.score * 100.0
    }

    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_score(self.score)
    }

    /// `golden_retriever` -> `Golden Retriever`
    pub fn display_label(&self) -> String {
        title_case(&self.label.replace('_', " "))
    }
}

/// 置信度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    /// > 70%
    High,
    /// > 50%
    Good,
    /// > 30%
    Uncertain,
    Low,
}

impl ConfidenceTier {
    pub fn from_score(score: f32) -> Self {
        let percentage = score * 100.0;
        if percentage > 70.0 {
            ConfidenceTier::High
        } else if percentage > 50.0 {
            ConfidenceTier::Good
        } else if percentage > 30.0 {
            ConfidenceTier::Uncertain
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "🎯",
            ConfidenceTier::Good => "✅",
            ConfidenceTier::Uncertain => "⚠️",
            ConfidenceTier::Low => "❓",
        }
    }
}

/// 单张图像的分析结果；失败时 `predictions` 为 `None`
#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    pub path: PathBuf,
    pub image_name: String,
    pub predictions: Option<Vec<Prediction>>,
    pub error: Option<String>,
}

impl ImageAnalysis {
    pub fn success(path: &Path, predictions: Vec<Prediction>) -> Self {
        Self {
            path: path.to_path_buf(),
            image_name: image_name(path),
            predictions: Some(predictions),
            error: None,
        }
    }

    pub fn failure(path: &Path, error: impl ToString) -> Self {
        Self {
            path: path.to_path_buf(),
            image_name: image_name(path),
            predictions: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.predictions.is_some()
    }
}

pub fn image_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 单词首字母大写、其余小写；非字母字符之后视为新单词
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }

    result
}
