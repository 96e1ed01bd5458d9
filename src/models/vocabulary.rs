use crate::recognition::Prediction;
use crate::utils::error::RecognitionError;
use crate::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Keras `imagenet_class_index.json` 的条目：`["n01440764", "tench"]`
#[derive(Debug, Deserialize)]
struct ClassIndexEntry(String, String);

/// 模型的类别表，下标即模型输出的类别索引
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// (类别ID, 标签)
    entries: Vec<(String, String)>,
}

impl Vocabulary {
    pub fn new(entries: Vec<(String, String)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(RecognitionError::Vocabulary(
                "Vocabulary has no classes".to_string(),
            ));
        }
        Ok(Self { entries })
    }

    /// 按扩展名选择格式：`.json` 为 Keras 类别索引，其余按 synset 文本解析
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RecognitionError::ModelLoad(format!(
                "Label file not found: {}",
                path.display()
            )));
        }

        tracing::info!("Loading labels from: {}", path.display());
        let content = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let vocabulary = if is_json {
            Self::from_class_index_json(&content)?
        } else {
            Self::from_synset_text(&content)?
        };

        tracing::info!("Loaded vocabulary with {} classes", vocabulary.len());
        Ok(vocabulary)
    }

    /// 解析 `{"0": ["n01440764", "tench"], ...}`
    pub fn from_class_index_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, ClassIndexEntry> = serde_json::from_str(content)?;

        let mut indexed = Vec::with_capacity(raw.len());
        for (key, ClassIndexEntry(class_id, label)) in raw {
            let index: usize = key.parse().map_err(|_| {
                RecognitionError::Vocabulary(format!("Invalid class index '{}'", key))
            })?;
            indexed.push((index, class_id, label));
        }
        indexed.sort_by_key(|(index, _, _)| *index);

        // 索引必须连续，否则输出位置与标签对不上
        for (position, (index, _, _)) in indexed.iter().enumerate() {
            if *index != position {
                return Err(RecognitionError::Vocabulary(format!(
                    "Class index {} missing from label file",
                    position
                )));
            }
        }

        Self::new(
            indexed
                .into_iter()
                .map(|(_, class_id, label)| (class_id, label))
                .collect(),
        )
    }

    /// 解析每行 `n01440764 tench, Tinca tinca`，取第一个名称作为标签
    pub fn from_synset_text(content: &str) -> Result<Self> {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(' ') {
                Some((class_id, names)) => {
                    let label = names.split(',').next().unwrap_or(names).trim();
                    (class_id.to_string(), label.to_string())
                }
                None => (line.to_string(), line.to_string()),
            })
            .collect();

        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<(&str, &str)> {
        self.entries
            .get(index)
            .map(|(class_id, label)| (class_id.as_str(), label.as_str()))
    }

    /// 将一行模型输出解码为按置信度降序排列的 top-k 预测
    pub fn decode(&self, scores: &[f32], top_k: usize) -> Result<Vec<Prediction>> {
        if top_k == 0 {
            return Err(RecognitionError::InvalidInput(
                "top_k must be greater than 0".to_string(),
            ));
        }
        if scores.is_empty() {
            return Err(RecognitionError::Inference(
                "Model returned an empty prediction vector".to_string(),
            ));
        }

        if scores.len() != self.len() {
            tracing::warn!(
                "Model output size ({}) != vocabulary size ({})",
                scores.len(),
                self.len()
            );
        }

        // NaN 按 0 处理，排在最后
        let scores: Vec<f32> = scores
            .iter()
            .map(|s| if s.is_nan() { 0.0 } else { *s })
            .collect();
        let probabilities = to_probabilities(&scores);

        let mut ranked: Vec<(usize, f32)> = probabilities.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top_k);

        Ok(ranked
            .into_iter()
            .map(|(index, score)| match self.get(index) {
                Some((class_id, label)) => Prediction::new(class_id, label, score),
                None => {
                    let name = format!("class_{}", index);
                    Prediction::new(&name, &name, score)
                }
            })
            .collect())
    }
}

/// 已是概率分布则原样返回，否则视为logits做softmax
pub fn to_probabilities(scores: &[f32]) -> Vec<f32> {
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let sum: f32 = scores.iter().sum();

    if in_range && (sum - 1.0).abs() < 1e-2 {
        scores.to_vec()
    } else {
        softmax(scores)
    }
}

pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
