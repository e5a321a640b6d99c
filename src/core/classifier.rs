use crate::domain::model::{FeatureName, Label};
use crate::domain::ports::Classifier;
use crate::utils::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

pub const DEFAULT_NEIGHBORS: usize = 19;

const INDEX_COLUMN: &str = "Index";
const CLASS_COLUMN: &str = "class";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub features: Vec<f64>,
    pub label: Label,
}

/// Pretrained k-nearest-neighbours model: `k`, the feature schema it was
/// trained on and the labelled training samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnModel {
    k: usize,
    features: Vec<String>,
    samples: Vec<Sample>,
}

impl KnnModel {
    pub fn new(k: usize, features: Vec<String>, samples: Vec<Sample>) -> Result<Self> {
        let model = Self {
            k,
            features,
            samples,
        };
        model.validate()?;
        Ok(model)
    }

    /// 依副檔名載入：`.csv` 為訓練資料集，其餘視為 JSON 模型檔
    pub fn load<P: AsRef<Path>>(path: P, neighbors: usize) -> Result<Self> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        tracing::info!("Loading model from {}", path.display());
        let file = std::fs::File::open(path)?;
        let model = if is_csv {
            Self::from_csv_reader(file, neighbors)?
        } else {
            Self::from_json_reader(file)?
        };

        tracing::info!(
            "Model ready: k={}, {} samples, {} features",
            model.k,
            model.samples.len(),
            model.features.len()
        );
        Ok(model)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let model: Self = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }

    /// Loads the labelled dataset directly: an optional `Index` column, the
    /// feature columns and a `class` column.
    pub fn from_csv_reader<R: Read>(reader: R, k: usize) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let class_at = headers
            .iter()
            .position(|h| h.trim() == CLASS_COLUMN)
            .ok_or_else(|| DetectorError::model(format!("dataset has no '{}' column", CLASS_COLUMN)))?;

        let feature_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != class_at && h.trim() != INDEX_COLUMN)
            .map(|(i, h)| (i, h.trim().to_string()))
            .collect();

        let mut samples = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            let features = feature_columns
                .iter()
                .map(|(i, name)| parse_cell(&record, *i, name, row))
                .collect::<Result<Vec<f64>>>()?;

            let label = parse_label(&record, class_at, row)?;

            samples.push(Sample { features, label });
        }

        let names = feature_columns.into_iter().map(|(_, name)| name).collect();
        Self::new(k, names, samples)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn feature_names(&self) -> &[String] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn validate(&self) -> Result<()> {
        if self.features.len() != FeatureName::COUNT {
            return Err(DetectorError::feature_count(
                FeatureName::COUNT,
                self.features.len(),
            ));
        }

        if let Some((column, (expected, actual))) = FeatureName::ALL
            .iter()
            .zip(&self.features)
            .enumerate()
            .find(|(_, (expected, actual))| expected.as_str() != actual.as_str())
        {
            return Err(DetectorError::feature_order(column, expected.as_str(), actual));
        }

        if self.samples.is_empty() {
            return Err(DetectorError::model("model has no training samples"));
        }

        if self.k == 0 || self.k > self.samples.len() {
            return Err(DetectorError::model(format!(
                "k must be between 1 and {} (got {})",
                self.samples.len(),
                self.k
            )));
        }

        if let Some((i, sample)) = self
            .samples
            .iter()
            .enumerate()
            .find(|(_, sample)| sample.features.len() != self.features.len())
        {
            return Err(DetectorError::model(format!(
                "sample {} has {} features, expected {}",
                i,
                sample.features.len(),
                self.features.len()
            )));
        }

        Ok(())
    }
}

fn parse_cell(record: &csv::StringRecord, at: usize, column: &str, row: usize) -> Result<f64> {
    let raw = record.get(at).unwrap_or("").trim();
    raw.parse::<f64>().map_err(|_| {
        DetectorError::model(format!(
            "row {}: column '{}' has non-numeric value '{}'",
            row + 1,
            column,
            raw
        ))
    })
}

/// 類別欄必須是整數 -1 或 1，不接受 1.7 之類的小數
fn parse_label(record: &csv::StringRecord, at: usize, row: usize) -> Result<Label> {
    let class = parse_cell(record, at, CLASS_COLUMN, row)?;
    if class.fract() != 0.0 {
        return Err(DetectorError::model(format!(
            "row {}: class label {} is not an integer",
            row + 1,
            class
        )));
    }

    Label::from_class(class as i64).ok_or_else(|| {
        DetectorError::model(format!("row {}: unknown class label {}", row + 1, class))
    })
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl Classifier for KnnModel {
    fn n_features(&self) -> usize {
        self.features.len()
    }

    fn predict(&self, features: &[f64]) -> Result<Label> {
        if features.len() != self.features.len() {
            return Err(DetectorError::feature_count(
                self.features.len(),
                features.len(),
            ));
        }

        let mut neighbours: Vec<(f64, Label)> = self
            .samples
            .iter()
            .map(|sample| (squared_distance(&sample.features, features), sample.label))
            .collect();
        // 穩定排序：距離相同時保留訓練資料順序
        neighbours.sort_by(|a, b| a.0.total_cmp(&b.0));

        let phishing_votes = neighbours
            .iter()
            .take(self.k)
            .filter(|(_, label)| *label == Label::Phishing)
            .count();
        let legitimate_votes = self.k - phishing_votes;

        // 票數相同時取較小的類別 (-1)
        let label = if phishing_votes >= legitimate_votes {
            Label::Phishing
        } else {
            Label::Legitimate
        };

        tracing::debug!(
            "kNN vote: {} phishing / {} legitimate -> {}",
            phishing_votes,
            legitimate_votes,
            label
        );
        Ok(label)
    }
}
