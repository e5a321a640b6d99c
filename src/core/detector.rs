use crate::domain::model::{FeatureName, FeatureVector, Label};
use crate::domain::ports::{Classifier, FeatureSource};
use crate::utils::error::{DetectorError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub url: String,
    pub features: FeatureVector,
    pub label: Label,
}

/// URL → features → label.
pub struct PhishingDetector<F: FeatureSource, C: Classifier> {
    features: F,
    classifier: C,
}

impl<F: FeatureSource, C: Classifier> PhishingDetector<F, C> {
    /// 模型寬度必須等於特徵數，否則在啟動時就失敗
    pub fn new(features: F, classifier: C) -> Result<Self> {
        if classifier.n_features() != FeatureName::COUNT {
            return Err(DetectorError::feature_count(
                FeatureName::COUNT,
                classifier.n_features(),
            ));
        }

        Ok(Self {
            features,
            classifier,
        })
    }

    pub async fn features(&self, url: &str) -> Result<FeatureVector> {
        self.features.extract(url).await
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Label> {
        self.classifier.predict(&features.values())
    }

    pub async fn classify(&self, url: &str) -> Result<Detection> {
        tracing::info!("Classifying {}", url);

        let features = self.features(url).await?;
        let label = self.predict(&features)?;
        tracing::info!("{} -> {}", url, label);

        Ok(Detection {
            url: url.to_string(),
            features,
            label,
        })
    }
}
