pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{Settings, TomlConfig};

pub use core::classifier::KnnModel;
pub use core::detector::{Detection, PhishingDetector};
pub use core::features::{FeatureExtractor, LiveFeatureExtractor};
pub use domain::model::{FeatureName, FeatureVector, Label, Lean, Signal};
pub use utils::error::{DetectorError, LookupError, Result};
