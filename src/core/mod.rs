pub mod classifier;
pub mod detector;
pub mod extractors;
pub mod features;

pub use crate::domain::model::{FeatureName, FeatureVector, Label, Lean, Signal};
pub use crate::domain::ports::{Classifier, FeatureSource};
pub use crate::utils::error::Result;
