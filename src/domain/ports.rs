use crate::domain::model::{DomainRecord, FeatureVector, Label, Page};
use crate::utils::error::{LookupResult, Result};
use async_trait::async_trait;
use std::net::IpAddr;

/// Fetches a page, following redirects.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> LookupResult<Page>;
}

#[async_trait]
pub trait WhoisLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> LookupResult<DomainRecord>;
}

#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve(&self, domain: &str) -> LookupResult<Vec<IpAddr>>;
}

/// Returns result links for a query, at most `num_results` of them.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn search(&self, query: &str, num_results: usize) -> LookupResult<Vec<String>>;
}

#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn extract(&self, url: &str) -> Result<FeatureVector>;
}

pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;
    fn predict(&self, features: &[f64]) -> Result<Label>;
}
