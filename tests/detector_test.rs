use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use httpmock::prelude::*;
use phish_detect::adapters::{HttpPageFetcher, WebSearch};
use phish_detect::core::classifier::Sample;
use phish_detect::domain::model::{DomainRecord, Page};
use phish_detect::domain::ports::{DnsResolver, PageFetcher, SearchEngine, WhoisLookup};
use phish_detect::utils::error::{LookupError, LookupResult};
use phish_detect::{
    FeatureExtractor, FeatureName, FeatureVector, KnnModel, Label, Lean, PhishingDetector, Signal,
};
use std::net::IpAddr;
use std::time::Duration;

/// 所有網路查詢都失敗的替身
struct Offline;

#[async_trait]
impl PageFetcher for Offline {
    async fn fetch(&self, url: &str) -> LookupResult<Page> {
        Err(LookupError::InvalidTarget(url.to_string()))
    }
}

#[async_trait]
impl WhoisLookup for Offline {
    async fn lookup(&self, _domain: &str) -> LookupResult<DomainRecord> {
        Err(LookupError::Timeout(Duration::from_secs(5)))
    }
}

#[async_trait]
impl DnsResolver for Offline {
    async fn resolve(&self, _domain: &str) -> LookupResult<Vec<IpAddr>> {
        Err(LookupError::Timeout(Duration::from_secs(5)))
    }
}

#[async_trait]
impl SearchEngine for Offline {
    async fn search(&self, _query: &str, _num_results: usize) -> LookupResult<Vec<String>> {
        Err(LookupError::Status(503))
    }
}

/// 註冊多年的網域
struct OldDomain;

#[async_trait]
impl WhoisLookup for OldDomain {
    async fn lookup(&self, _domain: &str) -> LookupResult<DomainRecord> {
        let date = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        };
        Ok(DomainRecord {
            creation_date: date(1995, 8, 14),
            expiration_date: date(2030, 8, 13),
        })
    }
}

struct Resolves;

#[async_trait]
impl DnsResolver for Resolves {
    async fn resolve(&self, _domain: &str) -> LookupResult<Vec<IpAddr>> {
        Ok(vec![IpAddr::from([93, 184, 216, 34])])
    }
}

fn model() -> Result<KnnModel> {
    let names = FeatureName::ALL
        .iter()
        .map(|name| name.as_str().to_string())
        .collect();
    let samples = vec![
        Sample { features: vec![1.0; 30], label: Label::Legitimate },
        Sample { features: vec![1.0; 30], label: Label::Legitimate },
        Sample { features: vec![-1.0; 30], label: Label::Phishing },
    ];
    Ok(KnnModel::new(1, names, samples)?)
}

#[tokio::test]
async fn test_ip_literal_url_is_flagged() -> Result<()> {
    let detector = PhishingDetector::new(
        FeatureExtractor::new(Offline, Offline, Offline, Offline),
        model()?,
    )?;

    let detection = detector.classify("http://192.168.0.1/login").await?;
    assert_eq!(detection.url, "http://192.168.0.1/login");
    assert_eq!(detection.features.len(), 30);
    assert_eq!(
        detection.features.get(FeatureName::UsingIP),
        Some(Signal::Resolved(Lean::Phishing))
    );
    assert_eq!(
        detection.features.get(FeatureName::HTTPS),
        Some(Signal::Resolved(Lean::Phishing))
    );
    // unreachable lookups never abort the prediction
    assert_eq!(
        detection.features.get(FeatureName::Favicon),
        Some(Signal::Indeterminate)
    );
    Ok(())
}

#[tokio::test]
async fn test_https_url_and_aliases() -> Result<()> {
    let detector = PhishingDetector::new(
        FeatureExtractor::new(Offline, OldDomain, Resolves, Offline),
        model()?,
    )?;

    let features = detector.features("https://example.com").await?;
    let legitimate = Some(Signal::Resolved(Lean::Legitimate));

    assert_eq!(features.get(FeatureName::HTTPS), legitimate);
    assert_eq!(features.get(FeatureName::UsingIP), legitimate);
    assert_eq!(features.get(FeatureName::DomainRegLen), legitimate);
    assert_eq!(features.get(FeatureName::AgeofDomain), legitimate);
    assert_eq!(features.get(FeatureName::DNSRecording), legitimate);

    // aliases are computed independently but always agree
    assert_eq!(
        features.get(FeatureName::RequestURL),
        features.get(FeatureName::LinksPointingToPage)
    );
    assert_eq!(
        features.get(FeatureName::PageRank),
        features.get(FeatureName::StatsReport)
    );

    let label = detector.predict(&features)?;
    assert!(matches!(label, Label::Phishing | Label::Legitimate));
    Ok(())
}

#[tokio::test]
async fn test_all_indeterminate_vector_is_classified() -> Result<()> {
    let detector = PhishingDetector::new(
        FeatureExtractor::new(Offline, Offline, Offline, Offline),
        model()?,
    )?;

    let label = detector.predict(&FeatureVector::indeterminate())?;
    // every sample is equidistant from the origin; the first one wins with k=1
    assert_eq!(label, Label::Legitimate);
    Ok(())
}

#[tokio::test]
async fn test_empty_url_is_rejected() -> Result<()> {
    let detector = PhishingDetector::new(
        FeatureExtractor::new(Offline, Offline, Offline, Offline),
        model()?,
    )?;

    assert!(detector.classify("").await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_search_results_drive_traffic_and_index() -> Result<()> {
    let server = MockServer::start();
    let mut results = String::from("<html><body>");
    for i in 0..8 {
        results.push_str(&format!(
            r#"<div class="g"><a href="https://example.com/{}"><h3>Result {}</h3></a></div>"#,
            i, i
        ));
    }
    results.push_str("</body></html>");

    let search_mock = server.mock(|when, then| {
        when.method(GET).path("/search").query_param_exists("q");
        then.status(200).body(results.clone());
    });

    let search = WebSearch::new(
        server.url("/search"),
        "div.g",
        Duration::from_secs(5),
        "phish-detect-test",
    )?;
    let fetcher = HttpPageFetcher::new(Duration::from_secs(2), "phish-detect-test")?;
    let extractor = FeatureExtractor::new(fetcher, Offline, Offline, search);

    let url = "https://example.com";
    let domain = extractor.registered_domain(url);
    assert_eq!(domain, "example.com");

    let legitimate = Signal::Resolved(Lean::Legitimate);
    assert_eq!(
        extractor.signal(FeatureName::PageRank, url, &domain).await,
        legitimate
    );
    assert_eq!(
        extractor.signal(FeatureName::GoogleIndex, url, &domain).await,
        legitimate
    );
    search_mock.assert_hits(2);
    Ok(())
}
