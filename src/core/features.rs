use crate::adapters::{HttpPageFetcher, SystemResolver, WebSearch, WhoisClient};
use crate::config::Settings;
use crate::core::extractors;
use crate::domain::model::{FeatureName, FeatureVector, Signal};
use crate::domain::ports::{DnsResolver, FeatureSource, PageFetcher, SearchEngine, WhoisLookup};
use crate::utils::error::{DetectorError, Result};
use async_trait::async_trait;
use std::time::Instant;
use tldextract::{TldExtractor, TldOption};

/// Runs every extractor for a URL and lays the signals out in the
/// canonical feature order.
pub struct FeatureExtractor<P, W, D, S> {
    fetcher: P,
    whois: W,
    resolver: D,
    search: S,
    domains: TldExtractor,
}

impl<P, W, D, S> FeatureExtractor<P, W, D, S>
where
    P: PageFetcher,
    W: WhoisLookup,
    D: DnsResolver,
    S: SearchEngine,
{
    pub fn new(fetcher: P, whois: W, resolver: D, search: S) -> Self {
        Self {
            fetcher,
            whois,
            resolver,
            search,
            domains: TldExtractor::new(TldOption::default()),
        }
    }

    pub fn registered_domain(&self, url: &str) -> String {
        extractors::registered_domain(&self.domains, url)
    }

    /// 依名稱計算單一特徵；別名特徵各自重新計算
    pub async fn signal(&self, name: FeatureName, url: &str, domain: &str) -> Signal {
        match name {
            FeatureName::UsingIP => extractors::check_ip_in_url(url),
            FeatureName::LongURL => extractors::get_url_length(url),
            FeatureName::ShortURL => extractors::check_shortening_service(url),
            FeatureName::SymbolAt => extractors::contains_symbol(url, "@"),
            FeatureName::RedirectingSlashes => extractors::contains_symbol(url, "//"),
            FeatureName::PrefixSuffix => extractors::contains_symbol(url, "-"),
            FeatureName::SubDomains => extractors::count_subdomains(&self.domains, url),
            FeatureName::HTTPS => extractors::check_https(url),
            FeatureName::DomainRegLen | FeatureName::AgeofDomain => {
                extractors::domain_registration_length(&self.whois, domain).await
            }
            FeatureName::Favicon => extractors::has_favicon(&self.fetcher, url).await,
            FeatureName::NonStdPort => extractors::check_non_standard_port(url),
            FeatureName::HTTPSDomainURL => extractors::check_https_in_domain(&self.domains, url),
            FeatureName::RequestURL | FeatureName::LinksPointingToPage => {
                extractors::count_links_pointing_to_page(&self.fetcher, url).await
            }
            FeatureName::AnchorURL => extractors::count_links_in_anchors(&self.fetcher, url).await,
            FeatureName::LinksInScriptTags => {
                extractors::count_links_in_scripts(&self.fetcher, url).await
            }
            FeatureName::ServerFormHandler | FeatureName::UsingPopupWindow => {
                extractors::has_popup_window(&self.fetcher, url).await
            }
            FeatureName::InfoEmail => extractors::has_info_email(&self.fetcher, url).await,
            FeatureName::AbnormalURL => extractors::abnormal_url(domain, url),
            FeatureName::WebsiteForwarding => {
                extractors::website_forwarding(&self.fetcher, url).await
            }
            FeatureName::StatusBarCust => {
                extractors::status_bar_customization(&self.fetcher, url).await
            }
            FeatureName::DisableRightClick => {
                extractors::disable_right_click(&self.fetcher, url).await
            }
            FeatureName::IframeRedirection => extractors::has_iframe(&self.fetcher, url).await,
            FeatureName::DNSRecording => extractors::dns_record_exists(&self.resolver, domain).await,
            FeatureName::WebsiteTraffic | FeatureName::PageRank => {
                extractors::website_traffic(&self.search, url).await
            }
            FeatureName::GoogleIndex | FeatureName::StatsReport => {
                extractors::google_index(&self.search, url).await
            }
        }
    }

    pub async fn extract_all_features(&self, url: &str) -> Result<FeatureVector> {
        if url.trim().is_empty() {
            return Err(DetectorError::InvalidUrlError {
                url: url.to_string(),
                reason: "URL cannot be empty".to_string(),
            });
        }

        let started = Instant::now();
        let domain = self.registered_domain(url);
        tracing::debug!("Registered domain for {}: '{}'", url, domain);

        let mut entries = Vec::with_capacity(FeatureName::COUNT);
        for name in FeatureName::ALL {
            let signal = self.signal(name, url, &domain).await;
            tracing::debug!("{} = {}", name, signal.encode());
            entries.push((name, signal));
        }

        let vector = FeatureVector::new(entries);
        let unresolved = vector
            .iter()
            .filter(|(_, signal)| *signal == Signal::Indeterminate)
            .count();
        tracing::info!(
            "Extracted {} features for {} in {:?} ({} indeterminate)",
            vector.len(),
            url,
            started.elapsed(),
            unresolved
        );

        Ok(vector)
    }
}

pub type LiveFeatureExtractor =
    FeatureExtractor<HttpPageFetcher, WhoisClient, SystemResolver, WebSearch>;

impl LiveFeatureExtractor {
    /// 以真實網路查詢建立擷取器
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let fetcher = HttpPageFetcher::new(settings.http_timeout, settings.user_agent.clone())
            .map_err(|e| DetectorError::ConfigValidationError {
                field: "http".to_string(),
                message: e.to_string(),
            })?;
        let search = WebSearch::new(
            settings.search_endpoint.clone(),
            &settings.search_result_selector,
            settings.search_timeout,
            settings.user_agent.clone(),
        )
        .map_err(|e| DetectorError::ConfigValidationError {
            field: "search".to_string(),
            message: e.to_string(),
        })?;

        let whois = WhoisClient::new(settings.whois_server.clone(), settings.whois_timeout)
            .map_err(|e| DetectorError::ConfigValidationError {
                field: "whois".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self::new(
            fetcher,
            whois,
            SystemResolver::new(settings.dns_timeout),
            search,
        ))
    }
}

#[async_trait]
impl<P, W, D, S> FeatureSource for FeatureExtractor<P, W, D, S>
where
    P: PageFetcher,
    W: WhoisLookup,
    D: DnsResolver,
    S: SearchEngine,
{
    async fn extract(&self, url: &str) -> Result<FeatureVector> {
        self.extract_all_features(url).await
    }
}
