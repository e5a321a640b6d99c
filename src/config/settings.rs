use crate::adapters::{search, whois};
use crate::core::classifier::DEFAULT_NEIGHBORS;
use crate::utils::error::Result;
use crate::utils::validation::{
    require_field, validate_endpoint, validate_model_path, validate_neighbors, validate_non_empty,
    validate_selector, validate_timeout, validate_whois_server, Validate,
};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Effective runtime settings: defaults, then the TOML file, then CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model_path: Option<String>,
    pub neighbors: usize,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub whois_server: String,
    pub whois_timeout: Duration,
    pub dns_timeout: Duration,
    pub search_endpoint: String,
    pub search_result_selector: String,
    pub search_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Self {
            model_path: None,
            neighbors: DEFAULT_NEIGHBORS,
            http_timeout: timeout,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            whois_server: whois::DEFAULT_ROOT_SERVER.to_string(),
            whois_timeout: timeout,
            dns_timeout: timeout,
            search_endpoint: search::DEFAULT_SEARCH_ENDPOINT.to_string(),
            search_result_selector: search::DEFAULT_RESULT_SELECTOR.to_string(),
            search_timeout: timeout,
        }
    }
}

impl Settings {
    /// Applies one timeout to every lookup.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.http_timeout = timeout;
        self.whois_timeout = timeout;
        self.dns_timeout = timeout;
        self.search_timeout = timeout;
    }

    pub fn model_path(&self) -> Result<&String> {
        require_field("model.path", &self.model_path)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_model_path("model.path", self.model_path()?)?;
        validate_neighbors("model.neighbors", self.neighbors)?;

        for (field, timeout) in [
            ("http.timeout_seconds", self.http_timeout),
            ("whois.timeout_seconds", self.whois_timeout),
            ("dns.timeout_seconds", self.dns_timeout),
            ("search.timeout_seconds", self.search_timeout),
        ] {
            validate_timeout(field, timeout)?;
        }

        validate_non_empty("http.user_agent", &self.user_agent)?;
        validate_whois_server("whois.server", &self.whois_server)?;
        validate_endpoint("search.endpoint", &self.search_endpoint)?;
        validate_selector("search.result_selector", &self.search_result_selector)?;
        Ok(())
    }
}
