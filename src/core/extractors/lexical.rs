use crate::domain::model::{Lean, Signal};
use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;
use tldextract::TldExtractor;
use url::Url;

pub const LONG_URL_THRESHOLD: usize = 75;

static IP_IN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^http[s]?://\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("valid IP pattern")
});

static SHORTENING_SERVICES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(bit\.ly|goo\.gl|tinyurl\.com|ow\.ly|is\.gd|t\.co|t2m\.io)")
        .expect("valid shortener pattern")
});

/// Public-suffix split of a URL's host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainParts {
    pub subdomain: String,
    pub domain: String,
    pub suffix: String,
}

impl DomainParts {
    /// `None` when the URL cannot be parsed or has no host.
    /// IP hosts yield the address as `domain` with no suffix.
    pub fn parse(extractor: &TldExtractor, url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?;

        if host.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>().is_ok() {
            return Some(Self {
                domain: host.to_string(),
                ..Self::default()
            });
        }

        let result = extractor.extract(url).ok()?;
        Some(Self {
            subdomain: result.subdomain.unwrap_or_default(),
            domain: result.domain.unwrap_or_default(),
            suffix: result.suffix.unwrap_or_default(),
        })
    }

    /// 可註冊網域，例如 a.b.example.com 的 example.com；缺少後綴時為空字串
    pub fn registered_domain(&self) -> String {
        if self.domain.is_empty() || self.suffix.is_empty() {
            String::new()
        } else {
            format!("{}.{}", self.domain, self.suffix)
        }
    }
}

pub fn registered_domain(extractor: &TldExtractor, url: &str) -> String {
    DomainParts::parse(extractor, url)
        .map(|parts| parts.registered_domain())
        .unwrap_or_default()
}

pub fn check_ip_in_url(url: &str) -> Signal {
    Signal::indicator(IP_IN_URL.is_match(url), Lean::Phishing)
}

/// 以字元數計算，非位元組數
pub fn get_url_length(url: &str) -> Signal {
    Signal::indicator(url.chars().count() > LONG_URL_THRESHOLD, Lean::Phishing)
}

pub fn check_shortening_service(url: &str) -> Signal {
    Signal::indicator(SHORTENING_SERVICES.is_match(url), Lean::Phishing)
}

/// Literal substring test, no percent-decoding.
pub fn contains_symbol(url: &str, symbol: &str) -> Signal {
    Signal::indicator(url.contains(symbol), Lean::Phishing)
}

pub fn count_subdomains(extractor: &TldExtractor, url: &str) -> Signal {
    match DomainParts::parse(extractor, url) {
        Some(parts) => {
            let labels = if parts.subdomain.is_empty() {
                0
            } else {
                parts.subdomain.split('.').count()
            };
            Signal::indicator(labels > 1, Lean::Phishing)
        }
        None => Signal::Indeterminate,
    }
}

pub fn check_https(url: &str) -> Signal {
    Signal::indicator(url.starts_with("https://"), Lean::Legitimate)
}

pub fn check_non_standard_port(url: &str) -> Signal {
    match Url::parse(url) {
        Ok(parsed) => {
            let non_standard = parsed
                .port()
                .map(|port| port != 80 && port != 443)
                .unwrap_or(false);
            Signal::indicator(non_standard, Lean::Phishing)
        }
        Err(_) => Signal::Indeterminate,
    }
}

pub fn check_https_in_domain(extractor: &TldExtractor, url: &str) -> Signal {
    match DomainParts::parse(extractor, url) {
        Some(parts) => Signal::indicator(parts.domain.to_lowercase().contains("https"), Lean::Phishing),
        None => Signal::Indeterminate,
    }
}

/// An empty registered domain is trivially contained in any URL.
pub fn abnormal_url(domain: &str, url: &str) -> Signal {
    Signal::indicator(!url.contains(domain), Lean::Phishing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tldextract::TldOption;

    const PHISHING: Signal = Signal::Resolved(Lean::Phishing);
    const LEGITIMATE: Signal = Signal::Resolved(Lean::Legitimate);

    fn extractor() -> TldExtractor {
        TldExtractor::new(TldOption::default())
    }

    #[test]
    fn test_ip_literal_host() {
        assert_eq!(check_ip_in_url("http://192.168.0.1/login"), PHISHING);
        assert_eq!(check_ip_in_url("https://10.0.0.254"), PHISHING);
        assert_eq!(check_ip_in_url("https://example.com/192.168.0.1"), LEGITIMATE);
        assert_eq!(check_ip_in_url("not a url"), LEGITIMATE);
    }

    #[test]
    fn test_url_length_threshold() {
        let at_threshold = format!("https://example.com/{}", "a".repeat(75 - 20));
        assert_eq!(at_threshold.len(), 75);
        assert_eq!(get_url_length(&at_threshold), LEGITIMATE);

        let over = format!("{}b", at_threshold);
        assert_eq!(get_url_length(&over), PHISHING);
    }

    #[test]
    fn test_url_length_counts_characters() {
        let url = format!("https://例子.com/{}", "é".repeat(40));
        assert_eq!(url.chars().count(), 55);
        assert!(url.len() > LONG_URL_THRESHOLD);
        assert_eq!(get_url_length(&url), LEGITIMATE);

        let long = format!("https://例子.com/{}", "é".repeat(61));
        assert_eq!(get_url_length(&long), PHISHING);
    }

    #[test]
    fn test_shortening_services() {
        assert_eq!(check_shortening_service("https://bit.ly/3xyz"), PHISHING);
        assert_eq!(check_shortening_service("http://t2m.io/abc"), PHISHING);
        assert_eq!(check_shortening_service("https://www.rust-lang.org"), LEGITIMATE);
    }

    #[test]
    fn test_contains_symbol_is_literal_and_idempotent() {
        let url = "http://user@evil.example/path";
        assert_eq!(contains_symbol(url, "@"), PHISHING);
        assert_eq!(contains_symbol(url, "@"), contains_symbol(url, "@"));
        assert_eq!(contains_symbol("http://user%40evil.example", "@"), LEGITIMATE);
        // every absolute URL carries "//" after the scheme
        assert_eq!(contains_symbol("https://example.com", "//"), PHISHING);
    }

    #[test]
    fn test_https_scheme() {
        assert_eq!(check_https("https://example.com"), LEGITIMATE);
        assert_eq!(check_https("http://example.com"), PHISHING);
        assert_eq!(check_https("HTTPS://example.com"), PHISHING);
    }

    #[test]
    fn test_non_standard_port() {
        assert_eq!(check_non_standard_port("http://example.com:8080/"), PHISHING);
        assert_eq!(check_non_standard_port("https://example.com:443/"), LEGITIMATE);
        assert_eq!(check_non_standard_port("http://example.com:443/"), LEGITIMATE);
        assert_eq!(check_non_standard_port("https://example.com/"), LEGITIMATE);
        assert_eq!(check_non_standard_port("::not-a-url"), Signal::Indeterminate);
    }

    #[test]
    fn test_domain_parts() {
        let ext = extractor();
        let parts = DomainParts::parse(&ext, "https://a.b.example.co.uk/login").unwrap();
        assert_eq!(parts.subdomain, "a.b");
        assert_eq!(parts.registered_domain(), "example.co.uk");

        let ip = DomainParts::parse(&ext, "http://192.168.0.1/login").unwrap();
        assert_eq!(ip.registered_domain(), "");
        assert!(DomainParts::parse(&ext, "example.com").is_none());
    }

    #[test]
    fn test_subdomain_count() {
        let ext = extractor();
        assert_eq!(count_subdomains(&ext, "https://www.example.com"), LEGITIMATE);
        assert_eq!(count_subdomains(&ext, "https://example.com"), LEGITIMATE);
        assert_eq!(count_subdomains(&ext, "https://login.secure.example.com"), PHISHING);
        assert_eq!(count_subdomains(&ext, "no scheme"), Signal::Indeterminate);
    }

    #[test]
    fn test_https_token_in_domain() {
        let ext = extractor();
        assert_eq!(check_https_in_domain(&ext, "http://https-paypal.com/"), PHISHING);
        assert_eq!(check_https_in_domain(&ext, "https://paypal.com/"), LEGITIMATE);
        assert_eq!(check_https_in_domain(&ext, "https://https.paypal.com/"), LEGITIMATE);
    }

    #[test]
    fn test_abnormal_url() {
        assert_eq!(abnormal_url("example.com", "https://www.example.com"), LEGITIMATE);
        assert_eq!(abnormal_url("example.com", "https://www.other.org"), PHISHING);
        assert_eq!(abnormal_url("", "http://192.168.0.1"), LEGITIMATE);
    }
}
