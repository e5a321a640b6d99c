use crate::domain::model::{Lean, Signal};
use crate::domain::ports::{DnsResolver, SearchEngine, WhoisLookup};

pub const REGISTRATION_DAYS_THRESHOLD: i64 = 365;
pub const TRAFFIC_RESULTS: usize = 10;
pub const TRAFFIC_THRESHOLD: usize = 5;
pub const INDEX_RESULTS: usize = 1;

pub async fn domain_registration_length<W: WhoisLookup + ?Sized>(whois: &W, domain: &str) -> Signal {
    if domain.is_empty() {
        return Signal::Indeterminate;
    }

    match whois.lookup(domain).await {
        Ok(record) => match record.registration_days() {
            Some(days) => Signal::indicator(days > REGISTRATION_DAYS_THRESHOLD, Lean::Legitimate),
            None => {
                tracing::debug!("WHOIS record for {} lacks registration dates", domain);
                Signal::Indeterminate
            }
        },
        Err(e) => {
            tracing::debug!("WHOIS lookup failed for {}: {}", domain, e);
            Signal::Indeterminate
        }
    }
}

pub async fn dns_record_exists<D: DnsResolver + ?Sized>(resolver: &D, domain: &str) -> Signal {
    if domain.is_empty() {
        return Signal::Indeterminate;
    }

    match resolver.resolve(domain).await {
        Ok(addresses) => Signal::indicator(!addresses.is_empty(), Lean::Legitimate),
        Err(e) => {
            tracing::debug!("DNS resolution failed for {}: {}", domain, e);
            Signal::Indeterminate
        }
    }
}

/// 以搜尋結果數量估計網站流量
pub async fn website_traffic<S: SearchEngine + ?Sized>(search: &S, url: &str) -> Signal {
    match search.search(url, TRAFFIC_RESULTS).await {
        Ok(results) => {
            let found = results.len().min(TRAFFIC_RESULTS);
            Signal::indicator(found > TRAFFIC_THRESHOLD, Lean::Legitimate)
        }
        Err(e) => {
            tracing::debug!("traffic search failed for {}: {}", url, e);
            Signal::Indeterminate
        }
    }
}

pub async fn google_index<S: SearchEngine + ?Sized>(search: &S, url: &str) -> Signal {
    let query = format!("site:{}", url);
    match search.search(&query, INDEX_RESULTS).await {
        Ok(results) => Signal::indicator(!results.is_empty(), Lean::Legitimate),
        Err(e) => {
            tracing::debug!("index search failed for {}: {}", url, e);
            Signal::Indeterminate
        }
    }
}
