use crate::domain::model::DomainRecord;
use crate::domain::ports::WhoisLookup;
use crate::utils::error::{LookupError, LookupResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::time::Duration;
use whois_rust::{WhoIs, WhoIsLookupOptions, WhoIsServerValue};

pub const DEFAULT_ROOT_SERVER: &str = "whois.iana.org";

/// 根伺服器回覆 `refer:` 後由套件轉查一次註冊局
const ROOT_FOLLOW: u16 = 1;
const REGISTRAR_KEYS: &[&str] = &["registrar whois server"];

const CREATION_KEYS: &[&str] = &[
    "creation date",
    "created",
    "created on",
    "created date",
    "registered on",
    "registration date",
    "registration time",
    "domain registration date",
    "domain record activated",
];

const EXPIRATION_KEYS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiry date",
    "expires",
    "expires on",
    "expire date",
    "expiration time",
    "paid-till",
    "domain expiration date",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%d-%b-%Y", "%d.%m.%Y", "%d/%m/%Y"];

/// WHOIS lookups through `whois-rust`: the root server refers the query to
/// the registry. When the registry answer lacks either date, the registrar
/// named in it is asked for the missing one.
pub struct WhoisClient {
    whois: WhoIs,
    root_server: String,
    timeout: Duration,
}

fn whois_error(e: impl std::fmt::Display) -> LookupError {
    LookupError::Whois(e.to_string())
}

impl WhoisClient {
    pub fn new(root_server: impl Into<String>, timeout: Duration) -> LookupResult<Self> {
        let root_server = root_server.into();
        WhoIsServerValue::from_string(&root_server).map_err(whois_error)?;

        let servers = serde_json::json!({ "": root_server }).to_string();
        let whois = WhoIs::from_string(servers).map_err(whois_error)?;

        Ok(Self {
            whois,
            root_server,
            timeout,
        })
    }

    async fn ask(&self, domain: &str, server: &str, follow: u16) -> LookupResult<String> {
        tracing::debug!("WHOIS {} -> {} (follow {})", domain, server, follow);

        let mut options = WhoIsLookupOptions::from_string(domain).map_err(whois_error)?;
        options.server = Some(WhoIsServerValue::from_string(server).map_err(whois_error)?);
        options.follow = follow;

        tokio::time::timeout(self.timeout, self.whois.lookup_async(options))
            .await
            .map_err(|_| LookupError::Timeout(self.timeout))?
            .map_err(whois_error)
    }
}

#[async_trait]
impl WhoisLookup for WhoisClient {
    async fn lookup(&self, domain: &str) -> LookupResult<DomainRecord> {
        let has_tld = domain
            .rsplit('.')
            .next()
            .map(|tld| !tld.is_empty() && domain.contains('.'))
            .unwrap_or(false);
        if !has_tld {
            return Err(LookupError::InvalidTarget(domain.to_string()));
        }

        let answer = self.ask(domain, &self.root_server, ROOT_FOLLOW).await?;
        let mut record = parse_record(&answer);
        if record.is_complete() {
            return Ok(record);
        }

        let Some(registrar) = referral(&answer, REGISTRAR_KEYS) else {
            return Ok(record);
        };

        match self.ask(domain, &registrar, 0).await {
            Ok(registrar_answer) => record.fill_from(parse_record(&registrar_answer)),
            Err(e) => tracing::debug!("registrar WHOIS {} failed for {}: {}", registrar, domain, e),
        }
        Ok(record)
    }
}

/// `key: value` pairs with lowercase keys, in response order.
fn fields(response: &str) -> impl Iterator<Item = (String, &str)> {
    response.lines().filter_map(|line| {
        let line = line.trim();
        if line.starts_with('%') || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once(':')?;
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some((key.trim().to_lowercase(), value))
        }
    })
}

fn referral(response: &str, keys: &[&str]) -> Option<String> {
    fields(response)
        .find(|(key, _)| keys.contains(&key.as_str()))
        .map(|(_, value)| {
            value
                .trim_start_matches("whois://")
                .trim_end_matches('/')
                .to_string()
        })
}

/// 多筆日期時取第一個可解析的值
pub fn parse_record(response: &str) -> DomainRecord {
    let mut record = DomainRecord::default();
    for (key, value) in fields(response) {
        if record.creation_date.is_none() && CREATION_KEYS.contains(&key.as_str()) {
            record.creation_date = parse_date(value);
        } else if record.expiration_date.is_none() && EXPIRATION_KEYS.contains(&key.as_str()) {
            record.expiration_date = parse_date(value);
        }
    }
    record
}

pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }

    // 去掉時區尾碼，例如 "2030-01-01T00:00:00Z" 或 "... UTC"
    let trimmed = value
        .trim_end_matches('Z')
        .trim_end_matches(" UTC")
        .trim_end_matches(" (UTC)")
        .trim();

    if let Some(parsed) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return Some(parsed);
    }

    let date_part = trimmed.split_whitespace().next()?;
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
