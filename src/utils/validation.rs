use crate::utils::error::{DetectorError, Result};
use scraper::Selector;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// 模型檔可接受的副檔名：JSON 模型或 CSV 訓練資料
pub const MODEL_EXTENSIONS: &[&str] = &["json", "csv"];
pub const MAX_TIMEOUT: Duration = Duration::from_secs(300);

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> DetectorError {
    DetectorError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn require_field<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| DetectorError::MissingConfigError {
        field: field.to_string(),
    })
}

pub fn validate_model_path(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Model path cannot be empty"));
    }

    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) if MODEL_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(invalid(
            field,
            path,
            format!(
                "Unsupported model format '.{}'; expected one of: {}",
                ext,
                MODEL_EXTENSIONS.join(", ")
            ),
        )),
        None => Err(invalid(
            field,
            path,
            "Model path needs a .json or .csv extension",
        )),
    }
}

pub fn validate_neighbors(field: &str, k: usize) -> Result<()> {
    if k == 0 {
        return Err(invalid(field, k, "At least one neighbour is required"));
    }
    Ok(())
}

/// 逾時以整秒計，範圍 1..=300
pub fn validate_timeout(field: &str, timeout: Duration) -> Result<()> {
    if timeout < Duration::from_secs(1) || timeout > MAX_TIMEOUT {
        return Err(invalid(
            field,
            timeout.as_secs(),
            format!("Timeout must be between 1 and {} seconds", MAX_TIMEOUT.as_secs()),
        ));
    }
    Ok(())
}

pub fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| invalid(field, endpoint, format!("Invalid URL format: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field,
            endpoint,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

/// `host` 或 `host:port`
pub fn validate_whois_server(field: &str, server: &str) -> Result<()> {
    let server = server.trim();
    if server.is_empty() {
        return Err(invalid(field, server, "WHOIS server cannot be empty"));
    }

    if let Some((host, port)) = server.rsplit_once(':') {
        if host.is_empty() || port.parse::<u16>().is_err() {
            return Err(invalid(field, server, "Expected host or host:port"));
        }
    }
    Ok(())
}

pub fn validate_selector(field: &str, selector: &str) -> Result<()> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| invalid(field, selector, format!("Invalid CSS selector: {}", e)))
}

pub fn validate_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}
