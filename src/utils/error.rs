use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrlError { url: String, reason: String },

    #[error("Feature schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatchError { expected: String, actual: String },

    #[error("Model error: {message}")]
    ModelError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Model,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DetectorError {
    /// 特徵數量不符
    pub fn feature_count(expected: usize, actual: usize) -> Self {
        Self::SchemaMismatchError {
            expected: format!("{} features", expected),
            actual: actual.to_string(),
        }
    }

    /// 欄位順序不符；`column` 為第一個不同的位置 (從 0 起算)
    pub fn feature_order(column: usize, expected: &str, actual: &str) -> Self {
        Self::SchemaMismatchError {
            expected: format!("'{}' at feature column {}", expected, column),
            actual: format!("'{}'", actual),
        }
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::ModelError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) => ErrorCategory::Network,
            Self::CsvError(_) | Self::SerializationError(_) | Self::InvalidUrlError { .. } => {
                ErrorCategory::Data
            }
            Self::IoError(_) => ErrorCategory::System,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::SchemaMismatchError { .. } | Self::ModelError { .. } => ErrorCategory::Model,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidUrlError { .. } => ErrorSeverity::Low,
            Self::HttpError(_) => ErrorSeverity::Medium,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::IoError(_)
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            // 模型與特徵順序不符時無法分類，屬致命錯誤
            Self::SchemaMismatchError { .. } | Self::ModelError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::HttpError(_) => "Check network connectivity and proxy settings",
            Self::CsvError(_) => "Make sure the dataset has an 'Index' column, the 30 feature columns and a 'class' column",
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => "The model artifact is not valid JSON; regenerate it with --save-model",
            Self::ConfigValidationError { .. } => "Fix the configuration file syntax",
            Self::InvalidConfigValueError { .. } => "Correct the configuration value and try again",
            Self::MissingConfigError { .. } => "Provide the missing option on the command line or in the config file",
            Self::InvalidUrlError { .. } => "Enter a full URL such as https://example.com/login",
            Self::SchemaMismatchError { .. } => "Use a model trained on the canonical 30-feature schema",
            Self::ModelError { .. } => "Check the model artifact and the --neighbors value",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Data => format!("Input problem: {}", self),
            ErrorCategory::Model => format!("Model problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, DetectorError>;

/// 單一查詢失敗；只在特徵擷取器內部流動，最終轉為不確定訊號
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("WHOIS query failed: {0}")]
    Whois(String),

    #[error("DNS resolution failed: {0}")]
    Dns(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid lookup target '{0}'")]
    InvalidTarget(String),
}

pub type LookupResult<T> = std::result::Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_is_critical() {
        let err = DetectorError::feature_count(30, 29);
        assert_eq!(err.category(), ErrorCategory::Model);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.to_string().contains("expected 30 features, got 29"));
    }

    #[test]
    fn test_feature_order_message_names_the_column() {
        let err = DetectorError::feature_order(1, "LongURL", "UsingIP");
        assert_eq!(
            err.to_string(),
            "Feature schema mismatch: expected 'LongURL' at feature column 1, got 'UsingIP'"
        );
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_user_friendly_message_mentions_category() {
        let err = DetectorError::MissingConfigError {
            field: "model.path".to_string(),
        };
        assert!(err.user_friendly_message().starts_with("Configuration problem"));
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
