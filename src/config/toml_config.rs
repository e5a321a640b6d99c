use crate::config::settings::Settings;
use crate::utils::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub model: ModelConfig,
    pub http: HttpConfig,
    pub whois: WhoisConfig,
    pub dns: DnsConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: Option<String>,
    pub neighbors: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WhoisConfig {
    pub server: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: Option<String>,
    pub result_selector: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DetectorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| DetectorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SEARCH_ENDPOINT})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 把檔案中有設定的值覆蓋到執行設定上
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(path) = &self.model.path {
            settings.model_path = Some(path.clone());
        }
        if let Some(neighbors) = self.model.neighbors {
            settings.neighbors = neighbors;
        }
        if let Some(secs) = self.http.timeout_seconds {
            settings.http_timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = &self.http.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(server) = &self.whois.server {
            settings.whois_server = server.clone();
        }
        if let Some(secs) = self.whois.timeout_seconds {
            settings.whois_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.dns.timeout_seconds {
            settings.dns_timeout = Duration::from_secs(secs);
        }
        if let Some(endpoint) = &self.search.endpoint {
            settings.search_endpoint = endpoint.clone();
        }
        if let Some(selector) = &self.search.result_selector {
            settings.search_result_selector = selector.clone();
        }
        if let Some(secs) = self.search.timeout_seconds {
            settings.search_timeout = Duration::from_secs(secs);
        }
    }
}
