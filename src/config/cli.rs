use crate::config::settings::Settings;
use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "phish-detect")]
#[command(about = "Classify URLs as phishing or legitimate with a kNN model")]
pub struct CliConfig {
    /// URL to classify (repeatable); reads URLs from stdin when omitted
    #[arg(short, long = "url")]
    pub urls: Vec<String>,

    /// Model artifact (.json) or labelled dataset (.csv)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Neighbour count when loading a .csv dataset
    #[arg(long)]
    pub neighbors: Option<usize>,

    /// Timeout in seconds for every network lookup
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the named feature vector
    #[arg(long)]
    pub features: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the loaded model as a JSON artifact to this path
    #[arg(long)]
    pub save_model: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    /// 預設值 → 設定檔 → 命令列
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(path) = &self.config {
            tracing::info!("Loading configuration from: {}", path);
            TomlConfig::from_file(path)?.apply_to(&mut settings);
        }

        if let Some(model) = &self.model {
            settings.model_path = Some(model.clone());
        }
        if let Some(neighbors) = self.neighbors {
            settings.neighbors = neighbors;
        }
        if let Some(secs) = self.timeout {
            settings.set_timeout(Duration::from_secs(secs));
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_overrides_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[model]\npath = \"from_file.json\"\nneighbors = 3\n\n[http]\ntimeout_seconds = 2\n")
            .unwrap();
        let config_path = file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "phish-detect",
            "--config",
            &config_path,
            "--model",
            "from_cli.csv",
            "--timeout",
            "8",
            "-u",
            "https://example.com",
        ]);
        let settings = cli.settings().unwrap();

        assert_eq!(settings.model_path.as_deref(), Some("from_cli.csv"));
        assert_eq!(settings.neighbors, 3);
        assert_eq!(settings.http_timeout, Duration::from_secs(8));
        assert_eq!(cli.urls, vec!["https://example.com".to_string()]);
    }

    #[test]
    fn test_missing_config_file() {
        let cli = CliConfig::parse_from(["phish-detect", "--config", "/nonexistent/phish.toml"]);
        assert!(cli.settings().is_err());
    }
}
