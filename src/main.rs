use clap::Parser;
use phish_detect::utils::error::ErrorSeverity;
use phish_detect::utils::{logger, validation::Validate};
use phish_detect::{
    CliConfig, DetectorError, FeatureVector, KnnModel, Label, LiveFeatureExtractor,
    PhishingDetector, Result,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

type Detector = PhishingDetector<LiveFeatureExtractor, KnnModel>;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting phish-detect");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let detector = match build_detector(&config) {
        Ok(detector) => detector,
        Err(e) => exit_with(&e),
    };

    if config.urls.is_empty() {
        run_session(&detector, &config).await?;
    } else {
        for url in &config.urls {
            report(&detector, url, &config).await;
        }
    }

    Ok(())
}

fn build_detector(config: &CliConfig) -> Result<Detector> {
    let settings = config.settings()?;
    settings.validate()?;

    // 模型只在啟動時載入一次，之後唯讀
    let model = KnnModel::load(settings.model_path()?, settings.neighbors)?;
    tracing::debug!("Model feature columns: {}", model.feature_names().join(","));
    if let Some(path) = &config.save_model {
        model.save(path)?;
        tracing::info!("Model artifact written to {}", path);
    }

    let extractor = LiveFeatureExtractor::from_settings(&settings)?;
    PhishingDetector::new(extractor, model)
}

fn exit_with(e: &DetectorError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

/// 一行一個網址；錯誤只顯示訊息，不中斷整個工作階段
async fn run_session(detector: &Detector, config: &CliConfig) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        if !config.json {
            stdout.write_all(b"Enter the URL: ").await?;
            stdout.flush().await?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let url = line.trim();
        if url.is_empty() {
            eprintln!("⚠️ Please enter a URL.");
            continue;
        }

        report(detector, url, config).await;
    }

    Ok(())
}

async fn report(detector: &Detector, url: &str, config: &CliConfig) {
    let features = match detector.features(url).await {
        Ok(features) => features,
        Err(e) => {
            tracing::error!("Feature extraction failed for {}: {}", url, e);
            eprintln!("❌ An error occurred during feature extraction: {}", e);
            return;
        }
    };

    let label = match detector.predict(&features) {
        Ok(label) => label,
        Err(e) => {
            tracing::error!("Prediction failed for {}: {}", url, e);
            eprintln!("❌ An error occurred during prediction: {}", e);
            return;
        }
    };

    if config.json {
        print_json(url, &features, label);
    } else {
        print_text(url, &features, label, config.features);
    }
}

fn print_json(url: &str, features: &FeatureVector, label: Label) {
    let report = serde_json::json!({
        "url": url,
        "label": label,
        "verdict": label.verdict(),
        "features": features,
    });
    println!("{}", report);
}

fn print_text(url: &str, features: &FeatureVector, label: Label, show_features: bool) {
    if show_features {
        println!("Features for {}:", url);
        for (name, signal) in features.iter() {
            println!("  {:<20} {:>2}", name.as_str(), signal.encode());
        }
    }

    match label {
        Label::Phishing => println!("🚨 Result: {}", label),
        Label::Legitimate => println!("✅ Result: {}", label),
    }
}
