use clap::Parser;
use commerce_cta::adapters::build_http_client;
use commerce_cta::app::{run_quiz, run_resolve};
use commerce_cta::config::Command;
use commerce_cta::utils::error::{CommerceError, ErrorSeverity};
use commerce_cta::utils::{logger, validation::Validate};
use commerce_cta::{CliConfig, CommerceConfig};

fn exit_with(e: &CommerceError, context: &str) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting commerce-cta CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📋 Loading configuration from: {}", path.display());
            CommerceConfig::from_file(path).unwrap_or_else(|e| exit_with(&e, "Configuration loading"))
        }
        None => CommerceConfig::default(),
    };
    if let Err(e) = cli.validate().and_then(|_| config.validate()) {
        exit_with(&e, "Configuration validation");
    }

    let client = build_http_client(config.service.timeout_seconds)
        .unwrap_or_else(|e| exit_with(&e, "HTTP client setup"));

    match &cli.command {
        Command::Resolve(args) => match run_resolve(&config, &client, args).await {
            Ok(report) => {
                match &report.action {
                    Some(action) => tracing::info!("✅ Checkout action resolved: {}", action.url()),
                    None => tracing::info!("✅ No checkout action override"),
                }
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Err(e) => exit_with(&e, "Resolve"),
        },
        Command::Quiz(args) => match run_quiz(&config, &client, args).await {
            Ok(summary) => {
                tracing::info!(
                    "✅ Quiz data loaded: {} questions, {} strings",
                    summary.questions,
                    summary.strings
                );
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            Err(e) => exit_with(&e, "Quiz data load"),
        },
    }

    Ok(())
}
