use clap::Parser;
use license_verify::utils::error::ErrorCategory;
use license_verify::utils::logger;
use license_verify::{CheckOutcome, CliConfig, LicenseNumber, VerificationClient, VerificationOutcome};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting license-verify CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let client = match cli.resolve().and_then(VerificationClient::new) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code(e.category()));
        }
    };

    let license = LicenseNumber::new(cli.license.clone());
    let result = client.verify_license(&license).await;

    if cli.json {
        let outcome = match &result {
            Ok(outcome) => CheckOutcome::from(outcome.clone()),
            Err(_) => CheckOutcome::Unavailable,
        };
        println!("{}", outcome.to_json());
    }

    match result {
        Ok(VerificationOutcome::Matched(record)) => {
            if !cli.json {
                println!("✅ {} - {} ({})", record.name, record.license_type, record.status);
                println!("📄 License number: {}", record.license_number);
            }
        }
        Ok(VerificationOutcome::NoMatch) => {
            if !cli.json {
                println!("🔍 No registry record for license {}", license);
            }
            std::process::exit(4);
        }
        Err(e) => {
            tracing::error!(
                "❌ Verification failed: {} (Category: {:?}, Retryable: {})",
                e,
                e.category(),
                e.is_retryable()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            if !cli.json {
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
            }
            std::process::exit(exit_code(e.category()));
        }
    }
}

// 根據錯誤類別決定退出碼
fn exit_code(category: ErrorCategory) -> i32 {
    match category {
        ErrorCategory::Upstream => 2,
        ErrorCategory::Integration | ErrorCategory::Blocked => 1,
        ErrorCategory::Configuration | ErrorCategory::System => 3,
    }
}
