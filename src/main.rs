use clap::Parser;
use tour_admin::utils::error::{AdminError, ErrorSeverity};
use tour_admin::utils::logger;
use tour_admin::{AdminApp, CliConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::debug!("CLI config: {:?}", config.command);

    // 合併設定檔與命令列參數並驗證
    let settings = match config.resolve_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_with(&e);
        }
    };

    let app = match AdminApp::bootstrap(settings).await {
        Ok(app) => app,
        Err(e) => exit_with(&e),
    };

    let mut stdout = std::io::stdout();
    if let Err(e) = app.execute(config.command, &mut stdout).await {
        exit_with(&e);
    }

    Ok(())
}

fn exit_with(e: &AdminError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
