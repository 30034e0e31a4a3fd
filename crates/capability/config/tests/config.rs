use pitag_config::{AppConfig, ConfigError, ConfirmMode};

// 环境变量为进程级全局状态，所有场景放在同一个测试里顺序执行。
#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("PITAG_WEBAPI_BASE_URL", "https://pi.example.com/piwebapi");
        std::env::set_var("PITAG_DATA_SERVER_WEBID", "F1DS-server");
        std::env::set_var("PITAG_HTTP_ADDR", "127.0.0.1:8081");
        std::env::set_var("PITAG_CONFIRM_MODE", "poll");
        std::env::set_var("PITAG_CONFIRM_DELAY_MS", "250");
        std::env::set_var("PITAG_SMTP_HOST", "mail.example.com");
        std::env::set_var("PITAG_SMTP_SENDER", "pi-tags@example.com");
        std::env::set_var("PITAG_REPORT_FONT_PATH", "/usr/share/fonts/DejaVuSans.ttf");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8081");
    assert_eq!(config.data_server_web_id, "F1DS-server");
    assert_eq!(config.webapi_timeout_seconds, 30);
    assert_eq!(config.confirm_mode, ConfirmMode::Poll);
    assert_eq!(config.confirm_delay_ms, 250);
    assert_eq!(config.confirm_max_attempts, 5);
    assert_eq!(
        config.report_font_path.as_deref(),
        Some("/usr/share/fonts/DejaVuSans.ttf")
    );
    let smtp = config.smtp.expect("smtp");
    assert_eq!(smtp.port, 25);
    assert_eq!(smtp.sender_name, "PI Tag Manager");

    unsafe {
        std::env::set_var("PITAG_CONFIRM_MODE", "sometimes");
    }
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::Invalid(key, _)) if key == "PITAG_CONFIRM_MODE"
    ));

    unsafe {
        std::env::remove_var("PITAG_CONFIRM_MODE");
        std::env::remove_var("PITAG_SMTP_SENDER");
    }
    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.confirm_mode, ConfirmMode::FixedDelay);
    assert!(config.smtp.is_none());

    unsafe {
        std::env::remove_var("PITAG_DATA_SERVER_WEBID");
    }
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::Missing(key)) if key == "PITAG_DATA_SERVER_WEBID"
    ));
}
