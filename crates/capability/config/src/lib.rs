//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 写入后的确认方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    /// 不做确认读。
    None,
    /// 固定等待后读一次。
    FixedDelay,
    /// 按间隔轮询，直到读到目标状态或次数用尽。
    Poll,
}

/// SMTP 通知配置。仅当 host 与发件人均配置时启用。
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tls: bool,
    pub sender: String,
    pub sender_name: String,
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub webapi_base_url: String,
    pub data_server_web_id: String,
    pub webapi_timeout_seconds: u64,
    pub webapi_username: Option<String>,
    pub webapi_password: Option<String>,
    pub webapi_accept_invalid_certs: bool,
    pub confirm_mode: ConfirmMode,
    pub confirm_delay_ms: u64,
    pub confirm_max_attempts: u32,
    pub catalog_path: Option<String>,
    /// 报表嵌入字体（TTF），用于非 Latin-1 文本。
    pub report_font_path: Option<String>,
    pub smtp: Option<SmtpConfig>,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let webapi_base_url = read_required("PITAG_WEBAPI_BASE_URL")?;
        let data_server_web_id = read_required("PITAG_DATA_SERVER_WEBID")?;
        let http_addr =
            env::var("PITAG_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let webapi_timeout_seconds = read_u64_with_default("PITAG_WEBAPI_TIMEOUT_SECONDS", 30)?;
        if webapi_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "PITAG_WEBAPI_TIMEOUT_SECONDS".to_string(),
                "0".to_string(),
            ));
        }
        let webapi_username = read_optional("PITAG_WEBAPI_USERNAME");
        let webapi_password = read_optional("PITAG_WEBAPI_PASSWORD");
        let webapi_accept_invalid_certs =
            read_bool_with_default("PITAG_WEBAPI_ACCEPT_INVALID_CERTS", false);
        let confirm_mode = read_confirm_mode("PITAG_CONFIRM_MODE")?;
        let confirm_delay_ms = read_u64_with_default("PITAG_CONFIRM_DELAY_MS", 1000)?;
        let confirm_max_attempts = read_u32_with_default("PITAG_CONFIRM_MAX_ATTEMPTS", 5)?;
        let catalog_path = read_optional("PITAG_CATALOG_PATH");
        let report_font_path = read_optional("PITAG_REPORT_FONT_PATH");
        let smtp = read_smtp()?;

        Ok(Self {
            http_addr,
            webapi_base_url,
            data_server_web_id,
            webapi_timeout_seconds,
            webapi_username,
            webapi_password,
            webapi_accept_invalid_certs,
            confirm_mode,
            confirm_delay_ms,
            confirm_max_attempts,
            catalog_path,
            report_font_path,
            smtp,
        })
    }
}

fn read_smtp() -> Result<Option<SmtpConfig>, ConfigError> {
    let (Some(host), Some(sender)) = (
        read_optional("PITAG_SMTP_HOST"),
        read_optional("PITAG_SMTP_SENDER"),
    ) else {
        return Ok(None);
    };
    Ok(Some(SmtpConfig {
        host,
        port: read_u16_with_default("PITAG_SMTP_PORT", 25)?,
        username: read_optional("PITAG_SMTP_USERNAME"),
        password: read_optional("PITAG_SMTP_PASSWORD"),
        tls: read_bool_with_default("PITAG_SMTP_TLS", false),
        sender,
        sender_name: env::var("PITAG_SMTP_SENDER_NAME")
            .unwrap_or_else(|_| "PI Tag Manager".to_string()),
    }))
}

fn read_required(key: &str) -> Result<String, ConfigError> {
    read_optional(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

fn read_confirm_mode(key: &str) -> Result<ConfirmMode, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(ConfirmMode::FixedDelay),
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "none" | "off" => Ok(ConfirmMode::None),
        "fixed" | "delay" => Ok(ConfirmMode::FixedDelay),
        "poll" => Ok(ConfirmMode::Poll),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
