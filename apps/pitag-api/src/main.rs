//! pitag-api 启动入口。

use pitag_api::{AppState, build_app};
use pitag_config::{AppConfig, ConfirmMode};
use pitag_control::{ConfirmationPolicy, DigitalStateChanger, TagReader};
use pitag_directory::{TagCatalog, TagDirectory};
use pitag_notify::{NoopNotifier, Notifier, PdfReportRenderer, SmtpNotifier};
use pitag_telemetry::init_tracing;
use pitag_webapi::{PiWebApiClient, WebApiConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    let client = Arc::new(PiWebApiClient::new(WebApiConfig {
        base_url: config.webapi_base_url.clone(),
        timeout: Duration::from_secs(config.webapi_timeout_seconds),
        username: config.webapi_username.clone(),
        password: config.webapi_password.clone(),
        accept_invalid_certs: config.webapi_accept_invalid_certs,
    })?);

    let changer = DigitalStateChanger::with_policy(
        client.clone(),
        client.clone(),
        confirmation_policy(&config),
    );
    let reader = TagReader::new(client.clone(), client);

    let catalog = match &config.catalog_path {
        Some(path) => TagCatalog::from_file(path)?,
        None => TagCatalog::builtin(),
    };
    info!(target: "pitag.api", tags = catalog.len(), "tag_catalog_ready");

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
        None => {
            warn!(target: "pitag.api", "smtp not configured, email notifications disabled");
            Arc::new(NoopNotifier)
        }
    };

    let renderer = match &config.report_font_path {
        Some(path) => PdfReportRenderer::with_font_file(path)?,
        None => PdfReportRenderer::new(),
    };

    let state = AppState {
        server_id: Arc::from(config.data_server_web_id.as_str()),
        changer,
        reader,
        directory: Arc::new(TagDirectory::new(catalog)),
        notifier,
        renderer,
    };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "pitag.api", addr = %config.http_addr, "http_server_listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn confirmation_policy(config: &AppConfig) -> ConfirmationPolicy {
    let delay = Duration::from_millis(config.confirm_delay_ms);
    match config.confirm_mode {
        ConfirmMode::None => ConfirmationPolicy::None,
        ConfirmMode::FixedDelay => ConfirmationPolicy::FixedDelay(delay),
        ConfirmMode::Poll => ConfirmationPolicy::Poll {
            interval: delay,
            max_attempts: config.confirm_max_attempts,
        },
    }
}
