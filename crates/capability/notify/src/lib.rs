//! 变更通知与报表导出。
//!
//! - [`Notifier`]: 标签状态变更后的邮件通知（SMTP 或空实现）
//! - [`PdfReportRenderer`]: 标签状态报表（PDF）
//!
//! 通知失败只影响响应中的 `emailSent`，不会回滚已经生效的写入。

mod email;
mod report;

pub use email::{SmtpNotifier, render_html_body, render_subject};
pub use report::{ExportReport, NOT_AVAILABLE, PdfReportRenderer, ReportRow, report_filename};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tracing::warn;

/// 时间展示格式（邮件正文、报表）。
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("smtp is not configured")]
    NotConfigured,
    #[error("invalid address: {0}")]
    Address(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("smtp transport failed: {0}")]
    Transport(String),
    #[error("failed to render report: {0}")]
    Render(String),
}

/// 一次状态变更的通知内容。
#[derive(Debug, Clone)]
pub struct StateChangeNotice {
    pub recipient: String,
    pub tag_name: String,
    /// 写入前的展示值；未能读取时为 `Unknown`。
    pub previous_state: String,
    pub new_state: String,
    pub changed_by: String,
    pub justification: String,
    pub changed_at: DateTime<Local>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_state_change(&self, notice: &StateChangeNotice) -> Result<(), NotifyError>;
}

/// 未配置 SMTP 时使用：只记录告警。
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify_state_change(&self, notice: &StateChangeNotice) -> Result<(), NotifyError> {
        warn!(
            target: "pitag.notify",
            tag_name = %notice.tag_name,
            recipient = %notice.recipient,
            "smtp not configured, notification skipped"
        );
        Err(NotifyError::NotConfigured)
    }
}
