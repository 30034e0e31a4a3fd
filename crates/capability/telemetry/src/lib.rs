//! 追踪与请求 ID 生成。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub tag_reads: u64,
    pub writes_accepted: u64,
    pub writes_rejected: u64,
    pub state_changes_succeeded: u64,
    pub state_changes_failed: u64,
    pub confirmation_failures: u64,
    pub notifications_sent: u64,
    pub notifications_failed: u64,
    pub reports_generated: u64,
}

/// 基础指标。
pub struct TelemetryMetrics {
    tag_reads: AtomicU64,
    writes_accepted: AtomicU64,
    writes_rejected: AtomicU64,
    state_changes_succeeded: AtomicU64,
    state_changes_failed: AtomicU64,
    confirmation_failures: AtomicU64,
    notifications_sent: AtomicU64,
    notifications_failed: AtomicU64,
    reports_generated: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            tag_reads: AtomicU64::new(0),
            writes_accepted: AtomicU64::new(0),
            writes_rejected: AtomicU64::new(0),
            state_changes_succeeded: AtomicU64::new(0),
            state_changes_failed: AtomicU64::new(0),
            confirmation_failures: AtomicU64::new(0),
            notifications_sent: AtomicU64::new(0),
            notifications_failed: AtomicU64::new(0),
            reports_generated: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tag_reads: self.tag_reads.load(Ordering::Relaxed),
            writes_accepted: self.writes_accepted.load(Ordering::Relaxed),
            writes_rejected: self.writes_rejected.load(Ordering::Relaxed),
            state_changes_succeeded: self.state_changes_succeeded.load(Ordering::Relaxed),
            state_changes_failed: self.state_changes_failed.load(Ordering::Relaxed),
            confirmation_failures: self.confirmation_failures.load(Ordering::Relaxed),
            notifications_sent: self.notifications_sent.load(Ordering::Relaxed),
            notifications_failed: self.notifications_failed.load(Ordering::Relaxed),
            reports_generated: self.reports_generated.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录一次成功读值。
pub fn record_tag_read() {
    metrics().tag_reads.fetch_add(1, Ordering::Relaxed);
}

/// 记录 PI 接受的写入。
pub fn record_write_accepted() {
    metrics().writes_accepted.fetch_add(1, Ordering::Relaxed);
}

/// 记录 PI 以非成功状态拒绝的写入。
pub fn record_write_rejected() {
    metrics().writes_rejected.fetch_add(1, Ordering::Relaxed);
}

/// 记录状态变更成功。
pub fn record_state_change_succeeded() {
    metrics()
        .state_changes_succeeded
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录状态变更失败（未找到、被拒绝或内部错误）。
pub fn record_state_change_failed() {
    metrics()
        .state_changes_failed
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录写入后确认读失败。
pub fn record_confirmation_failure() {
    metrics()
        .confirmation_failures
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_notification_sent() {
    metrics().notifications_sent.fetch_add(1, Ordering::Relaxed);
}

pub fn record_notification_failed() {
    metrics()
        .notifications_failed
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_report_generated() {
    metrics().reports_generated.fetch_add(1, Ordering::Relaxed);
}
