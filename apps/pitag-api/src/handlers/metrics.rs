//! Telemetry 指标快照。
//!
//! - GET /metrics

use crate::utils::ok;
use api_contract::MetricsSnapshotDto;
use axum::response::Response;
use pitag_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    ok(MetricsSnapshotDto {
        tag_reads: snapshot.tag_reads,
        writes_accepted: snapshot.writes_accepted,
        writes_rejected: snapshot.writes_rejected,
        state_changes_succeeded: snapshot.state_changes_succeeded,
        state_changes_failed: snapshot.state_changes_failed,
        confirmation_failures: snapshot.confirmation_failures,
        notifications_sent: snapshot.notifications_sent,
        notifications_failed: snapshot.notifications_failed,
        reports_generated: snapshot.reports_generated,
    })
}
