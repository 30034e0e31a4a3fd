//! 报表导出
//!
//! - POST /api/tags/export-pdf
//!
//! 对每个非空标签名读取当前值；读取失败的单元格显示 `N/A`，不影响整体导出。

use crate::AppState;
use crate::utils::{bad_request_error, internal_error, normalize_optional};
use api_contract::ExportPdfRequest;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Local;
use pitag_notify::{ExportReport, NOT_AVAILABLE, ReportRow, report_filename};
use tracing::{error, info, warn};

pub async fn export_pdf(
    State(state): State<AppState>,
    Json(req): Json<ExportPdfRequest>,
) -> Response {
    if req.tags.is_empty() {
        return bad_request_error("No tags provided for export");
    }
    let exported_at = Local::now();

    let mut rows = Vec::with_capacity(req.tags.len());
    for tag in &req.tags {
        let tag_name = tag.tag_name.trim();
        if tag_name.is_empty() {
            continue;
        }
        let current = match state.reader.get_value(&state.server_id, tag_name).await {
            Ok(value) => value,
            Err(err) => {
                warn!(target: "pitag.api", tag_name, error = %err, "report_value_unavailable");
                None
            }
        };
        rows.push(ReportRow {
            tag_name: tag_name.to_string(),
            status: normalize_optional(tag.new_state.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            good: current
                .as_ref()
                .map(|value| if value.good { "True" } else { "False" }.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            previous_status: current
                .map(|value| value.display_value())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        });
    }

    let report = ExportReport {
        user: normalize_optional(req.user),
        email: normalize_optional(req.email),
        justification: normalize_optional(req.justification),
        exported_at,
        rows,
    };
    let renderer = state.renderer.clone();
    let rendered = tokio::task::spawn_blocking(move || renderer.render(&report)).await;
    let bytes = match rendered {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(err)) => {
            error!(target: "pitag.api", error = %err, "report_render_failed");
            return internal_error(err.to_string());
        }
        Err(err) => {
            error!(target: "pitag.api", error = %err, "report_task_failed");
            return internal_error("report rendering aborted");
        }
    };

    let filename = report_filename(&exported_at);
    info!(target: "pitag.api", filename = %filename, bytes = bytes.len(), "report_exported");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
