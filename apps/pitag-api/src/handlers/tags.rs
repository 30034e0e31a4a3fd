//! 标签 handlers
//!
//! - GET /api/tags/{tagName} - 读当前值
//! - POST /api/tags/update - 审计式状态变更 + 邮件通知
//! - POST /api/tags/{tagName}/value - 直接写值（无确认读）
//! - GET /api/tags/search/{filter} - 目录搜索
//! - GET /api/tags/list - 目录前 20 条
//! - GET /api/tags/current-user - 反向代理注入的当前用户

use crate::AppState;
use crate::utils::{
    bad_request_error, normalize_required, not_found_error, ok, tag_value_to_dto,
    update_failed_error, updated_tag_to_dto, webapi_error,
};
use api_contract::{
    CurrentUserDto, SetTagValueRequest, TagWriteResultDto, UpdateTagRequest, UpdateTagResponse,
};
use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use chrono::Local;
use domain::{ChangeRequest, RawValue};
use pitag_control::StateChangeOutcome;
use pitag_notify::StateChangeNotice;
use tracing::{error, info, warn};

/// 写入前读数缺失时通知中使用的占位值。
const UNKNOWN_STATE: &str = "Unknown";

/// 当前用户的候选请求头，按优先级排列。
const USER_HEADERS: [&str; 3] = ["x-forwarded-email", "x-forwarded-user", "x-remote-user"];

/// 读标签当前值
pub async fn get_tag_value(
    State(state): State<AppState>,
    Path(tag_name): Path<String>,
) -> Response {
    let tag_name = match normalize_required(&tag_name, "tagName") {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state.reader.get_value(&state.server_id, &tag_name).await {
        Ok(Some(value)) => {
            info!(target: "pitag.api", tag_name = %tag_name, "tag_value_returned");
            ok(tag_value_to_dto(value))
        }
        Ok(None) => not_found_error(&tag_name),
        Err(err) => {
            error!(target: "pitag.api", tag_name = %tag_name, error = %err, "tag_value_failed");
            webapi_error(err)
        }
    }
}

/// 审计式状态变更
pub async fn update_tag(
    State(state): State<AppState>,
    Json(req): Json<UpdateTagRequest>,
) -> Response {
    let request = match ChangeRequest::audited(
        &req.tag_name,
        &req.new_state,
        &req.email,
        &req.justification,
        req.user.as_deref(),
    ) {
        Ok(request) => request,
        Err(_) => {
            return bad_request_error(
                "Tag name, new state, email, and justification are required",
            );
        }
    };
    info!(
        target: "pitag.api",
        tag_name = %request.tag_name,
        new_state = %request.new_state,
        user = %request.user,
        "tag_update_requested"
    );

    let outcome = match state
        .changer
        .change_state(&state.server_id, &request.tag_name, &request.new_state)
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => return bad_request_error(err.to_string()),
    };

    match outcome {
        StateChangeOutcome::Changed {
            previous,
            confirmed,
            ..
        } => {
            let notice = StateChangeNotice {
                recipient: request.email.clone(),
                tag_name: request.tag_name.clone(),
                previous_state: previous
                    .map(|value| value.display_value())
                    .unwrap_or_else(|| UNKNOWN_STATE.to_string()),
                new_state: request.new_state.clone(),
                changed_by: request.user.clone(),
                justification: request.justification.clone(),
                changed_at: Local::now(),
            };
            let email_sent = match state.notifier.notify_state_change(&notice).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        target: "pitag.api",
                        tag_name = %request.tag_name,
                        error = %err,
                        "tag_update_notification_not_sent"
                    );
                    false
                }
            };
            ok(UpdateTagResponse {
                message: "Tag updated successfully".to_string(),
                email_sent,
                updated_tag_data: confirmed.map(updated_tag_to_dto),
            })
        }
        StateChangeOutcome::NotFound => not_found_error(&request.tag_name),
        StateChangeOutcome::Rejected { point } => {
            warn!(target: "pitag.api", point = %point, "tag_update_rejected");
            update_failed_error("TAG.UPDATE_REJECTED")
        }
        StateChangeOutcome::Failed { cause } => {
            error!(
                target: "pitag.api",
                tag_name = %request.tag_name,
                cause = %cause,
                "tag_update_failed"
            );
            update_failed_error("TAG.UPDATE_FAILED")
        }
    }
}

/// 直接写值
pub async fn set_tag_value(
    State(state): State<AppState>,
    Path(tag_name): Path<String>,
    Json(req): Json<SetTagValueRequest>,
) -> Response {
    let tag_name = match normalize_required(&tag_name, "tagName") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let value = RawValue::from(req.value);
    let outcome = match state
        .changer
        .set_value(&state.server_id, &tag_name, &value)
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => return bad_request_error(err.to_string()),
    };
    match outcome {
        StateChangeOutcome::Changed { point, .. } => ok(TagWriteResultDto {
            tag_name: point.name,
            web_id: point.web_id,
        }),
        StateChangeOutcome::NotFound => not_found_error(&tag_name),
        StateChangeOutcome::Rejected { .. } => update_failed_error("TAG.UPDATE_REJECTED"),
        StateChangeOutcome::Failed { .. } => update_failed_error("TAG.UPDATE_FAILED"),
    }
}

/// 目录搜索（关键字少于 2 个字符时返回空列表）
pub async fn search_tags(State(state): State<AppState>, Path(filter): Path<String>) -> Response {
    let tags = state.directory.search(&filter);
    info!(target: "pitag.api", filter = %filter, found = tags.len(), "tag_search");
    ok(tags)
}

/// 目录前 20 条
pub async fn list_tags(State(state): State<AppState>) -> Response {
    ok(state.directory.list_all())
}

pub async fn current_user(headers: HeaderMap) -> Response {
    ok(CurrentUserDto {
        user: resolve_current_user(&headers),
    })
}

fn resolve_current_user(headers: &HeaderMap) -> String {
    USER_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
