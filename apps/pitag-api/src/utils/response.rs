//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：bad_request_error, not_found_error, update_failed_error, webapi_error, internal_error
//! - DTO 转换：tag_value_to_dto, updated_tag_to_dto
//!
//! 所有错误返回统一的 ApiResponse 格式，HTTP 状态码与错误码对应。

use api_contract::{ApiResponse, TagValueDto, UpdatedTagDataDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::TagValue;
use pitag_webapi::WebApiError;
use serde::Serialize;

/// 成功响应
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 标签未找到
pub fn not_found_error(tag_name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(
            "TAG.NOT_FOUND",
            format!("tag '{tag_name}' not found"),
        )),
    )
        .into_response()
}

/// 状态变更失败（被拒绝或流程故障），对外统一为同一条消息
pub fn update_failed_error(code: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(code, "Failed to update tag")),
    )
        .into_response()
}

/// PI Web API 错误响应
pub fn webapi_error(err: WebApiError) -> Response {
    let (status, code) = match &err {
        WebApiError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "INVALID.REQUEST"),
        WebApiError::Timeout(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PI.TIMEOUT"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "PI.ERROR"),
    };
    (status, Json(ApiResponse::<()>::error(code, err.to_string()))).into_response()
}

/// 内部错误响应
pub fn internal_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message.into())),
    )
        .into_response()
}

/// TagValue 转 TagValueDto（`value` 与 `displayValue` 同为展示文本）
pub fn tag_value_to_dto(value: TagValue) -> TagValueDto {
    let display_value = value.display_value();
    TagValueDto {
        value: display_value.clone(),
        timestamp: value.timestamp,
        good: value.good,
        units_abbreviation: value.units_abbreviation,
        display_value,
    }
}

pub fn updated_tag_to_dto(value: TagValue) -> UpdatedTagDataDto {
    UpdatedTagDataDto {
        value: value.display_value(),
        timestamp: value.timestamp,
        good: value.good,
    }
}
