//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 标签当前值返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagValueDto {
    pub value: String,
    pub timestamp: String,
    pub good: bool,
    pub units_abbreviation: Option<String>,
    pub display_value: String,
}

/// 标签状态变更请求体（含审计字段）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagRequest {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub new_state: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub justification: String,
    pub user: Option<String>,
}

/// 变更后确认读到的值。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedTagDataDto {
    pub value: String,
    pub timestamp: String,
    pub good: bool,
}

/// 标签状态变更返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagResponse {
    pub message: String,
    pub email_sent: bool,
    pub updated_tag_data: Option<UpdatedTagDataDto>,
}

/// 直接写值请求体（无审计、无确认读）。
#[derive(Debug, Deserialize)]
pub struct SetTagValueRequest {
    pub value: serde_json::Value,
}

/// 直接写值返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWriteResultDto {
    pub tag_name: String,
    pub web_id: String,
}

/// 报表导出的单个标签。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTagInfo {
    #[serde(default)]
    pub tag_name: String,
    pub new_state: Option<String>,
}

/// PDF 报表导出请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPdfRequest {
    #[serde(default)]
    pub tags: Vec<ExportTagInfo>,
    pub user: Option<String>,
    pub email: Option<String>,
    pub justification: Option<String>,
}

/// 当前操作人。
#[derive(Debug, Serialize)]
pub struct CurrentUserDto {
    pub user: String,
}

/// 指标快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
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
