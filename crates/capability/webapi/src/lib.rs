//! # PI Web API 客户端能力模块
//!
//! 对外只暴露两个接口：
//! - [`PointLocator`]：按标签名查找点位（WebId）
//! - [`ValueAccessor`]：按 WebId 读值、写值
//!
//! ## 外部接口
//!
//! ```text
//! GET  {base}/dataservers/{serverId}/points?nameFilter={tagName}
//!      → { "Items": [ { "WebId", "Name", "Path"?, "Descriptor"?, "PointClass"?, "PointType"? } ] }
//! GET  {base}/streams/{pointId}/value
//!      → { "Value": <any>, "Timestamp": "...", "UnitsAbbreviation"?, "Good"? }
//! POST {base}/streams/{pointId}/value
//!      ← { "Value": <any>, "Timestamp": "<ISO8601 UTC>" }
//! ```
//!
//! ## 失败分层
//!
//! - 参数为空：`WebApiError::InvalidArgument`，不发请求
//! - 传输失败 / 非成功状态 / 响应体无法解析：`WebApiError`，不重试
//! - 写值被 PI 以非成功状态拒绝：`Ok(false)`，不是错误

mod client;
mod error;
mod wire;

pub use client::{PiWebApiClient, WebApiConfig};
pub use error::WebApiError;

use async_trait::async_trait;
use domain::{Point, RawValue, TagValue};

/// 标签名 → 点位解析。
#[async_trait]
pub trait PointLocator: Send + Sync {
    /// 在 `server_id` 范围内按名称过滤搜索点位。
    ///
    /// `tag_name` 原样作为 `nameFilter` 发送（不去除空白）。
    /// 多个匹配时取 PI 返回顺序中的第一个，不做唯一性校验。
    /// 无匹配返回 `Ok(None)`。
    async fn find_point(&self, server_id: &str, tag_name: &str)
    -> Result<Option<Point>, WebApiError>;
}

/// 点位读写。
#[async_trait]
pub trait ValueAccessor: Send + Sync {
    async fn read_value(&self, point_id: &str) -> Result<TagValue, WebApiError>;

    /// 写入新值，时间戳取当前 UTC。
    ///
    /// PI 返回成功状态时为 `true`，非成功状态为 `false`。
    async fn write_value(&self, point_id: &str, value: &RawValue) -> Result<bool, WebApiError>;
}
