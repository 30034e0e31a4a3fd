//! PI Web API HTTP 客户端实现
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let client = PiWebApiClient::new(WebApiConfig {
//!     base_url: "https://pi.example.com/piwebapi".to_string(),
//!     timeout: Duration::from_secs(30),
//!     username: None,
//!     password: None,
//!     accept_invalid_certs: false,
//! })?;
//! let point = client.find_point(&server_id, "KTL-FWS-K-260.MV").await?;
//! ```

use crate::error::WebApiError;
use crate::wire::{PointSearchResponse, StreamValueResponse, WriteValueRequest};
use crate::{PointLocator, ValueAccessor};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use domain::{Point, RawValue, TagValue, require_non_empty};
use pitag_telemetry::{record_tag_read, record_write_accepted, record_write_rejected};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// PI Web API 客户端配置
#[derive(Debug, Clone)]
pub struct WebApiConfig {
    /// 基础地址，如 `https://pi.example.com/piwebapi`
    pub base_url: String,
    /// 单次调用超时
    pub timeout: Duration,
    /// 基本认证用户名（可选）
    pub username: Option<String>,
    pub password: Option<String>,
    /// 接受自签名证书
    pub accept_invalid_certs: bool,
}

/// PI Web API 客户端。无状态，可在请求间共享。
#[derive(Debug, Clone)]
pub struct PiWebApiClient {
    client: Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl PiWebApiClient {
    pub fn new(config: WebApiConfig) -> Result<Self, WebApiError> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|err| WebApiError::Config(format!("invalid base url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(WebApiError::Config(format!(
                "base url cannot be a base: {base_url}"
            )));
        }
        if config.accept_invalid_certs {
            warn!(target: "pitag.webapi", "certificate verification disabled");
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("pitag/{}", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|err| WebApiError::Config(format!("failed to build http client: {err}")))?;
        info!(target: "pitag.webapi", base_url = %base_url, "webapi_client_initialized");
        Ok(Self {
            client,
            base_url,
            username: config.username,
            password: config.password,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, WebApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| WebApiError::Config(format!("base url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(username) => builder.basic_auth(username, self.password.as_deref()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, WebApiError> {
        self.authorize(builder)
            .send()
            .await
            .map_err(WebApiError::from_reqwest)
    }
}

#[async_trait]
impl PointLocator for PiWebApiClient {
    async fn find_point(
        &self,
        server_id: &str,
        tag_name: &str,
    ) -> Result<Option<Point>, WebApiError> {
        let server_id = require_non_empty(server_id, "dataServerWebId")?;
        // 仅校验非空；nameFilter 按调用方原样发送
        require_non_empty(tag_name, "tagName")?;
        let url = self.endpoint(&["dataservers", server_id, "points"])?;
        debug!(target: "pitag.webapi", url = %url, tag_name, "point_search");

        let response = self
            .send(self.client.get(url).query(&[("nameFilter", tag_name)]))
            .await?;
        let body: PointSearchResponse = decode(ensure_success(response).await?).await?;

        let Some(item) = body.items.into_iter().next() else {
            info!(target: "pitag.webapi", tag_name, "point_not_found");
            return Ok(None);
        };
        let point = Point::from(item);
        info!(
            target: "pitag.webapi",
            tag_name,
            point_name = %point.name,
            web_id = %point.web_id,
            "point_found"
        );
        Ok(Some(point))
    }
}

#[async_trait]
impl ValueAccessor for PiWebApiClient {
    async fn read_value(&self, point_id: &str) -> Result<TagValue, WebApiError> {
        let point_id = require_non_empty(point_id, "pointWebId")?;
        let url = self.endpoint(&["streams", point_id, "value"])?;
        debug!(target: "pitag.webapi", url = %url, "value_read");

        let response = self.send(self.client.get(url)).await?;
        let body: StreamValueResponse = decode(ensure_success(response).await?).await?;
        let value = TagValue::from(body);
        record_tag_read();
        debug!(
            target: "pitag.webapi",
            web_id = point_id,
            value = %value.display_value(),
            good = value.good,
            "value_read_done"
        );
        Ok(value)
    }

    async fn write_value(&self, point_id: &str, value: &RawValue) -> Result<bool, WebApiError> {
        let point_id = require_non_empty(point_id, "pointWebId")?;
        let url = self.endpoint(&["streams", point_id, "value"])?;
        let payload = WriteValueRequest {
            value: value.clone().into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        debug!(
            target: "pitag.webapi",
            url = %url,
            timestamp = %payload.timestamp,
            "value_write"
        );

        let response = self.send(self.client.post(url).json(&payload)).await?;
        let status = response.status();
        if status.is_success() {
            record_write_accepted();
            info!(
                target: "pitag.webapi",
                web_id = point_id,
                value = %value,
                status = status.as_u16(),
                "value_write_accepted"
            );
            return Ok(true);
        }

        let detail = response.text().await.unwrap_or_default();
        record_write_rejected();
        warn!(
            target: "pitag.webapi",
            web_id = point_id,
            value = %value,
            status = status.as_u16(),
            detail = %detail,
            "value_write_rejected"
        );
        Ok(false)
    }
}

async fn ensure_success(response: Response) -> Result<Response, WebApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(target: "pitag.webapi", status = status.as_u16(), body = %body, "unexpected_status");
    Err(WebApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, WebApiError> {
    let bytes = response.bytes().await.map_err(WebApiError::from_reqwest)?;
    serde_json::from_slice(&bytes).map_err(|err| WebApiError::Decode(err.to_string()))
}
