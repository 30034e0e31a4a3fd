//! PI Web API 报文结构（PascalCase）。

use domain::{Point, RawValue, TagValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PointSearchResponse {
    pub items: Vec<PointItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PointItem {
    pub web_id: String,
    pub name: String,
    pub path: Option<String>,
    pub descriptor: Option<String>,
    pub point_class: Option<String>,
    pub point_type: Option<String>,
}

impl From<PointItem> for Point {
    fn from(item: PointItem) -> Self {
        Point {
            web_id: item.web_id,
            name: item.name,
            path: item.path,
            descriptor: item.descriptor,
            point_class: item.point_class,
            point_type: item.point_type,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct StreamValueResponse {
    pub value: serde_json::Value,
    pub timestamp: String,
    pub units_abbreviation: Option<String>,
    pub good: Option<bool>,
}

impl From<StreamValueResponse> for TagValue {
    fn from(response: StreamValueResponse) -> Self {
        TagValue {
            raw: RawValue::from(response.value),
            timestamp: response.timestamp,
            // 未返回质量位时按良好处理
            good: response.good.unwrap_or(true),
            units_abbreviation: response.units_abbreviation,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WriteValueRequest {
    pub value: serde_json::Value,
    pub timestamp: String,
}
