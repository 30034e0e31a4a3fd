#![allow(dead_code)]

use async_trait::async_trait;
use domain::{Point, RawValue, TagValue};
use pitag_webapi::{PointLocator, ValueAccessor, WebApiError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// 可编排的 PI 替身：记录每一次调用，读结果按队列依次弹出。
#[derive(Default)]
pub struct FakeHistorian {
    points: Vec<Point>,
    locate_error: Mutex<Option<WebApiError>>,
    reads: Mutex<VecDeque<Result<TagValue, WebApiError>>>,
    write: Mutex<Option<Result<bool, WebApiError>>>,
    calls: Mutex<Vec<Call>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Find { server_id: String, tag_name: String },
    Read { web_id: String },
    Write { web_id: String, value: RawValue },
}

impl FakeHistorian {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_point(mut self, web_id: &str, name: &str) -> Self {
        self.points.push(point(web_id, name));
        self
    }

    pub fn failing_search(self, error: WebApiError) -> Self {
        *self.locate_error.lock().unwrap() = Some(error);
        self
    }

    pub fn then_read(self, result: Result<TagValue, WebApiError>) -> Self {
        self.reads.lock().unwrap().push_back(result);
        self
    }

    pub fn write_result(self, result: Result<bool, WebApiError>) -> Self {
        *self.write.lock().unwrap() = Some(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Write { .. }))
            .collect()
    }
}

#[async_trait]
impl PointLocator for FakeHistorian {
    async fn find_point(
        &self,
        server_id: &str,
        tag_name: &str,
    ) -> Result<Option<Point>, WebApiError> {
        self.calls.lock().unwrap().push(Call::Find {
            server_id: server_id.to_string(),
            tag_name: tag_name.to_string(),
        });
        if let Some(error) = self.locate_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self
            .points
            .iter()
            .find(|point| point.name == tag_name)
            .cloned())
    }
}

#[async_trait]
impl ValueAccessor for FakeHistorian {
    async fn read_value(&self, point_id: &str) -> Result<TagValue, WebApiError> {
        self.calls.lock().unwrap().push(Call::Read {
            web_id: point_id.to_string(),
        });
        self.reads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(WebApiError::Transport("no scripted read".to_string())))
    }

    async fn write_value(&self, point_id: &str, value: &RawValue) -> Result<bool, WebApiError> {
        self.calls.lock().unwrap().push(Call::Write {
            web_id: point_id.to_string(),
            value: value.clone(),
        });
        self.write.lock().unwrap().take().unwrap_or(Ok(true))
    }
}

pub fn point(web_id: &str, name: &str) -> Point {
    Point {
        web_id: web_id.to_string(),
        name: name.to_string(),
        path: None,
        descriptor: None,
        point_class: None,
        point_type: None,
    }
}

/// 数字状态读数，形如 `{"Name": "OPEN", "Value": 1}`。
pub fn state(name: &str) -> TagValue {
    TagValue {
        raw: RawValue::from(serde_json::json!({ "Name": name, "Value": 0 })),
        timestamp: "2024-01-01T00:00:00Z".to_string(),
        good: true,
        units_abbreviation: None,
    }
}
