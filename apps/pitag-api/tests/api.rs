use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use domain::{Point, RawValue, TagValue};
use http_body_util::BodyExt;
use pitag_api::{AppState, build_app};
use pitag_control::{ConfirmationPolicy, DigitalStateChanger, TagReader};
use pitag_directory::{TagCatalog, TagDirectory};
use pitag_notify::{Notifier, NotifyError, PdfReportRenderer, StateChangeNotice};
use pitag_webapi::{PointLocator, ValueAccessor, WebApiError};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// 内存版 PI：按名称解析点位，写入直接改写当前值。
struct FakePi {
    points: HashMap<String, String>,
    values: Mutex<HashMap<String, RawValue>>,
    accept_writes: bool,
}

impl FakePi {
    fn new(accept_writes: bool) -> Self {
        let mut points = HashMap::new();
        points.insert("KTL-FWS-K-260.MV".to_string(), "X1".to_string());
        points.insert("KTL-FWS-K-045 D.MV".to_string(), "X45".to_string());
        let mut values = HashMap::new();
        values.insert("X1".to_string(), RawValue::from(json!({ "Name": "OPEN", "Value": 1 })));
        values.insert("X45".to_string(), RawValue::from(json!(12.5)));
        Self {
            points,
            values: Mutex::new(values),
            accept_writes,
        }
    }
}

#[async_trait]
impl PointLocator for FakePi {
    async fn find_point(
        &self,
        _server_id: &str,
        tag_name: &str,
    ) -> Result<Option<Point>, WebApiError> {
        Ok(self.points.get(tag_name).map(|web_id| Point {
            web_id: web_id.clone(),
            name: tag_name.to_string(),
            path: None,
            descriptor: None,
            point_class: None,
            point_type: None,
        }))
    }
}

#[async_trait]
impl ValueAccessor for FakePi {
    async fn read_value(&self, point_id: &str) -> Result<TagValue, WebApiError> {
        let values = self.values.lock().unwrap();
        let raw = values
            .get(point_id)
            .cloned()
            .ok_or_else(|| WebApiError::Status {
                status: 404,
                body: String::new(),
            })?;
        Ok(TagValue {
            raw,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            good: true,
            units_abbreviation: None,
        })
    }

    async fn write_value(&self, point_id: &str, value: &RawValue) -> Result<bool, WebApiError> {
        if !self.accept_writes {
            return Ok(false);
        }
        self.values
            .lock()
            .unwrap()
            .insert(point_id.to_string(), value.clone());
        Ok(true)
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<StateChangeNotice>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_state_change(&self, notice: &StateChangeNotice) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

struct Harness {
    state: AppState,
    notifier: Arc<RecordingNotifier>,
}

fn harness(accept_writes: bool) -> Harness {
    let pi = Arc::new(FakePi::new(accept_writes));
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState {
        server_id: Arc::from("S1"),
        changer: DigitalStateChanger::with_policy(
            pi.clone(),
            pi.clone(),
            ConfirmationPolicy::FixedDelay(Duration::ZERO),
        ),
        reader: TagReader::new(pi.clone(), pi),
        directory: Arc::new(TagDirectory::new(TagCatalog::builtin())),
        notifier: notifier.clone(),
        renderer: PdfReportRenderer::new(),
    };
    Harness { state, notifier }
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_app(state.clone())
        .oneshot(request)
        .await
        .expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let h = harness(true);
    let (status, body) = send(&h.state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn responses_carry_request_ids() {
    let h = harness(true);
    let response = build_app(h.state.clone())
        .oneshot(get("/health"))
        .await
        .expect("response");
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("x-trace-id"));
}

#[tokio::test]
async fn get_tag_value_returns_display_value() {
    let h = harness(true);
    let (status, body) = send(&h.state, get("/api/tags/KTL-FWS-K-260.MV")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["value"], "OPEN");
    assert_eq!(body["data"]["displayValue"], "OPEN");
    assert_eq!(body["data"]["good"], true);
}

#[tokio::test]
async fn get_tag_value_decodes_spaces() {
    let h = harness(true);
    let (status, body) = send(&h.state, get("/api/tags/KTL-FWS-K-045%20D.MV")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["displayValue"], "12.5");
}

#[tokio::test]
async fn unknown_tag_is_404() {
    let h = harness(true);
    let (status, body) = send(&h.state, get("/api/tags/NOPE")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TAG.NOT_FOUND");
}

#[tokio::test]
async fn update_changes_state_and_notifies() {
    let h = harness(true);
    let (status, body) = send(
        &h.state,
        post_json(
            "/api/tags/update",
            json!({
                "tagName": "KTL-FWS-K-260.MV",
                "newState": "CLOSED",
                "email": "operator@example.com",
                "justification": "Maintenance"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Tag updated successfully");
    assert_eq!(body["data"]["emailSent"], true);
    assert_eq!(body["data"]["updatedTagData"]["value"], "CLOSED");

    let sent = h.notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].previous_state, "OPEN");
    assert_eq!(sent[0].new_state, "CLOSED");
    assert_eq!(sent[0].changed_by, "Unknown User");
}

#[tokio::test]
async fn update_requires_audit_fields() {
    let h = harness(true);
    let (status, body) = send(
        &h.state,
        post_json(
            "/api/tags/update",
            json!({ "tagName": "KTL-FWS-K-260.MV", "newState": "CLOSED" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(h.notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rejected_update_is_generic_failure() {
    let h = harness(false);
    let (status, body) = send(
        &h.state,
        post_json(
            "/api/tags/update",
            json!({
                "tagName": "KTL-FWS-K-260.MV",
                "newState": "AJAR",
                "email": "operator@example.com",
                "justification": "Test",
                "user": "jdoe"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Failed to update tag");
    assert!(h.notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn update_unknown_tag_is_404() {
    let h = harness(true);
    let (status, _) = send(
        &h.state,
        post_json(
            "/api/tags/update",
            json!({
                "tagName": "NOPE",
                "newState": "OPEN",
                "email": "operator@example.com",
                "justification": "Test"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_value_writes_raw_value() {
    let h = harness(true);
    let (status, body) = send(
        &h.state,
        post_json("/api/tags/KTL-FWS-K-045%20D.MV/value", json!({ "value": 40 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["webId"], "X45");

    let (_, body) = send(&h.state, get("/api/tags/KTL-FWS-K-045%20D.MV")).await;
    assert_eq!(body["data"]["displayValue"], "40");
}

#[tokio::test]
async fn search_and_list_use_directory() {
    let h = harness(true);
    let (status, body) = send(&h.state, get("/api/tags/search/260")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["KTL-FWS-K-260.MV"]));

    let (_, body) = send(&h.state, get("/api/tags/search/K")).await;
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(&h.state, get("/api/tags/list")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(20));
}

#[tokio::test]
async fn current_user_reads_forwarded_headers() {
    let h = harness(true);
    let request = Request::builder()
        .uri("/api/tags/current-user")
        .header("x-forwarded-user", "jdoe")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.state, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"], "jdoe");

    let (_, body) = send(&h.state, get("/api/tags/current-user")).await;
    assert_eq!(body["data"]["user"], "unknown");
}

#[tokio::test]
async fn export_pdf_returns_attachment() {
    let h = harness(true);
    let response = build_app(h.state.clone())
        .oneshot(post_json(
            "/api/tags/export-pdf",
            json!({
                "tags": [
                    { "tagName": "KTL-FWS-K-260.MV", "newState": "CLOSED" },
                    { "tagName": "NOPE" },
                    { "tagName": "" }
                ],
                "user": "jdoe"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .expect("ascii")
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"pi_tags_report_"));
    assert!(disposition.ends_with(".pdf\""));
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn export_pdf_without_tags_is_400() {
    let h = harness(true);
    let (status, _) = send(&h.state, post_json("/api/tags/export-pdf", json!({ "tags": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn metrics_snapshot_is_exposed() {
    let h = harness(true);
    let (status, body) = send(&h.state, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["tagReads"].is_u64());
    assert!(body["data"]["reportsGenerated"].is_u64());
}
