//! PI 标签运维 HTTP 服务。
//!
//! 路由见 [`routes`]；[`AppState`] 持有全部共享依赖，
//! 均为只读或内部无状态，可在请求间直接克隆。

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod utils;

use axum::Router;
use pitag_control::{DigitalStateChanger, TagReader};
use pitag_directory::TagDirectory;
use pitag_notify::{Notifier, PdfReportRenderer};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    /// 目标 PI 数据服务器 WebId。
    pub server_id: Arc<str>,
    pub changer: DigitalStateChanger,
    pub reader: TagReader,
    pub directory: Arc<TagDirectory>,
    pub notifier: Arc<dyn Notifier>,
    pub renderer: PdfReportRenderer,
}

/// 组装完整应用：路由 + CORS + 请求追踪。
pub fn build_app(state: AppState) -> Router {
    routes::create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(axum::middleware::from_fn(middleware::request_context))
        .layer(CorsLayer::permissive())
}
