//! 路由定义
//!
//! - 健康检查：/health
//! - 指标：/metrics
//! - 标签：/api/tags/*（静态路径优先于 `:tag_name` 参数路径）

use crate::AppState;
use crate::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route("/api/tags/current-user", get(current_user))
        .route("/api/tags/list", get(list_tags))
        .route("/api/tags/search/:filter", get(search_tags))
        .route("/api/tags/update", post(update_tag))
        .route("/api/tags/export-pdf", post(export_pdf))
        .route("/api/tags/:tag_name", get(get_tag_value))
        .route("/api/tags/:tag_name/value", post(set_tag_value))
}
