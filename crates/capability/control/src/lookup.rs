use domain::TagValue;
use pitag_webapi::{PointLocator, ValueAccessor, WebApiError};
use std::sync::Arc;
use tracing::info;

/// 按标签名读当前值。
///
/// 未找到返回 `Ok(None)`；参数错误与外部服务错误原样向上传播。
#[derive(Clone)]
pub struct TagReader {
    locator: Arc<dyn PointLocator>,
    accessor: Arc<dyn ValueAccessor>,
}

impl TagReader {
    pub fn new(locator: Arc<dyn PointLocator>, accessor: Arc<dyn ValueAccessor>) -> Self {
        Self { locator, accessor }
    }

    pub async fn get_value(
        &self,
        server_id: &str,
        tag_name: &str,
    ) -> Result<Option<TagValue>, WebApiError> {
        let Some(point) = self.locator.find_point(server_id, tag_name).await? else {
            info!(target: "pitag.control", tag_name, "tag_not_found");
            return Ok(None);
        };
        self.accessor.read_value(&point.web_id).await.map(Some)
    }
}
