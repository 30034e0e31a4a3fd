use std::fmt;

/// PI 点位（PI Point）。
///
/// 由一次名称过滤搜索构造，只在单次调用内有效，不缓存。
/// 后续读写只能使用 `web_id`；`name` 仅作查找键，不保证全局唯一。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Point {
    pub web_id: String,
    pub name: String,
    pub path: Option<String>,
    pub descriptor: Option<String>,
    pub point_class: Option<String>,
    pub point_type: Option<String>,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (WebId: {})", self.name, self.web_id)
    }
}
