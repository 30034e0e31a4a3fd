pub mod point;
pub mod request;
pub mod value;

pub use point::Point;
pub use request::{ChangeRequest, UNKNOWN_USER};
pub use value::{RawValue, TagValue};

/// 必填参数为空（或仅包含空白）。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} cannot be null or empty")]
pub struct ArgumentError {
    pub field: &'static str,
}

/// 校验必填字符串参数，返回去除首尾空白后的值。
pub fn require_non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ArgumentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ArgumentError { field });
    }
    Ok(trimmed)
}
