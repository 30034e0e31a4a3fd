use crate::{ArgumentError, require_non_empty};

/// 未提供操作人时使用的占位名。
pub const UNKNOWN_USER: &str = "Unknown User";

/// 状态变更请求（含审计字段）。
///
/// 审计路径要求 `tag_name`、`new_state`、`email`、`justification` 均非空；
/// 仅写值路径只需要前两项。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    pub tag_name: String,
    pub new_state: String,
    pub email: String,
    pub justification: String,
    pub user: String,
}

impl ChangeRequest {
    /// 校验并规整审计请求；`user` 缺失或为空白时取 [`UNKNOWN_USER`]。
    pub fn audited(
        tag_name: &str,
        new_state: &str,
        email: &str,
        justification: &str,
        user: Option<&str>,
    ) -> Result<Self, ArgumentError> {
        let user = user
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .unwrap_or(UNKNOWN_USER);
        Ok(Self {
            tag_name: require_non_empty(tag_name, "tagName")?.to_string(),
            new_state: require_non_empty(new_state, "newState")?.to_string(),
            email: require_non_empty(email, "email")?.to_string(),
            justification: require_non_empty(justification, "justification")?.to_string(),
            user: user.to_string(),
        })
    }
}
