//! PI Web API 错误类型定义

use domain::ArgumentError;

/// PI Web API 访问错误
#[derive(Debug, thiserror::Error)]
pub enum WebApiError {
    /// 必填参数为空
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    /// 连接或传输失败
    #[error("transport error: {0}")]
    Transport(String),

    /// 超时：写入是否生效未知
    #[error("timeout: {0}")]
    Timeout(String),

    /// PI 返回非成功状态
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// 响应体解析失败
    #[error("decode error: {0}")]
    Decode(String),

    /// 客户端配置错误
    #[error("config error: {0}")]
    Config(String),
}

impl WebApiError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WebApiError::Timeout(err.to_string())
        } else if err.is_decode() {
            WebApiError::Decode(err.to_string())
        } else {
            WebApiError::Transport(err.to_string())
        }
    }
}
