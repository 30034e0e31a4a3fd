//! 标签控制链路：查找 → 读 → 写 → 确认。

mod changer;
mod lookup;

pub use changer::DigitalStateChanger;
pub use lookup::TagReader;

use domain::{ArgumentError, Point, TagValue};
use std::time::Duration;

/// 控制链路错误。仅参数校验会以错误形式返回。
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),
}

/// 写入成功后的确认策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationPolicy {
    /// 不做确认读。
    None,
    /// 等待固定时间后读一次。
    FixedDelay(Duration),
    /// 每隔 `interval` 读一次，读到目标状态即停止，最多 `max_attempts` 次。
    Poll { interval: Duration, max_attempts: u32 },
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        ConfirmationPolicy::FixedDelay(Duration::from_secs(1))
    }
}

/// 状态变更结果。
///
/// `is_success()` 即旧接口的布尔返回值；其余分支区分失败原因。
#[derive(Debug, Clone, PartialEq)]
pub enum StateChangeOutcome {
    /// PI 接受了写入。`previous` 为写入前的读数，`confirmed` 为确认读的结果，
    /// 二者均为尽力而为，缺失不影响成功。
    Changed {
        point: Point,
        previous: Option<TagValue>,
        confirmed: Option<TagValue>,
    },
    /// 标签名没有匹配的点位，未尝试写入。
    NotFound,
    /// PI 以非成功状态拒绝了写入。
    Rejected { point: Point },
    /// 流程内部故障（传输失败、超时、解析失败等）。
    Failed { cause: String },
}

impl StateChangeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StateChangeOutcome::Changed { .. })
    }
}
