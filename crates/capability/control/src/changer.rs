use crate::{ConfirmationPolicy, ControlError, StateChangeOutcome};
use domain::{Point, RawValue, TagValue, require_non_empty};
use pitag_telemetry::{
    record_confirmation_failure, record_state_change_failed, record_state_change_succeeded,
};
use pitag_webapi::{PointLocator, ValueAccessor, WebApiError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// 数字状态变更服务。
///
/// 严格顺序执行：解析点位 → 读当前值 → 写新值 → 按策略确认。
/// 流程内部的任何故障都转换为 [`StateChangeOutcome`]，不向调用方传播；
/// 只有参数为空时返回 [`ControlError`]，且此时不发起任何外部调用。
#[derive(Clone)]
pub struct DigitalStateChanger {
    locator: Arc<dyn PointLocator>,
    accessor: Arc<dyn ValueAccessor>,
    policy: ConfirmationPolicy,
}

impl DigitalStateChanger {
    pub fn new(locator: Arc<dyn PointLocator>, accessor: Arc<dyn ValueAccessor>) -> Self {
        Self::with_policy(locator, accessor, ConfirmationPolicy::default())
    }

    pub fn with_policy(
        locator: Arc<dyn PointLocator>,
        accessor: Arc<dyn ValueAccessor>,
        policy: ConfirmationPolicy,
    ) -> Self {
        Self {
            locator,
            accessor,
            policy,
        }
    }

    pub fn policy(&self) -> ConfirmationPolicy {
        self.policy
    }

    /// 将标签切换到指定数字状态（如 `OPEN` / `CLOSED`）。
    pub async fn change_state(
        &self,
        server_id: &str,
        tag_name: &str,
        new_state: &str,
    ) -> Result<StateChangeOutcome, ControlError> {
        let server_id = require_non_empty(server_id, "dataServerWebId")?;
        let tag_name = require_non_empty(tag_name, "tagName")?;
        let new_state = require_non_empty(new_state, "newState")?;
        let started_at = Instant::now();
        info!(
            target: "pitag.control",
            tag_name,
            new_state,
            "state_change_requested"
        );

        let outcome = match self.run_change(server_id, tag_name, new_state).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    target: "pitag.control",
                    tag_name,
                    new_state,
                    error = %err,
                    "state_change_failed"
                );
                StateChangeOutcome::Failed {
                    cause: err.to_string(),
                }
            }
        };
        if outcome.is_success() {
            record_state_change_succeeded();
        } else {
            record_state_change_failed();
        }
        info!(
            target: "pitag.control",
            tag_name,
            new_state,
            success = outcome.is_success(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "state_change_finished"
        );
        Ok(outcome)
    }

    /// 直接写值：解析点位后写入一次，不读旧值也不确认。
    ///
    /// 成功时返回 `Changed`，`previous` 与 `confirmed` 均为空。
    pub async fn set_value(
        &self,
        server_id: &str,
        tag_name: &str,
        value: &RawValue,
    ) -> Result<StateChangeOutcome, ControlError> {
        let server_id = require_non_empty(server_id, "dataServerWebId")?;
        let tag_name = require_non_empty(tag_name, "tagName")?;
        let outcome = match self.write_once(server_id, tag_name, value).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    target: "pitag.control",
                    tag_name,
                    error = %err,
                    "set_value_failed"
                );
                StateChangeOutcome::Failed {
                    cause: err.to_string(),
                }
            }
        };
        Ok(outcome)
    }

    async fn run_change(
        &self,
        server_id: &str,
        tag_name: &str,
        new_state: &str,
    ) -> Result<StateChangeOutcome, WebApiError> {
        let Some(point) = self.locator.find_point(server_id, tag_name).await? else {
            warn!(target: "pitag.control", tag_name, "tag_not_found");
            return Ok(StateChangeOutcome::NotFound);
        };
        info!(target: "pitag.control", point = %point, "tag_resolved");

        // 写入前的读数用于审计，必须在写之前取得
        let previous = match self.accessor.read_value(&point.web_id).await {
            Ok(value) => {
                info!(target: "pitag.control", tag_name, current = %value, "current_value");
                Some(value)
            }
            Err(err) => {
                warn!(
                    target: "pitag.control",
                    tag_name,
                    error = %err,
                    "current_value_unavailable"
                );
                None
            }
        };

        let value = RawValue::from(new_state);
        if !self.accessor.write_value(&point.web_id, &value).await? {
            warn!(target: "pitag.control", tag_name, new_state, "state_change_rejected");
            return Ok(StateChangeOutcome::Rejected { point });
        }
        info!(target: "pitag.control", tag_name, new_state, "state_change_accepted");

        let confirmed = self.confirm(&point, new_state).await;
        Ok(StateChangeOutcome::Changed {
            point,
            previous,
            confirmed,
        })
    }

    async fn write_once(
        &self,
        server_id: &str,
        tag_name: &str,
        value: &RawValue,
    ) -> Result<StateChangeOutcome, WebApiError> {
        let Some(point) = self.locator.find_point(server_id, tag_name).await? else {
            warn!(target: "pitag.control", tag_name, "tag_not_found");
            return Ok(StateChangeOutcome::NotFound);
        };
        if !self.accessor.write_value(&point.web_id, value).await? {
            return Ok(StateChangeOutcome::Rejected { point });
        }
        Ok(StateChangeOutcome::Changed {
            point,
            previous: None,
            confirmed: None,
        })
    }

    async fn confirm(&self, point: &Point, expected: &str) -> Option<TagValue> {
        match self.policy {
            ConfirmationPolicy::None => None,
            ConfirmationPolicy::FixedDelay(delay) => {
                tokio::time::sleep(delay).await;
                self.confirmation_read(point).await
            }
            ConfirmationPolicy::Poll {
                interval,
                max_attempts,
            } => {
                let mut last = None;
                for attempt in 1..=max_attempts.max(1) {
                    tokio::time::sleep(interval).await;
                    let Some(value) = self.confirmation_read(point).await else {
                        continue;
                    };
                    if value.display_value().eq_ignore_ascii_case(expected) {
                        info!(
                            target: "pitag.control",
                            tag_name = %point.name,
                            attempt,
                            "state_change_confirmed"
                        );
                        return Some(value);
                    }
                    last = Some(value);
                }
                warn!(
                    target: "pitag.control",
                    tag_name = %point.name,
                    expected,
                    observed = ?last.as_ref().map(TagValue::display_value),
                    "state_change_not_observed"
                );
                last
            }
        }
    }

    async fn confirmation_read(&self, point: &Point) -> Option<TagValue> {
        match self.accessor.read_value(&point.web_id).await {
            Ok(value) => {
                info!(target: "pitag.control", tag_name = %point.name, updated = %value, "updated_value");
                Some(value)
            }
            Err(err) => {
                record_confirmation_failure();
                warn!(
                    target: "pitag.control",
                    tag_name = %point.name,
                    error = %err,
                    "confirmation_read_failed"
                );
                None
            }
        }
    }
}
