//! 点位当前值与展示规则。
//!
//! PI Web API 返回的 `Value` 是弱类型的：字符串、数值、布尔、带 `Name`
//! 字段的对象（数字状态点位）、数组或 null。这里用 [`RawValue`] 显式建模，
//! 展示文本是对其形态的完全匹配，与质量位、单位无关。

use serde_json::{Map, Number, Value};
use std::fmt;

/// 弱类型原始值。
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    String(String),
    Number(Number),
    Bool(bool),
    Object(Map<String, Value>),
    Array(Vec<Value>),
    Null,
}

impl RawValue {
    /// 计算展示文本。
    ///
    /// 规则（顺序与字面量均为兼容契约）：
    /// - 字符串原样返回
    /// - 数值返回十进制文本（整数值不带小数部分）
    /// - 布尔返回 `"True"` / `"False"`
    /// - 对象含字符串字段 `Name` 时返回该字段（数字状态标签，如 `OPEN`）
    /// - 其他对象与数组返回原始 JSON 文本
    /// - null 返回 `"null"`
    pub fn display_value(&self) -> String {
        match self {
            RawValue::String(value) => value.clone(),
            RawValue::Number(number) => format_number(number),
            RawValue::Bool(true) => "True".to_string(),
            RawValue::Bool(false) => "False".to_string(),
            RawValue::Object(map) => match map.get("Name") {
                Some(Value::String(name)) => name.clone(),
                _ => serde_json::to_string(map).unwrap_or_default(),
            },
            RawValue::Array(items) => serde_json::to_string(items).unwrap_or_default(),
            RawValue::Null => "null".to_string(),
        }
    }
}

fn format_number(number: &Number) -> String {
    if let Some(value) = number.as_i64() {
        return value.to_string();
    }
    if let Some(value) = number.as_u64() {
        return value.to_string();
    }
    match number.as_f64() {
        Some(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 => {
            (value as i64).to_string()
        }
        Some(value) => value.to_string(),
        None => number.to_string(),
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_value())
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(value) => RawValue::String(value),
            Value::Number(number) => RawValue::Number(number),
            Value::Bool(value) => RawValue::Bool(value),
            Value::Object(map) => RawValue::Object(map),
            Value::Array(items) => RawValue::Array(items),
            Value::Null => RawValue::Null,
        }
    }
}

impl From<RawValue> for Value {
    fn from(value: RawValue) -> Self {
        match value {
            RawValue::String(value) => Value::String(value),
            RawValue::Number(number) => Value::Number(number),
            RawValue::Bool(value) => Value::Bool(value),
            RawValue::Object(map) => Value::Object(map),
            RawValue::Array(items) => Value::Array(items),
            RawValue::Null => Value::Null,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

/// 点位的一次读数。
#[derive(Debug, Clone, PartialEq)]
pub struct TagValue {
    pub raw: RawValue,
    /// PI 系统时间戳，原样透传。
    pub timestamp: String,
    /// 质量位；PI 未返回时视为良好。
    pub good: bool,
    pub units_abbreviation: Option<String>,
}

impl TagValue {
    pub fn display_value(&self) -> String {
        self.raw.display_value()
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Value: {}, Timestamp: {}, Good: {}",
            self.raw, self.timestamp, self.good
        )
    }
}
