//! 报表请求参数

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 结构化输出格式的标记
pub const JSON_FORMAT: &str = "JSON";

/// 报表请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequestSpec {
    /// 报表类型，例如 `learning-activity`、`content-access`
    #[serde(rename = "type")]
    pub report_type: String,
    /// 请求参数（start/end 或 timeframe、排序、过滤条件、formatType 等）
    #[serde(default)]
    pub request: Map<String, Value>,
}

impl ReportRequestSpec {
    pub fn new(report_type: impl Into<String>, request: Map<String, Value>) -> Self {
        Self {
            report_type: report_type.into(),
            request,
        }
    }

    /// 去掉所有值为 null 的字段后的请求体
    ///
    /// 嵌套对象同样处理，null 字段不会被发送
    pub fn stripped_body(&self) -> Value {
        strip_nulls(Value::Object(self.request.clone()))
    }

    /// 输出格式（未指定时默认为 JSON）
    pub fn format(&self) -> OutputFormat {
        match self.request.get("formatType").and_then(Value::as_str) {
            None => OutputFormat::Json,
            Some(token) if token == JSON_FORMAT => OutputFormat::Json,
            Some(token) => OutputFormat::Raw(token.to_string()),
        }
    }

    /// 请求中使用的相对时间窗口
    pub fn timeframe(&self) -> Option<&str> {
        self.request.get("timeframe").and_then(Value::as_str)
    }
}

/// 递归移除对象中的 null 字段
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

/// 报表输出格式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// 结构化 JSON
    Json,
    /// 原样保存（CSV 等），携带 formatType 标记
    Raw(String),
}

impl OutputFormat {
    pub fn is_structured(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

/// 已知的相对时间窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Timeframe {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "DAY" => Some(Timeframe::Day),
            "WEEK" => Some(Timeframe::Week),
            "MONTH" => Some(Timeframe::Month),
            "QUARTER" => Some(Timeframe::Quarter),
            "YEAR" => Some(Timeframe::Year),
            _ => None,
        }
    }

    /// 以 `now` 为结束时间推算的窗口，只用于日志展示
    pub fn window(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = match self {
            Timeframe::Day => now - Duration::days(1),
            Timeframe::Week => now - Duration::days(7),
            Timeframe::Month => now.checked_sub_months(Months::new(1)).unwrap_or(now),
            Timeframe::Quarter => now.checked_sub_months(Months::new(3)).unwrap_or(now),
            Timeframe::Year => now.checked_sub_months(Months::new(12)).unwrap_or(now),
        };
        (start, now)
    }
}
