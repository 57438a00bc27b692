//! 报表状态与报表内容
//!
//! 服务端用"是否带 status 字段"来区分报表是否就绪，这里把它变成显式的枚举

use super::report::OutputFormat;
use serde_json::Value;
use std::fmt;

/// 表示报表生成失败的状态值
pub const FAILURE_SENTINEL: &str = "FAILED";

/// 提交接口返回的报表ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportHandle(String);

impl ReportHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 从响应体的 `id` 字段提取（字符串或数字）
    pub fn from_body(body: &Value) -> Option<Self> {
        match body.get("id")? {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for ReportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 报表内容
#[derive(Debug, Clone, PartialEq)]
pub enum ReportPayload {
    /// 记录列表
    Records(Vec<Value>),
    /// 其它结构化内容
    Document(Value),
    /// 原始文本（CSV 等）
    Raw(String),
}

impl ReportPayload {
    /// 数组直接作为记录；带 `records` 数组的对象取出该数组
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Array(records) => ReportPayload::Records(records),
            Value::Object(mut map) if map.get("records").is_some_and(Value::is_array) => {
                match map.remove("records") {
                    Some(Value::Array(records)) => ReportPayload::Records(records),
                    _ => ReportPayload::Document(Value::Object(map)),
                }
            }
            other => ReportPayload::Document(other),
        }
    }

    pub fn record_count(&self) -> Option<usize> {
        match self {
            ReportPayload::Records(records) => Some(records.len()),
            _ => None,
        }
    }

    /// 转为写入文件的字节，结构化内容序列化为 JSON，原始文本原样输出
    pub fn into_bytes(self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            ReportPayload::Records(records) => serde_json::to_vec(&records),
            ReportPayload::Document(value) => serde_json::to_vec(&value),
            ReportPayload::Raw(text) => Ok(text.into_bytes()),
        }
    }
}

/// 报表状态
#[derive(Debug, Clone, PartialEq)]
pub enum ReportStatus {
    /// 仍在生成中，携带服务端的状态值
    Processing(String),
    /// 已就绪
    Ready(ReportPayload),
    /// 生成失败
    Failed(String),
}

impl ReportStatus {
    /// 根据 JSON 响应体判断状态
    ///
    /// - 没有 status 字段：就绪，响应体就是报表内容
    /// - status 为 null 也算有状态，继续等
    /// - status 为 FAILED：失败
    /// - 其它 status：处理中
    pub fn from_json(body: Value) -> Self {
        match status_field(&body) {
            None => ReportStatus::Ready(ReportPayload::from_json(body)),
            Some(status) if status == FAILURE_SENTINEL => {
                ReportStatus::Failed(failure_reason(&body))
            }
            Some(status) => ReportStatus::Processing(status),
        }
    }

    /// 根据原始响应文本判断状态
    ///
    /// 结构化格式下响应必须是 JSON；原始格式下只有带 status 字段的
    /// JSON 对象才算状态响应，其余文本一律视为报表内容
    pub fn from_body(body: &str, format: &OutputFormat) -> Result<Self, serde_json::Error> {
        match format {
            OutputFormat::Json => Ok(Self::from_json(serde_json::from_str(body)?)),
            OutputFormat::Raw(_) => match serde_json::from_str::<Value>(body) {
                Ok(value) if status_field(&value).is_some() => Ok(Self::from_json(value)),
                _ => Ok(ReportStatus::Ready(ReportPayload::Raw(body.to_string()))),
            },
        }
    }

}

/// 读取 status 字段，只要字段存在就返回，非字符串值（包括 null）转为字符串
fn status_field(body: &Value) -> Option<String> {
    match body.get("status")? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn failure_reason(body: &Value) -> String {
    ["reason", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| {
            let id = body
                .get("id")
                .or_else(|| body.get("reportId"))
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .unwrap_or_else(|| "unknown".to_string());
            format!("Report {} status is {}", id, FAILURE_SENTINEL)
        })
}
