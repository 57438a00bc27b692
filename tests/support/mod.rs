#![allow(dead_code)]

use async_trait::async_trait;
use report_fetch::error::ApiError;
use report_fetch::models::VerifiedSite;
use report_fetch::{ApiResponse, ReportApi};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

type Reply = Result<ApiResponse, ApiError>;

/// 按脚本返回响应的假报表接口
///
/// 队列里只剩最后一个响应时会一直重复它
#[derive(Default)]
pub struct ScriptedApi {
    create_replies: Mutex<VecDeque<Reply>>,
    get_replies: Mutex<VecDeque<Reply>>,
    create_calls: Mutex<Vec<(String, Value)>>,
    get_calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(self, status: u16, body: &str) -> Self {
        self.create_replies
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse::new("https://api.test/create", status, body)));
        self
    }

    pub fn on_create_error(self, message: &str) -> Self {
        self.create_replies
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Transport {
                url: "https://api.test/create".to_string(),
                message: message.to_string(),
            }));
        self
    }

    pub fn on_get(self, status: u16, body: &str) -> Self {
        self.get_replies
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse::new("https://api.test/get", status, body)));
        self
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.lock().unwrap().len()
    }

    pub fn get_count(&self) -> usize {
        self.get_calls.lock().unwrap().len()
    }

    pub fn created_bodies(&self) -> Vec<(String, Value)> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn polled_ids(&self) -> Vec<String> {
        self.get_calls.lock().unwrap().clone()
    }

    fn next(queue: &Mutex<VecDeque<Reply>>) -> Reply {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .expect("ScriptedApi 没有配置响应")
        }
    }
}

#[async_trait]
impl ReportApi for ScriptedApi {
    async fn create_report(
        &self,
        _site: &VerifiedSite,
        report_type: &str,
        body: &Value,
    ) -> Result<ApiResponse, ApiError> {
        self.create_calls
            .lock()
            .unwrap()
            .push((report_type.to_string(), body.clone()));
        Self::next(&self.create_replies)
    }

    async fn get_report(
        &self,
        _site: &VerifiedSite,
        report_id: &str,
    ) -> Result<ApiResponse, ApiError> {
        self.get_calls.lock().unwrap().push(report_id.to_string());
        Self::next(&self.get_replies)
    }
}
