//! テスト用のスクリプト化されたチャットAPI

#![allow(dead_code)]

use serde_json::json;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use vqa_common::ChatRequest;
use vqa_rust::client::{ApiReply, ChatApi};
use vqa_rust::config::Config;
use vqa_rust::encoder::ImageLayout;
use vqa_rust::error::{Result, VqaError};
use vqa_rust::pipeline::PipelineSettings;

pub enum Scripted {
    Reply(u16, String),
    TransportError,
}

/// 呼び出し順に応答を返すフェイク。スクリプトを使い切った後の呼び出しはパニック
#[derive(Default)]
pub struct FakeChat {
    script: RefCell<VecDeque<Scripted>>,
    calls: RefCell<Vec<(String, ChatRequest)>>,
}

impl FakeChat {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.calls.borrow().iter().map(|(_, r)| r.clone()).collect()
    }
}

impl ChatApi for FakeChat {
    async fn post_chat(&self, endpoint: &str, request: &ChatRequest) -> Result<ApiReply> {
        self.calls
            .borrow_mut()
            .push((endpoint.to_string(), request.clone()));

        match self.script.borrow_mut().pop_front() {
            Some(Scripted::Reply(status, body)) => Ok(ApiReply { status, body }),
            Some(Scripted::TransportError) => Err(VqaError::ApiCall("connection reset".into())),
            None => panic!("予期しないAPI呼び出し: {}", endpoint),
        }
    }
}

/// HTTP 200 + choices[0].message.content
pub fn ok(content: &str) -> Scripted {
    let body = json!({
        "id": "chatcmpl-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    });
    Scripted::Reply(200, body.to_string())
}

pub fn status(code: u16, body: &str) -> Scripted {
    Scripted::Reply(code, body.to_string())
}

/// 待機なしの設定
pub fn test_config() -> Config {
    Config {
        api_delay_secs: 0.0,
        retry_delay_secs: 0.0,
        fill_retry_delay_secs: 0.0,
        ..Config::default()
    }
}

pub fn test_settings(image_dir: &Path, layout: ImageLayout) -> PipelineSettings {
    PipelineSettings::from_config(&test_config(), image_dir.to_path_buf(), layout).unwrap()
}

/// ダミー画像を作成
pub fn write_image(dir: &Path, name: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"\x89PNG\r\n\x1a\nfake").unwrap();
}
