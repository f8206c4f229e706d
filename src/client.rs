//! Chat Completions HTTPクライアント
//!
//! ステージ側はHTTPステータスと本文だけを見て成否を判定する。
//! 通信エラー・タイムアウトのみを `Err` として返す

use crate::error::{Result, VqaError};
use std::time::Duration;
use tracing::debug;
use vqa_common::ChatRequest;

/// HTTPレスポンス（ステータス + 本文）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: String,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// ログ用に本文の先頭だけを返す
    pub fn preview(&self) -> String {
        preview(&self.body, 200)
    }
}

pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}

/// チャットAPI呼び出しの抽象
#[allow(async_fn_in_trait)]
pub trait ChatApi {
    async fn post_chat(&self, endpoint: &str, request: &ChatRequest) -> Result<ApiReply>;
}

/// Bearer認証付きのreqwestクライアント
pub struct HttpChatClient {
    client: reqwest::Client,
    api_key: String,
}

impl HttpChatClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VqaError::ApiCall(format!("HTTPクライアント初期化エラー: {}", e)))?;
        Ok(Self::with_client(client, api_key))
    }

    /// 構築済みのreqwestクライアントを使う
    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

impl ChatApi for HttpChatClient {
    async fn post_chat(&self, endpoint: &str, request: &ChatRequest) -> Result<ApiReply> {
        debug!(endpoint, model = %request.model, "API呼び出し");

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| VqaError::ApiCall(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| VqaError::ApiCall(format!("レスポンス読み込みエラー: {}", e)))?;

        debug!(status, "APIレスポンス受信");
        Ok(ApiReply { status, body })
    }
}
