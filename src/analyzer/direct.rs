//! 1段階推論ステージ
//!
//! 画像と問題文から直接解答を得る。リトライを使い切った場合は空文字を返し、
//! 後から補完パスで埋め直す

use crate::client::ChatApi;
use crate::config::ModelConfig;
use crate::retry::{pause, RetryPolicy};
use tracing::warn;
use vqa_common::{build_direct_prompt, extract_first_choice, ChatMessage, ChatRequest};

pub fn build_request(model: &ModelConfig, data_url: &str, question: &str) -> ChatRequest {
    ChatRequest {
        model: model.model_id.clone(),
        messages: vec![ChatMessage::user_with_image(build_direct_prompt(question), data_url)],
        max_tokens: model.max_tokens,
        temperature: model.temperature,
        stream: Some(false),
    }
}

pub async fn ask_direct<C: ChatApi>(
    api: &C,
    model: &ModelConfig,
    data_url: &str,
    question: &str,
    retry: &RetryPolicy,
) -> String {
    let request = build_request(model, data_url, question);
    let endpoint = model.endpoint();

    for attempt in retry.attempts() {
        let failure = match api.post_chat(&endpoint, &request).await {
            Ok(reply) if reply.is_success() => match extract_first_choice(&reply.body) {
                Ok(content) => return content.trim().to_string(),
                Err(e) => format!("レスポンス形式エラー: {}", e),
            },
            Ok(reply) => format!("HTTP {}: {}", reply.status, reply.preview()),
            Err(e) => e.to_string(),
        };

        warn!("第{}回呼び出し失敗: {}", attempt, failure);
        if !retry.is_last(attempt) {
            pause(retry.delay).await;
        }
    }

    String::new()
}
