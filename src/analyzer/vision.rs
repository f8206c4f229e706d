//! 視覚理解ステージ
//!
//! 失敗は例外ではなく [`VisionOutcome`] の失敗バリアントとして返す。
//! `Failed` と `Exception` のみリトライし、内容審査による拒否は即座に確定する

use crate::client::ChatApi;
use crate::config::ModelConfig;
use crate::retry::{pause, RetryPolicy};
use tracing::{debug, warn};
use vqa_common::{
    build_vision_prompt, extract_first_choice, is_content_restricted, ChatMessage, ChatRequest,
    VisionOutcome,
};

pub fn build_request(model: &ModelConfig, data_url: &str, question: &str) -> ChatRequest {
    ChatRequest {
        model: model.model_id.clone(),
        messages: vec![ChatMessage::user_with_image(build_vision_prompt(question), data_url)],
        max_tokens: model.max_tokens,
        temperature: model.temperature,
        stream: None,
    }
}

/// 画像と問題文から説明文を得る
pub async fn understand_image<C: ChatApi>(
    api: &C,
    model: &ModelConfig,
    data_url: &str,
    question: &str,
    retry: &RetryPolicy,
) -> VisionOutcome {
    let request = build_request(model, data_url, question);
    let endpoint = model.endpoint();
    let mut outcome = VisionOutcome::Failed;

    for attempt in retry.attempts() {
        outcome = request_once(api, &endpoint, &request).await;
        if !outcome.is_retryable() {
            return outcome;
        }

        warn!(attempt, max_attempts = retry.max_attempts, "視覚理解失敗: {}", outcome.text());
        if !retry.is_last(attempt) {
            pause(retry.delay).await;
        }
    }

    outcome
}

async fn request_once<C: ChatApi>(api: &C, endpoint: &str, request: &ChatRequest) -> VisionOutcome {
    let reply = match api.post_chat(endpoint, request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("視覚API呼び出し例外: {}", e);
            return VisionOutcome::Exception;
        }
    };

    if !reply.is_success() {
        warn!(status = reply.status, body = %reply.preview(), "視覚API呼び出し失敗");
        if is_content_restricted(&reply.body) {
            warn!("内容審査により拒否されたため、この画像をスキップ");
            return VisionOutcome::Restricted;
        }
        return VisionOutcome::Failed;
    }

    match extract_first_choice(&reply.body) {
        Ok(content) if !content.trim().is_empty() => {
            debug!(chars = content.chars().count(), "視覚理解完了");
            VisionOutcome::Description(content)
        }
        Ok(_) => {
            warn!("視覚APIの応答が空");
            VisionOutcome::Failed
        }
        Err(e) => {
            warn!(body = %reply.preview(), "視覚APIレスポンス形式エラー: {}", e);
            VisionOutcome::Failed
        }
    }
}
