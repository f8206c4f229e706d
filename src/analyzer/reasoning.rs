//! テキスト推論ステージ
//!
//! どの失敗経路でも [`FALLBACK_ANSWER`] を返すため、戻り値は空にならない

use crate::client::ChatApi;
use crate::config::ModelConfig;
use tracing::{debug, warn};
use vqa_common::{
    build_reasoning_prompt, extract_answer, extract_first_choice, is_content_restricted,
    ChatMessage, ChatRequest, FALLBACK_ANSWER,
};

pub fn build_request(model: &ModelConfig, understanding: &str, question: &str) -> ChatRequest {
    ChatRequest {
        model: model.model_id.clone(),
        messages: vec![ChatMessage::user_text(build_reasoning_prompt(understanding, question))],
        max_tokens: model.max_tokens,
        temperature: model.temperature,
        stream: None,
    }
}

/// 視覚理解結果と問題文から解答を得る
pub async fn reason_with_text<C: ChatApi>(
    api: &C,
    model: &ModelConfig,
    understanding: &str,
    question: &str,
) -> String {
    let request = build_request(model, understanding, question);

    let reply = match api.post_chat(&model.endpoint(), &request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("テキストAPI呼び出し例外: {}", e);
            return FALLBACK_ANSWER.to_string();
        }
    };

    if !reply.is_success() {
        warn!(status = reply.status, body = %reply.preview(), "テキスト推論API呼び出し失敗");
        if is_content_restricted(&reply.body) {
            warn!("内容審査により拒否されたため、既定解答を使用");
        }
        return FALLBACK_ANSWER.to_string();
    }

    match extract_first_choice(&reply.body) {
        Ok(content) => {
            let answer = extract_answer(&content);
            if answer.is_empty() {
                warn!("解答が空のため既定解答を使用");
                FALLBACK_ANSWER.to_string()
            } else {
                debug!(answer = %answer, "テキスト推論完了");
                answer
            }
        }
        Err(e) => {
            warn!(body = %reply.preview(), "テキスト推論APIレスポンス形式エラー: {}", e);
            FALLBACK_ANSWER.to_string()
        }
    }
}
