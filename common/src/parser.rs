//! APIレスポンスパーサー
//!
//! Chat Completionsレスポンスから本文を取り出し、
//! 推論結果から解答部分を切り出す

use crate::chat::ChatResponse;
use crate::error::{Error, Result};
use crate::prompts::ANSWER_MARKER;
use regex::Regex;

/// 内容審査による拒否を示すレスポンス中のフレーズ
pub const RESTRICTION_PHRASES: &[&str] = &["相关法律法规", "内容审核"];

/// レスポンス本文から `choices[0].message.content` を取り出す
///
/// # Returns
/// * `Ok(String)` - 最初の選択肢の本文
/// * `Err` - JSONが不正、choicesが空、contentが無い場合
///
/// # Examples
/// ```
/// use vqa_common::extract_first_choice;
///
/// let body = r#"{"choices":[{"message":{"role":"assistant","content":"B"}}]}"#;
/// assert_eq!(extract_first_choice(body).unwrap(), "B");
/// ```
pub fn extract_first_choice(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| Error::Parse("choicesが空です".into()))
}

/// 推論結果から解答部分を切り出す
///
/// `答案：` を含む場合は最後の出現以降のみを残す
pub fn extract_answer(content: &str) -> String {
    let trimmed = content.trim();
    match trimmed.rsplit(ANSWER_MARKER).next() {
        Some(tail) if trimmed.contains(ANSWER_MARKER) => tail.trim().to_string(),
        _ => trimmed.to_string(),
    }
}

/// エラーレスポンスが内容審査による拒否か
pub fn is_content_restricted(body: &str) -> bool {
    RESTRICTION_PHRASES.iter().any(|phrase| body.contains(phrase))
}

/// 連続する空白・改行を1つの空白にまとめる
pub fn clean_text(text: &str) -> String {
    lazy_static::lazy_static! {
        static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    }
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // extract_first_choice テスト
    // =============================================

    #[test]
    fn test_extract_first_choice() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"图中有红色按钮"}},{"index":1,"message":{"content":"second"}}]}"#;
        assert_eq!(extract_first_choice(body).unwrap(), "图中有红色按钮");
    }

    #[test]
    fn test_extract_first_choice_empty_choices() {
        let result = extract_first_choice(r#"{"choices": []}"#);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_extract_first_choice_null_content() {
        let result = extract_first_choice(r#"{"choices":[{"message":{"content":null}}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_first_choice_malformed() {
        let result = extract_first_choice("<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    // =============================================
    // extract_answer テスト
    // =============================================

    #[test]
    fn test_extract_answer_with_marker() {
        assert_eq!(extract_answer("分析如下……\n答案：C"), "C");
    }

    #[test]
    fn test_extract_answer_uses_last_marker() {
        assert_eq!(extract_answer("答案：A 不对\n最终答案： B "), "B");
    }

    #[test]
    fn test_extract_answer_without_marker() {
        assert_eq!(extract_answer("  D \n"), "D");
    }

    #[test]
    fn test_extract_answer_marker_at_end() {
        assert_eq!(extract_answer("答案："), "");
    }

    // =============================================
    // is_content_restricted / clean_text テスト
    // =============================================

    #[test]
    fn test_is_content_restricted() {
        assert!(is_content_restricted(r#"{"error":"输入内容违反相关法律法规"}"#));
        assert!(is_content_restricted("内容审核未通过"));
        assert!(!is_content_restricted(r#"{"error":"rate limited"}"#));
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(" A\n\n B\tC "), "A B C");
        assert_eq!(clean_text(""), "");
    }
}
