//! パイプラインの型定義
//!
//! - InputRow: 入力CSVの1行（id, question, image）
//! - VisionOutcome: 視覚理解ステージの結果（説明文または失敗センチネル）
//! - Prediction: 最終出力（提出CSVの1行）

use crate::parser::clean_text;
use serde::{Deserialize, Serialize};

/// テキスト推論ステージが失敗したときの既定解答
pub const FALLBACK_ANSWER: &str = "A";

/// 入力CSVの1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRow {
    pub id: String,
    pub question: String,
    /// 画像ディレクトリからの相対パス
    pub image: String,
}

/// 提出CSVの1行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    #[serde(default)]
    pub answer: String,
}

impl Prediction {
    /// 解答は常に1行に正規化する
    pub fn new(id: impl Into<String>, answer: &str) -> Self {
        Self {
            id: id.into(),
            answer: clean_text(answer),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.answer.trim().is_empty()
    }
}

/// 視覚理解ステージの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionOutcome {
    /// 画像の説明文
    Description(String),
    /// HTTPエラーまたはレスポンス形式エラー
    Failed,
    /// 内容審査による拒否
    Restricted,
    /// 通信例外（タイムアウト含む）
    Exception,
    /// 画像ファイルが存在しない
    MissingImage(String),
    /// 画像のエンコードに失敗
    EncodeFailed,
}

impl VisionOutcome {
    /// ログ・中間ファイルに記録するテキスト
    pub fn text(&self) -> String {
        match self {
            VisionOutcome::Description(text) => text.clone(),
            VisionOutcome::Failed => "图像理解失败".to_string(),
            VisionOutcome::Restricted => "内容审核限制，无法处理此图片".to_string(),
            VisionOutcome::Exception => "API调用异常，无法处理此图片".to_string(),
            VisionOutcome::MissingImage(path) => format!("错误：图像文件不存在 - {}", path),
            VisionOutcome::EncodeFailed => "错误：图像编码失败".to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, VisionOutcome::Description(_))
    }

    /// リトライで回復し得る失敗か（内容審査・画像欠損は終端扱い）
    pub fn is_retryable(&self) -> bool {
        matches!(self, VisionOutcome::Failed | VisionOutcome::Exception)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_new_single_line() {
        let p = Prediction::new("3", "  B\n因为按钮是红色\r\n ");
        assert_eq!(p.id, "3");
        assert_eq!(p.answer, "B 因为按钮是红色");
        assert!(!p.answer.contains('\n'));
    }

    #[test]
    fn test_prediction_is_blank() {
        assert!(Prediction::new("1", "").is_blank());
        assert!(Prediction { id: "1".into(), answer: "  ".into() }.is_blank());
        assert!(!Prediction::new("1", "C").is_blank());
    }

    #[test]
    fn test_outcome_failure_variants() {
        let failures = vec![
            VisionOutcome::Failed,
            VisionOutcome::Restricted,
            VisionOutcome::Exception,
            VisionOutcome::MissingImage("a.png".into()),
            VisionOutcome::EncodeFailed,
        ];
        for outcome in failures {
            assert!(outcome.is_failure(), "失敗扱いされない: {}", outcome.text());
        }
        // 説明文に「限制」などを含んでも失敗ではない
        let ok = VisionOutcome::Description("路牌上写着限制速度60".into());
        assert!(!ok.is_failure());
    }

    #[test]
    fn test_outcome_retryable() {
        assert!(VisionOutcome::Failed.is_retryable());
        assert!(VisionOutcome::Exception.is_retryable());
        assert!(!VisionOutcome::Restricted.is_retryable());
        assert!(!VisionOutcome::EncodeFailed.is_retryable());
    }

    #[test]
    fn test_missing_image_text_contains_path() {
        let text = VisionOutcome::MissingImage("img/7.png".into()).text();
        assert!(text.contains("img/7.png"));
        assert!(text.starts_with("错误："));
    }
}
