use thiserror::Error;

#[derive(Error, Debug)]
pub enum VqaError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`vqa config --set-api-key YOUR_KEY` または環境変数 VQA_API_KEY で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] vqa_common::Error),
}

pub type Result<T> = std::result::Result<T, VqaError>;
