use crate::error::{Result, VqaError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const API_KEY_ENV: &str = "VQA_API_KEY";
const DEFAULT_API_URL: &str = "https://maas-api.cn-huabei-1.xf-yun.com/v1";

/// モデルごとの呼び出し設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub model_id: String,
    /// `/chat/completions` を除いたベースURL
    pub api_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelConfig {
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

/// 入出力パス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataPaths {
    pub test_csv: PathBuf,
    pub train_csv: PathBuf,
    pub image_dir: PathBuf,
    pub output_csv: PathBuf,
    pub intermediate_dir: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            test_csv: PathBuf::from("test.csv"),
            train_csv: PathBuf::from("train.csv"),
            image_dir: PathBuf::from("图像数据集"),
            output_csv: PathBuf::from("output/submission.csv"),
            intermediate_dir: PathBuf::from("intermediate_results"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    /// 2段階推論Step1（視覚理解）
    pub vision: ModelConfig,
    /// 2段階推論Step2（テキスト推論）
    pub text: ModelConfig,
    /// 1段階推論（画像から直接解答）
    pub direct: ModelConfig,
    /// API呼び出し間隔（秒）
    pub api_delay_secs: f64,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_secs: f64,
    /// 補完パスのリトライ設定
    pub fill_max_retries: u32,
    pub fill_retry_delay_secs: f64,
    pub paths: DataPaths,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| VqaError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("vqa").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            api_key: None,
            vision: ModelConfig {
                model_id: "xqwen2d5s32bvl".into(),
                api_url: DEFAULT_API_URL.into(),
                temperature: 0.1,
                max_tokens: 2000,
            },
            text: ModelConfig {
                model_id: "xopgptoss120b".into(),
                api_url: DEFAULT_API_URL.into(),
                temperature: 0.1,
                max_tokens: 500,
            },
            direct: ModelConfig {
                model_id: "xqwen2d5s32bvl".into(),
                api_url: DEFAULT_API_URL.into(),
                temperature: 0.2,
                max_tokens: 512,
            },
            api_delay_secs: 1.0,
            timeout_seconds: 60,
            max_retries: 3,
            retry_delay_secs: 2.0,
            fill_max_retries: 5,
            fill_retry_delay_secs: 3.0,
            paths: DataPaths::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 || self.fill_max_retries == 0 {
            return Err(VqaError::Config("リトライ回数は1以上にしてください".into()));
        }
        for secs in [self.api_delay_secs, self.retry_delay_secs, self.fill_retry_delay_secs] {
            secs_to_duration(secs)?;
        }
        if self.timeout_seconds == 0 {
            return Err(VqaError::Config("タイムアウトは1秒以上にしてください".into()));
        }
        Ok(())
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(VqaError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn api_delay(&self) -> Result<Duration> {
        secs_to_duration(self.api_delay_secs)
    }

    pub fn retry_delay(&self) -> Result<Duration> {
        secs_to_duration(self.retry_delay_secs)
    }

    pub fn fill_retry_delay(&self) -> Result<Duration> {
        secs_to_duration(self.fill_retry_delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// 秒数をDurationに変換（負数・NaN・桁あふれはエラー）
fn secs_to_duration(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| VqaError::Config(format!("待機秒数が不正です: {}", secs)))
}
