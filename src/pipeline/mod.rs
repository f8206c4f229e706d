//! バッチ推論ドライバ
//!
//! 入力行を順番に1件ずつ処理する。API呼び出しの後には必ず固定の待機を入れ、
//! 呼び出しを行わなかった行（画像欠損・Step1失敗）では待機しない

pub mod summary;
pub mod vision_log;

pub use vision_log::VisionLog;

use crate::analyzer::{ask_direct, reason_with_text, understand_image};
use crate::client::ChatApi;
use crate::config::{Config, ModelConfig};
use crate::encoder::{encode_image, resolve_image_path, ImageLayout};
use crate::error::Result;
use crate::retry::{pause, RetryPolicy};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use vqa_common::{InputRow, Prediction, VisionOutcome, FALLBACK_ANSWER};

/// 1行分の解答をどの経路で求めるか
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Resolver {
    /// 1段階推論（失敗時は空文字）
    #[default]
    Direct,
    /// 2段階推論（失敗時は既定解答）
    TwoStage,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub vision: ModelConfig,
    pub text: ModelConfig,
    pub direct: ModelConfig,
    pub image_dir: PathBuf,
    pub layout: ImageLayout,
    /// API呼び出し後の待機
    pub api_delay: Duration,
    pub vision_retry: RetryPolicy,
    pub direct_retry: RetryPolicy,
}

impl PipelineSettings {
    pub fn from_config(config: &Config, image_dir: PathBuf, layout: ImageLayout) -> Result<Self> {
        let retry = RetryPolicy::new(config.max_retries, config.retry_delay()?);
        Ok(Self {
            vision: config.vision.clone(),
            text: config.text.clone(),
            direct: config.direct.clone(),
            image_dir,
            layout,
            api_delay: config.api_delay()?,
            vision_retry: retry,
            direct_retry: retry,
        })
    }

    pub fn with_direct_retry(mut self, retry: RetryPolicy) -> Self {
        self.direct_retry = retry;
        self
    }
}

pub struct Pipeline<'a, C: ChatApi> {
    api: &'a C,
    settings: PipelineSettings,
    show_progress: bool,
}

impl<'a, C: ChatApi> Pipeline<'a, C> {
    pub fn new(api: &'a C, settings: PipelineSettings) -> Self {
        Self {
            api,
            settings,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn progress_bar(&self, len: usize, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        let style = ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("=> "));
        bar.set_message(message);
        bar
    }

    /// 画像の解決とエンコード。失敗時はStep1の失敗結果を返す
    fn load_image(&self, row: &InputRow) -> std::result::Result<String, VisionOutcome> {
        let path = resolve_image_path(&self.settings.image_dir, &row.image, self.settings.layout)
            .ok_or_else(|| {
                warn!(id = %row.id, image = %row.image, "画像が存在しない");
                VisionOutcome::MissingImage(row.image.clone())
            })?;

        encode_image(&path).map_err(|e| {
            warn!(id = %row.id, "画像エンコード失敗: {}", e);
            VisionOutcome::EncodeFailed
        })
    }

    /// Step1: 1行分の視覚理解
    pub async fn vision_for_row(&self, row: &InputRow) -> VisionOutcome {
        let data_url = match self.load_image(row) {
            Ok(url) => url,
            Err(outcome) => return outcome,
        };

        let outcome = understand_image(
            self.api,
            &self.settings.vision,
            &data_url,
            &row.question,
            &self.settings.vision_retry,
        )
        .await;

        if outcome.is_failure() {
            let text = outcome.text();
            let head: String = text.chars().take(50).collect();
            warn!(id = %row.id, "画像処理に問題あり: {}...", head);
        }

        pause(self.settings.api_delay).await;
        outcome
    }

    /// Step2: 1行分のテキスト推論。Step1失敗時はAPIを呼ばず既定解答
    pub async fn reasoning_for_row(&self, row: &InputRow, understanding: &VisionOutcome) -> String {
        let text = match understanding {
            VisionOutcome::Description(text) => text,
            // APIを呼ばないので待機もしない
            _ => return FALLBACK_ANSWER.to_string(),
        };

        let answer = reason_with_text(self.api, &self.settings.text, text, &row.question).await;
        pause(self.settings.api_delay).await;
        answer
    }

    /// 1段階推論で1行分の解答。画像が無ければNone（APIは呼ばない）
    pub async fn direct_for_row(&self, row: &InputRow) -> Option<String> {
        let data_url = self.load_image(row).ok()?;

        let answer = ask_direct(
            self.api,
            &self.settings.direct,
            &data_url,
            &row.question,
            &self.settings.direct_retry,
        )
        .await;

        pause(self.settings.api_delay).await;
        Some(answer)
    }

    /// Step1を全行に対して実行
    pub async fn stage1_vision(
        &self,
        rows: &[InputRow],
        mut log: Option<&mut VisionLog>,
    ) -> Result<HashMap<String, VisionOutcome>> {
        let bar = self.progress_bar(rows.len(), "視覚理解");
        let mut results = HashMap::with_capacity(rows.len());

        for row in rows {
            let outcome = self.vision_for_row(row).await;
            if let Some(log) = log.as_deref_mut() {
                log.record(row, &outcome)?;
            }
            results.insert(row.id.clone(), outcome);
            bar.inc(1);
        }

        bar.finish_and_clear();
        let failed = results.values().filter(|o| o.is_failure()).count();
        info!(total = rows.len(), failed, "Step1完了");
        Ok(results)
    }

    /// Step2を全行に対して実行
    pub async fn stage2_reasoning(
        &self,
        rows: &[InputRow],
        understanding: &HashMap<String, VisionOutcome>,
    ) -> Vec<Prediction> {
        let bar = self.progress_bar(rows.len(), "テキスト推論");
        let mut predictions = Vec::with_capacity(rows.len());

        for row in rows {
            let answer = match understanding.get(&row.id) {
                Some(outcome) => self.reasoning_for_row(row, outcome).await,
                None => FALLBACK_ANSWER.to_string(),
            };
            predictions.push(Prediction::new(row.id.clone(), &answer));
            bar.inc(1);
        }

        bar.finish_and_clear();
        predictions
    }

    /// 2段階推論（Step1を全行 → Step2を全行）
    pub async fn run_two_stage(
        &self,
        rows: &[InputRow],
        log: Option<&mut VisionLog>,
    ) -> Result<Vec<Prediction>> {
        let understanding = self.stage1_vision(rows, log).await?;
        Ok(self.stage2_reasoning(rows, &understanding).await)
    }

    /// 1段階推論を全行に対して実行
    pub async fn run_direct(&self, rows: &[InputRow]) -> Vec<Prediction> {
        let bar = self.progress_bar(rows.len(), "推論");
        let mut predictions = Vec::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            let answer = self.direct_for_row(row).await.unwrap_or_default();
            info!("[{:>3}/{}] id={} 完了", idx + 1, rows.len(), row.id);
            predictions.push(Prediction::new(row.id.clone(), &answer));
            bar.inc(1);
        }

        bar.finish_and_clear();
        predictions
    }

    /// 補完用に1行だけ解き直す。画像が無ければNone
    pub async fn resolve_row(&self, row: &InputRow, resolver: Resolver) -> Option<String> {
        match resolver {
            Resolver::Direct => self.direct_for_row(row).await,
            Resolver::TwoStage => {
                let outcome = self.vision_for_row(row).await;
                if matches!(outcome, VisionOutcome::MissingImage(_)) {
                    return None;
                }
                Some(self.reasoning_for_row(row, &outcome).await)
            }
        }
    }
}
