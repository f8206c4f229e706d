//! 空解答の補完パス
//!
//! 既存の提出CSVから解答が空の行だけを選び、同じidの入力行を解き直して
//! ファイル全体を上書きする。解答済みの行と行順は変更しない

use crate::client::ChatApi;
use crate::dataset;
use crate::error::Result;
use crate::pipeline::{Pipeline, Resolver};
use std::path::Path;
use tracing::{info, warn};
use vqa_common::{InputRow, Prediction};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// 補完対象（空解答）の件数
    pub blank: usize,
    /// 空でない解答で埋まった件数
    pub filled: usize,
    /// 入力CSVにidが無かった行
    pub unknown_ids: Vec<String>,
    /// 画像が見つからなかった行
    pub missing_images: Vec<String>,
    /// 出力ファイルを書き直したか
    pub written: bool,
}

impl FillReport {
    pub fn still_blank(&self) -> usize {
        self.blank - self.filled
    }
}

/// メモリ上の予測結果の空解答を埋める
pub async fn fill_blank_answers<C: ChatApi>(
    pipeline: &Pipeline<'_, C>,
    input_rows: &[InputRow],
    predictions: &mut [Prediction],
    resolver: Resolver,
) -> FillReport {
    let index = dataset::index_by_id(input_rows);
    let targets: Vec<usize> = predictions
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_blank())
        .map(|(i, _)| i)
        .collect();

    let mut report = FillReport {
        blank: targets.len(),
        ..Default::default()
    };

    for (n, &i) in targets.iter().enumerate() {
        let id = predictions[i].id.clone();
        let Some(row) = index.get(id.trim()) else {
            warn!(id = %id, "入力CSVにidが見つからないためスキップ");
            report.unknown_ids.push(id);
            continue;
        };

        match pipeline.resolve_row(row, resolver).await {
            Some(answer) => {
                predictions[i] = Prediction::new(id.clone(), &answer);
                if !predictions[i].is_blank() {
                    report.filled += 1;
                }
                info!("[{:>2}/{}] id={} 補完完了", n + 1, targets.len(), id);
            }
            None => {
                warn!(id = %id, image = %row.image, "画像が存在しないためスキップ");
                report.missing_images.push(id);
            }
        }
    }

    report
}

/// 提出CSVの空解答を補完して上書き保存する
///
/// 空解答が1件もなければファイルには触れない
pub async fn fill_output_file<C: ChatApi>(
    pipeline: &Pipeline<'_, C>,
    input_csv: &Path,
    output_csv: &Path,
    resolver: Resolver,
) -> Result<FillReport> {
    let input_rows = dataset::load_input_rows(input_csv)?;
    let mut predictions = dataset::load_predictions(output_csv)?;

    if !predictions.iter().any(Prediction::is_blank) {
        info!("空解答なし、補完不要");
        return Ok(FillReport::default());
    }

    let mut report = fill_blank_answers(pipeline, &input_rows, &mut predictions, resolver).await;
    dataset::write_predictions(output_csv, &predictions)?;
    report.written = true;
    Ok(report)
}
