//! 入力CSV・提出CSVの読み書き
//!
//! - 入力: `id, question, image`（UTF-8、先頭BOM許容）
//! - 出力: `id, answer`（UTF-8、BOMなし）

pub mod repair;

use crate::error::{Result, VqaError};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::warn;
use vqa_common::{InputRow, Prediction};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const OUTPUT_HEADERS: [&str; 2] = ["id", "answer"];

/// 先頭のUTF-8 BOMを取り除く
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

fn read_records<T: DeserializeOwned>(path: &Path, trim: Trim) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(VqaError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let mut reader = ReaderBuilder::new()
        .trim(trim)
        .from_reader(strip_bom(&bytes));

    let mut records = Vec::new();
    for record in reader.deserialize::<T>() {
        records.push(record?);
    }
    Ok(records)
}

/// 入力CSVを読み込む
///
/// idが重複する行は最初の1行のみ残す
pub fn load_input_rows(path: &Path) -> Result<Vec<InputRow>> {
    let rows: Vec<InputRow> = read_records(path, Trim::All)?;
    Ok(dedup_by_id(rows))
}

pub fn dedup_by_id(rows: Vec<InputRow>) -> Vec<InputRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| {
            let first = seen.insert(row.id.clone());
            if !first {
                warn!(id = %row.id, "重複したidをスキップ");
            }
            first
        })
        .collect()
}

/// id → 入力行のマップ
pub fn index_by_id(rows: &[InputRow]) -> HashMap<&str, &InputRow> {
    rows.iter().map(|row| (row.id.as_str(), row)).collect()
}

/// 既存の提出CSVを読み込む
///
/// 書き戻しても解答済みの行が変わらないよう、値は前後の空白も含めてそのまま保持する
pub fn load_predictions(path: &Path) -> Result<Vec<Prediction>> {
    read_records(path, Trim::Headers)
}

/// 提出CSVを書き出す（既存ファイルは全体を上書き）
pub fn write_predictions(path: &Path, predictions: &[Prediction]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(OUTPUT_HEADERS)?;
    for prediction in predictions {
        writer.write_record([prediction.id.as_str(), prediction.answer.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
