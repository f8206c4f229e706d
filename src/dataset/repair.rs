//! 提出CSVの文字コード修復
//!
//! BOM付き・GBKなどで保存されたCSVを、BOMなしUTF-8として書き直す。
//! 元の文字コードは推定し、推定できなければGBKとして読む。
//! デコードできない文字は捨てる

use super::strip_bom;
use crate::error::{Result, VqaError};
use chardetng::EncodingDetector;
use csv::{ReaderBuilder, WriterBuilder};
use encoding_rs::{Encoding, GBK, UTF_8};
use std::path::{Path, PathBuf};

/// 修復結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairReport {
    /// 推定した元の文字コード
    pub source_encoding: &'static str,
    pub had_bom: bool,
    /// デコードできずに捨てた文字数
    pub dropped_chars: usize,
    pub records: usize,
}

/// 元の文字コードを推定する
///
/// UTF-8として正しければUTF-8。そうでなければ中国語圏を前提に推定し、
/// 推定結果で読めない場合はGBKに倒す
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guessed = detector.guess(Some(b"cn".as_slice()), true);

    let (_, had_errors) = guessed.decode_without_bom_handling(bytes);
    if guessed == UTF_8 || had_errors {
        GBK
    } else {
        guessed
    }
}

/// 指定の文字コードでデコードし、読めなかった文字を捨てる
///
/// 戻り値は (デコード結果, 捨てた文字数)
pub fn decode_dropping_invalid(bytes: &[u8], encoding: &'static Encoding) -> (String, usize) {
    let (decoded, had_errors) = encoding.decode_without_bom_handling(bytes);
    if !had_errors {
        return (decoded.into_owned(), 0);
    }

    let dropped = decoded.chars().filter(|&c| c == char::REPLACEMENT_CHARACTER).count();
    let text = decoded.chars().filter(|&c| c != char::REPLACEMENT_CHARACTER).collect();
    (text, dropped)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// CSVファイルをBOMなしUTF-8で書き直す
///
/// 一時ファイルに書き出してから置き換える
pub fn repair_encoding(path: &Path) -> Result<RepairReport> {
    if !path.exists() {
        return Err(VqaError::FileNotFound(path.display().to_string()));
    }

    let raw = std::fs::read(path)?;
    let body = strip_bom(&raw);
    let had_bom = body.len() != raw.len();
    let encoding = detect_encoding(body);
    let (text, dropped_chars) = decode_dropping_invalid(body, encoding);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let temp = temp_path_for(path);
    let mut records = 0;
    {
        let mut writer = WriterBuilder::new().flexible(true).from_path(&temp)?;
        for record in reader.records() {
            writer.write_record(&record?)?;
            records += 1;
        }
        writer.flush()?;
    }
    std::fs::rename(&temp, path)?;

    Ok(RepairReport {
        source_encoding: encoding.name(),
        had_bom,
        dropped_chars,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gbk_bytes(text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = GBK.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    #[test]
    fn test_detect_utf8() {
        assert_eq!(detect_encoding("id,answer\n1,红色\n".as_bytes()), UTF_8);
    }

    #[test]
    fn test_detect_gbk() {
        let bytes = gbk_bytes("id,answer\n1,红色按钮\n2,左下角的表格中有两行数据\n");
        assert_eq!(detect_encoding(&bytes), GBK);
    }

    #[test]
    fn test_decode_drops_invalid_chars() {
        let (text, dropped) = decode_dropping_invalid(b"id\xFF,answer", UTF_8);
        assert_eq!(text, "id,answer");
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_decode_valid_input_untouched() {
        let (text, dropped) = decode_dropping_invalid("答案".as_bytes(), UTF_8);
        assert_eq!(text, "答案");
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_repair_transcodes_gbk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        let original = "id,answer\n1,红色\n2,图中按钮位于右上角\n";
        std::fs::write(&path, gbk_bytes(original)).unwrap();

        let report = repair_encoding(&path).unwrap();
        assert_eq!(report.source_encoding, "GBK");
        assert_eq!(report.dropped_chars, 0);
        assert_eq!(report.records, 3);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_repair_strips_bom() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.csv");
        std::fs::write(&path, "\u{feff}id,answer\n1,A\n2,\n").unwrap();

        let report = repair_encoding(&path).unwrap();
        assert!(report.had_bom);
        assert_eq!(report.source_encoding, "UTF-8");
        assert_eq!(report.records, 3);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,answer\n1,A\n2,\n");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_repair_missing_file() {
        let result = repair_encoding(Path::new("/nonexistent/output.csv"));
        assert!(matches!(result, Err(VqaError::FileNotFound(_))));
    }
}
