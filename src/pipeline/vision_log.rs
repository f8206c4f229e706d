//! 視覚理解結果の中間ファイル
//!
//! 行ごとに追記してflushするため、途中で止まってもそこまでの結果は残る

use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use vqa_common::{InputRow, VisionOutcome};

pub const VISION_LOG_FILE: &str = "vision_understanding.txt";
pub const PROBE_LOG_FILE: &str = "vision_probe.txt";

pub struct VisionLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl VisionLog {
    /// ディレクトリを作成し、ヘッダ付きで新規作成（既存ファイルは上書き）
    pub fn create(dir: &Path, file_name: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        let mut writer = BufWriter::new(File::create(&path)?);

        writeln!(writer, "视觉理解结果 - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(writer, "{}", "=".repeat(50))?;
        writeln!(writer)?;
        writer.flush()?;

        Ok(Self { writer, path })
    }

    pub fn record(&mut self, row: &InputRow, outcome: &VisionOutcome) -> Result<()> {
        writeln!(self.writer, "ID: {}", row.id)?;
        writeln!(self.writer, "图像: {}", row.image)?;
        writeln!(self.writer, "问题: {}", row.question)?;
        writeln!(self.writer, "理解结果: {}", outcome.text())?;
        writeln!(self.writer, "{}", "-".repeat(30))?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
