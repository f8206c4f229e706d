//! 画像ファイルのData URL化
//!
//! ファイルを読み込みbase64エンコードし、`data:<mime>;base64,` を付与する

use crate::error::{Result, VqaError};
use base64::Engine;
use std::path::{Path, PathBuf};

const DEFAULT_MIME: &str = "image/jpeg";

/// 入力CSVの画像パスと画像ディレクトリの対応付け
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ImageLayout {
    /// 画像ディレクトリ直下にファイル名だけで置かれている
    #[default]
    Flat,
    /// 画像ディレクトリからの相対パスをそのまま使う
    Nested,
}

/// 画像の実パスを解決する。ファイルが存在しなければNone
pub fn resolve_image_path(image_dir: &Path, image: &str, layout: ImageLayout) -> Option<PathBuf> {
    let relative = Path::new(image);
    let path = match layout {
        ImageLayout::Flat => image_dir.join(relative.file_name()?),
        ImageLayout::Nested => image_dir.join(relative),
    };
    path.is_file().then_some(path)
}

/// 拡張子からMIMEタイプを推定（不明ならimage/jpeg）
pub fn mime_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_MIME.to_string())
}

/// 画像ファイルをData URL文字列にエンコード
pub fn encode_image(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| VqaError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:{};base64,{}", mime_type_for(path), encoded))
}
