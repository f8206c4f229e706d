use crate::encoder::ImageLayout;
use crate::pipeline::Resolver;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vqa")]
#[command(about = "画像+問題の2段階推論で選択式解答を生成し提出CSVを出力する", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// 入出力パスの上書き指定（省略時は設定ファイルの値）
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PathArgs {
    /// 入力CSV（id, question, image）
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// 画像ディレクトリ
    #[arg(long)]
    pub image_dir: Option<PathBuf>,

    /// 提出CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// API呼び出し間隔（秒）
    #[arg(long)]
    pub delay: Option<f64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 2段階推論（視覚理解 → テキスト推論）で提出CSVを生成
    Run {
        #[command(flatten)]
        paths: PathArgs,

        /// 画像パスの解決方法
        #[arg(long, value_enum, default_value = "nested")]
        layout: ImageLayout,

        /// 中間結果の出力ディレクトリ
        #[arg(long)]
        intermediate_dir: Option<PathBuf>,
    },

    /// 1段階推論（画像から直接解答）で提出CSVを生成
    Direct {
        #[command(flatten)]
        paths: PathArgs,

        /// 画像パスの解決方法
        #[arg(long, value_enum, default_value = "flat")]
        layout: ImageLayout,
    },

    /// 提出CSVの空解答だけを解き直して上書き
    Fill {
        #[command(flatten)]
        paths: PathArgs,

        /// 画像パスの解決方法
        #[arg(long, value_enum, default_value = "flat")]
        layout: ImageLayout,

        /// 解き直しに使う推論経路
        #[arg(long, value_enum, default_value = "direct")]
        resolver: Resolver,
    },

    /// 学習CSVの先頭N件で視覚理解だけを試す
    Probe {
        /// 学習CSV（省略時は設定ファイルの値）
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// 画像ディレクトリ
        #[arg(long)]
        image_dir: Option<PathBuf>,

        /// 試行件数
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        /// 画像パスの解決方法
        #[arg(long, value_enum, default_value = "nested")]
        layout: ImageLayout,
    },

    /// CSVをBOMなしUTF-8に修復
    Repair {
        /// 対象CSV（省略時は設定ファイルの提出CSV）
        file: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
