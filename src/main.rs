use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vqa_rust::{cli, config, dataset, error, gapfill, pipeline, retry};
use cli::{Cli, Commands, PathArgs};
use config::Config;
use error::{Result, VqaError};
use pipeline::summary::print_summary;
use pipeline::vision_log::{PROBE_LOG_FILE, VISION_LOG_FILE};
use pipeline::{Pipeline, PipelineSettings, VisionLog};
use retry::RetryPolicy;
use vqa_rust::client::HttpChatClient;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

/// CLI指定を設定ファイルの値に重ねる
fn apply_path_args(config: &mut Config, paths: &PathArgs) -> Result<()> {
    if let Some(input) = &paths.input {
        config.paths.test_csv = input.clone();
    }
    if let Some(dir) = &paths.image_dir {
        config.paths.image_dir = dir.clone();
    }
    if let Some(output) = &paths.output {
        config.paths.output_csv = output.clone();
    }
    if let Some(delay) = paths.delay {
        config.api_delay_secs = delay;
    }
    config.validate()
}

fn http_client(config: &Config) -> Result<HttpChatClient> {
    HttpChatClient::new(config.get_api_key()?, config.timeout())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut config = Config::load()?;

    match cli.command {
        Commands::Run { paths, layout, intermediate_dir } => {
            println!("🧠 vqa - 2段階推論\n");
            apply_path_args(&mut config, &paths)?;
            let client = http_client(&config)?;

            println!("[1/4] 入力CSVを読み込み中...");
            let rows = dataset::load_input_rows(&config.paths.test_csv)?;
            println!("✔ {}件\n", rows.len());

            let settings = PipelineSettings::from_config(&config, config.paths.image_dir.clone(), layout)?;
            let pipeline = Pipeline::new(&client, settings).with_progress(true);

            println!("[2/4] 視覚理解中...");
            let log_dir = intermediate_dir.unwrap_or_else(|| config.paths.intermediate_dir.clone());
            let mut log = VisionLog::create(&log_dir, VISION_LOG_FILE)?;
            let understanding = pipeline.stage1_vision(&rows, Some(&mut log)).await?;
            println!("✔ 中間結果を保存: {}\n", log.path().display());

            println!("[3/4] テキスト推論中...");
            let predictions = pipeline.stage2_reasoning(&rows, &understanding).await;
            println!("✔ 推論完了\n");

            println!("[4/4] 結果を保存中...");
            dataset::write_predictions(&config.paths.output_csv, &predictions)?;
            println!("✔ 結果を保存: {}\n", config.paths.output_csv.display());

            print_summary(&predictions);
            println!("\n✅ 完了");
        }

        Commands::Direct { paths, layout } => {
            println!("🧠 vqa - 1段階推論\n");
            apply_path_args(&mut config, &paths)?;
            let client = http_client(&config)?;

            let rows = dataset::load_input_rows(&config.paths.test_csv)?;
            println!("全{}件を推論します", rows.len());

            let settings = PipelineSettings::from_config(&config, config.paths.image_dir.clone(), layout)?;
            let pipeline = Pipeline::new(&client, settings).with_progress(true);
            let predictions = pipeline.run_direct(&rows).await;

            dataset::write_predictions(&config.paths.output_csv, &predictions)?;
            let blank = predictions.iter().filter(|p| p.is_blank()).count();
            println!("✔ 結果を保存: {} (空解答 {}件)", config.paths.output_csv.display(), blank);
            if blank > 0 {
                println!("  `vqa fill` で空解答を補完できます");
            }
            println!("\n✅ 完了");
        }

        Commands::Fill { paths, layout, resolver } => {
            println!("🩹 vqa - 空解答の補完\n");
            apply_path_args(&mut config, &paths)?;
            let client = http_client(&config)?;

            let fill_retry = RetryPolicy::new(config.fill_max_retries, config.fill_retry_delay()?);
            let settings = PipelineSettings::from_config(&config, config.paths.image_dir.clone(), layout)?
                .with_direct_retry(fill_retry);
            let pipeline = Pipeline::new(&client, settings);

            let report = gapfill::fill_output_file(
                &pipeline,
                &config.paths.test_csv,
                &config.paths.output_csv,
                resolver,
            )
            .await?;

            if !report.written {
                println!("✔ すべての解答が生成済みです。補完は不要です");
            } else {
                println!("✔ 空解答 {}件中 {}件を補完", report.blank, report.filled);
                if !report.unknown_ids.is_empty() {
                    println!("  入力CSVに無いid: {}", report.unknown_ids.join(", "));
                }
                if !report.missing_images.is_empty() {
                    println!("  画像が無いid: {}", report.missing_images.join(", "));
                }
                println!("✔ 上書き保存: {}", config.paths.output_csv.display());
                println!("\n✅ 補完完了 (残り空解答 {}件)", report.still_blank());
            }
        }

        Commands::Probe { input, image_dir, count, layout } => {
            println!("🔎 vqa - 視覚理解の試行\n");
            let client = http_client(&config)?;

            let train_csv = input.unwrap_or_else(|| config.paths.train_csv.clone());
            let image_dir = image_dir.unwrap_or_else(|| config.paths.image_dir.clone());
            let rows = dataset::load_input_rows(&train_csv)?;
            let sample: Vec<_> = rows.into_iter().take(count).collect();
            println!("学習データから{}件を処理", sample.len());

            let settings = PipelineSettings::from_config(&config, image_dir, layout)?;
            let pipeline = Pipeline::new(&client, settings).with_progress(true);
            let mut log = VisionLog::create(&config.paths.intermediate_dir, PROBE_LOG_FILE)?;
            let results = pipeline.stage1_vision(&sample, Some(&mut log)).await?;

            let failed = results.values().filter(|o| o.is_failure()).count();
            println!("✔ 成功 {}件 / 失敗 {}件", results.len() - failed, failed);
            println!("✔ 結果を保存: {}", log.path().display());
        }

        Commands::Repair { file } => {
            let target: PathBuf = file.unwrap_or_else(|| config.paths.output_csv.clone());
            let report = dataset::repair::repair_encoding(&target)?;
            println!("✔ {} をBOMなしUTF-8に修復しました", target.display());
            println!("  元の文字コード: {}", report.source_encoding);
            println!("  レコード: {}件", report.records);
            if report.had_bom {
                println!("  BOMを除去");
            }
            if report.dropped_chars > 0 {
                println!("  デコードできない文字を除去: {}文字", report.dropped_chars);
            }
        }

        Commands::Config { set_api_key, show } => {
            if let Some(key) = set_api_key {
                if key.trim().is_empty() {
                    return Err(VqaError::Config("APIキーが空です".into()));
                }
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  視覚モデル: {} ({})", config.vision.model_id, config.vision.endpoint());
                println!("  テキストモデル: {} ({})", config.text.model_id, config.text.endpoint());
                println!("  1段階モデル: {} ({})", config.direct.model_id, config.direct.endpoint());
                println!("  呼び出し間隔: {}秒", config.api_delay_secs);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  リトライ: {}回 / 補完時 {}回", config.max_retries, config.fill_max_retries);
                println!("  入力CSV: {}", config.paths.test_csv.display());
                println!("  画像ディレクトリ: {}", config.paths.image_dir.display());
                println!("  提出CSV: {}", config.paths.output_csv.display());
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}
