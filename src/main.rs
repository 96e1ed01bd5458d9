use anyhow::{Context, Result};
use clap::Parser;
use image_recognizer::{config::TensorLayout, Config, ConsoleReporter, Recognizer};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "image-recognizer")]
#[command(about = "Recognize objects in a folder of images with a pre-trained MobileNetV2 model")]
struct Args {
    /// Folder to scan for images (defaults to `images` next to the executable)
    #[arg(long)]
    images_dir: Option<PathBuf>,

    /// Model directory path
    #[arg(long, default_value = "models")]
    models_dir: String,

    /// Number of predictions shown per image
    #[arg(long, default_value_t = image_recognizer::config::DEFAULT_TOP_K)]
    top_k: usize,

    /// ONNX Runtime intra-op threads
    #[arg(long)]
    threads: Option<usize>,

    /// Input tensor layout expected by the model (nhwc or nchw)
    #[arg(long, default_value = "nhwc")]
    layout: String,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // 日志写到stderr，stdout只保留分析报告
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let mut reporter = ConsoleReporter::new(io::stdout());
    let _ = reporter.banner();

    // 批处理在阻塞线程上顺序执行，主任务只负责等待完成或Ctrl-C
    let batch = tokio::task::spawn_blocking(move || run(args));

    let code = tokio::select! {
        joined = batch => match joined {
            Ok(Ok(())) => ExitCode::SUCCESS,
            Ok(Err(e)) => {
                let _ = reporter.fatal(format!("{:#}", e));
                ExitCode::FAILURE
            }
            Err(e) => {
                let _ = reporter.fatal(e);
                ExitCode::FAILURE
            }
        },
        signal = tokio::signal::ctrl_c() => {
            match &signal {
                Ok(()) => {
                    let _ = reporter.interrupted();
                }
                Err(e) => {
                    let _ = reporter.fatal(format!("failed to listen for Ctrl-C: {}", e));
                }
            }
            let _ = reporter.farewell();
            // 运行时退出时会等待阻塞线程，这里直接结束进程
            std::process::exit(signal_exit_code(&signal));
        }
    };

    let _ = reporter.farewell();
    code
}

/// Ctrl-C 为 130；信号监听本身失败按普通错误处理
fn signal_exit_code(signal: &io::Result<()>) -> i32 {
    match signal {
        Ok(()) => 130,
        Err(_) => 1,
    }
}

fn run(args: Args) -> Result<()> {
    let layout: TensorLayout = args.layout.parse()?;
    let config = Config::new(
        args.images_dir,
        args.models_dir,
        args.top_k,
        args.threads,
        layout,
    )?;

    tracing::info!("Images directory: {}", config.images_dir.display());
    tracing::info!("Models directory: {}", config.models_dir.display());

    let mut reporter = ConsoleReporter::new(io::stdout());
    reporter.model_loading()?;
    let recognizer = Recognizer::new(&config).context("failed to initialize recognizer")?;
    reporter.model_loaded()?;

    recognizer.analyze_all_images(&config.images_dir, config.top_k, &mut reporter)?;
    Ok(())
}
