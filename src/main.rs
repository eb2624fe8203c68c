// Command-line entry point. The library in lib.rs holds everything else.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use slimify_lib::{
    AppConfig, CompressionReport, CompressorController, CompressorResult, Shell, VideoMode,
    compress_image, compress_video,
};

#[derive(Parser)]
#[command(name = "slimify")]
#[command(about = "Compress images and videos with ffmpeg", version)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ffmpeg executable (overrides config and SLIMIFY_FFMPEG)
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// -v for debug, -vv for trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress an image to JPEG
    Image {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compress a video to H.264 MP4
    Video {
        input: PathBuf,
        /// fast, balanced or high
        #[arg(short, long, default_value = "fast")]
        mode: VideoMode,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the page state as JSON
    View {
        #[arg(long)]
        dark: bool,
    },
}

fn init_tracing(config: &AppConfig, verbose: u8) {
    let default_filter = match verbose {
        0 => config.log_filter.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// `[#####-----]` for a width in percent.
fn progress_bar(width: u8) -> String {
    let filled = usize::from(width.min(100)) / 10;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled))
}

/// Logs progress every ten percent until the task settles.
fn spawn_progress_logger(controller: &Arc<CompressorController>) -> tokio::task::JoinHandle<()> {
    let mut updates = controller.subscribe();
    tokio::spawn(async move {
        let mut last_logged = 0;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if !snapshot.phase.is_busy() {
                break;
            }
            if snapshot.progress >= last_logged + 10 {
                last_logged = snapshot.progress - snapshot.progress % 10;
                info!(
                    "{} {} {}",
                    snapshot.kind,
                    progress_bar(snapshot.bar_width()),
                    snapshot.display_text()
                );
            }
        }
    })
}

/// Runs `job`, canceling the controller's task on Ctrl-C.
async fn run_cancellable(
    controller: &Arc<CompressorController>,
    job: impl Future<Output = CompressorResult<CompressionReport>>,
) -> CompressorResult<CompressionReport> {
    let logger = spawn_progress_logger(controller);
    tokio::pin!(job);

    let result = tokio::select! {
        result = &mut job => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, canceling compression");
            controller.cancel();
            job.await
        }
    };

    logger.abort();
    result
}

fn print_report(report: &CompressionReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    let stats = &report.stats;
    if let Some(mode) = report.mode {
        println!("Mode: {}", mode.label());
    }
    println!(
        "{} → {} ({} → {} bytes, {:.1}% saved)",
        report.input_path,
        report.output_path,
        stats.original_size,
        stats.compressed_size,
        stats.compression_ratio
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    if let Some(ffmpeg) = cli.ffmpeg {
        config.ffmpeg_path = ffmpeg;
    }

    init_tracing(&config, cli.verbose);
    info!("=== Slimify starting ===");
    debug!("Configuration: {:?}", config);

    let mut shell = Shell::with_ffmpeg(&config);

    let outcome = match cli.cmd {
        Command::Image { input, output } => {
            let controller = Arc::clone(shell.image());
            run_cancellable(&controller, compress_image(&controller, &input, output))
                .await
                .map(Some)
        }
        Command::Video { input, mode, output } => {
            let controller = Arc::clone(shell.video());
            run_cancellable(&controller, compress_video(&controller, &input, mode, output))
                .await
                .map(Some)
        }
        Command::View { dark } => {
            if dark {
                shell.toggle_theme();
            }
            println!("{}", serde_json::to_string_pretty(&shell.view())?);
            Ok(None)
        }
    };

    if let Err(e) = shell.shutdown().await {
        warn!("Engine shutdown failed: {}", e);
    }

    if let Some(report) = outcome.context("Compression failed")? {
        print_report(&report, cli.json)?;
    }
    info!("=== Slimify exiting ===");
    Ok(())
}
