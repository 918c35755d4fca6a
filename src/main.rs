//! Vidsub - Batch Video-to-Subtitle Generation
//!
//! Entry point: resolves configuration and the input path (from arguments or
//! an interactive prompt), then hands off to the pipeline.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::{Level, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use vidsub::cli::{Args, Commands};
use vidsub::config::{Config, MediaConfig, TranscriberEngine};
use vidsub::error::VidsubError;
use vidsub::media::{AudioExtractor, FfmpegExtractor, MediaProcessorFactory};
use vidsub::pipeline::{Pipeline, PipelineInput};
use vidsub::subtitle::generate_srt;
use vidsub::transcribe::{Transcriber, TranscriberFactory};

const DEFAULT_CONFIG_FILE: &str = "vidsub.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = setup_logging(args.verbose)?;
    info!("Starting vidsub");

    let mut config = load_config(&args)?;

    match args.command {
        Some(Commands::InitConfig { path }) => {
            Config::default().save_to_file(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
        Some(Commands::Extract { input, output }) => {
            resolve_media_tool(&mut config.media).await?;
            let extractor = FfmpegExtractor::new(config.media.clone());
            extractor.extract_audio(&input, &output).await?;
            println!("Audio written to {}", output.display());
        }
        Some(Commands::Transcribe { input, output }) => {
            let transcriber = TranscriberFactory::create_transcriber(config.transcriber.clone());
            let transcription = transcriber.transcribe(&input).await?;
            generate_srt(&transcription.segments, &output).await?;
            println!("Subtitles written to {}", output.display());
        }
        Some(Commands::Batch { input_dir, output_dir }) => {
            if output_dir.is_some() {
                config.pipeline.output_dir = output_dir;
            }
            resolve_media_tool(&mut config.media).await?;
            run_pipeline(config, PipelineInput::Directory(input_dir)).await?;
        }
        Some(Commands::Process { input, output_dir }) => {
            if output_dir.is_some() {
                config.pipeline.output_dir = output_dir;
            }
            let input = match PipelineInput::from_path(&input)? {
                PipelineInput::Directory(dir) => bail!("{} is a directory; use `batch`", dir.display()),
                file => file,
            };
            resolve_media_tool(&mut config.media).await?;
            run_pipeline(config, input).await?;
        }
        None => {
            resolve_media_tool(&mut config.media).await?;
            let answer = prompt("Enter the path to the folder containing your video files (or a single video file): ")?;
            let input = PipelineInput::from_path(PathBuf::from(answer))?;
            run_pipeline(config, input).await?;
        }
    }

    Ok(())
}

async fn run_pipeline(config: Config, input: PipelineInput) -> Result<()> {
    let extractor = MediaProcessorFactory::create_extractor(config.media.clone());
    let transcriber = TranscriberFactory::create_transcriber(config.transcriber.clone());
    if let Err(e) = transcriber.check_availability().await {
        warn!("Speech engine check failed, transcription will likely fail: {}", e);
    }

    let pipeline = Pipeline::new(extractor, transcriber, config.pipeline.clone())?;
    let report = match pipeline.run(&input).await {
        Ok(report) => report,
        Err(VidsubError::InputInvalid(reason)) => bail!("Nothing to do: {}", reason),
        Err(e) => return Err(e.into()),
    };

    println!("\n{}", report);
    println!("All video files processed.");
    Ok(())
}

/// Load config from `--config`, else `./vidsub.toml`, else defaults, then apply CLI overrides
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    if let Some(ffmpeg) = &args.ffmpeg {
        config.media.binary_path = ffmpeg.clone();
    }
    if let Some(model) = &args.model {
        config.transcriber.model = model.clone();
    }
    if let Some(engine) = &args.engine {
        let engine: TranscriberEngine = engine.parse()?;
        if engine != config.transcriber.engine {
            // a binary configured for another engine would not fit
            config.transcriber.binary_path.clear();
        }
        config.transcriber.engine = engine;
    }

    Ok(config)
}

/// Make sure the media tool runs, asking once for a full path when it does not
async fn resolve_media_tool(media: &mut MediaConfig) -> Result<()> {
    let extractor = FfmpegExtractor::new(media.clone());
    match extractor.check_availability().await {
        Ok(()) => {
            info!("Using FFmpeg from: {}", media.binary_path);
            return Ok(());
        }
        Err(e) => warn!("FFmpeg not usable at '{}': {}", media.binary_path, e),
    }

    if !std::io::stdin().is_terminal() {
        bail!(
            "FFmpeg not found at '{}'. Install it, add it to PATH, or pass --ffmpeg <path>",
            media.binary_path
        );
    }

    let answer = prompt("Please enter the full path to your FFmpeg executable or press Enter to exit: ")?;
    if answer.is_empty() {
        bail!("No path provided and FFmpeg not found. Set media.binary_path in the config or pass --ffmpeg");
    }
    if !Path::new(&answer).is_file() {
        bail!("The provided FFmpeg path \"{}\" is not a valid file", answer);
    }

    let candidate = MediaConfig { binary_path: answer };
    FfmpegExtractor::new(candidate.clone())
        .check_availability()
        .await
        .with_context(|| format!("FFmpeg at '{}' could not be run", candidate.binary_path))?;

    info!("Using FFmpeg from user-provided path: {}", candidate.binary_path);
    *media = candidate;
    Ok(())
}

/// Print a prompt and read one trimmed line from stdin
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    let log_dir = std::env::current_dir()?.join(".vidsub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "vidsub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("vidsub.log").display());

    Ok(guard)
}
