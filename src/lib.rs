//! Video Sizer - fits video files under a size budget using ffmpeg.
//!
//! Oversized files are either split into evenly timed segments or re-encoded
//! in place at a bitrate derived from the budget. Files are processed one at a
//! time and a failure on one file never stops the batch.

pub mod cli;
pub mod config;
pub mod encoder;
pub mod error;
pub mod media;
pub mod orchestrator;
pub mod planner;
pub mod scanner;
pub mod validation;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{Cli, Commands, LogFormat, PlanArgs, RunArgs};
use crate::config::AppConfig;
use crate::encoder::FfmpegProcessor;
use crate::error::AppError;
use crate::orchestrator::Orchestrator;
use crate::planner::AssetPlan;
use crate::scanner::FolderScanner;
use crate::validation::{paths, report, validate_config, SystemCapabilities};

/// Runs the video sizer with the provided CLI arguments.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let config = config::loader::load(cli.config.as_deref())?;
    let level = cli.log_level().unwrap_or(config.log_level.as_str()).to_string();
    setup_logging(&level, cli.log_format)?;

    match cli.command {
        Commands::Run(args) => run_batch(args, config).await,
        Commands::Plan(args) => preview_plan(args, config).await,
        Commands::ConfigValidate => validate(config),
        Commands::ConfigShow => show_config(&config),
    }
}

/// Initializes the tracing subscriber for structured logging.
fn setup_logging(level: &str, format: LogFormat) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Json => builder
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .try_init(),
        LogFormat::Text => builder.with_target(false).try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Checks the root folder and the local tools before a batch.
fn prepare_batch(
    root: &Path,
    config: &AppConfig,
) -> Result<(FolderScanner, SystemCapabilities), AppError> {
    let scanner = FolderScanner::new(root, config.recursive)?;
    let capabilities = SystemCapabilities::detect(&config.tools.ffmpeg, &config.tools.ffprobe)?;
    Ok((scanner, capabilities))
}

/// Processes every video in the root folder.
async fn run_batch(args: RunArgs, mut config: AppConfig) -> Result<ExitCode> {
    args.overrides.apply(&mut config);

    let (scanner, capabilities) = prepare_batch(&args.root, &config)?;
    let mut result = validate_config(&config, &capabilities);
    result.extend(paths::validate_root(scanner.root()));
    config::loader::enforce(&result, Some(scanner.root()))?;

    info!(
        root = ?scanner.root(),
        mode = %config.mode,
        target_mb = config.target_size_mb,
        codec = %config.codec,
        recursive = config.recursive,
        dry_run = args.dry_run,
        "Starting batch"
    );

    let processor = FfmpegProcessor::new(&config.tools);
    let orchestrator = Orchestrator::new(processor, config).with_dry_run(args.dry_run);
    let summary = orchestrator.run(&scanner).await;

    print!("{}", summary.render());

    if let Some(path) = &args.summary_json {
        summary
            .write_json(path)
            .with_context(|| format!("Failed to write summary to '{}'", path.display()))?;
        info!(path = ?path, "Wrote batch summary");
    }

    Ok(ExitCode::from(summary.exit_code()))
}

/// Measures one file and prints what a run would do with it.
async fn preview_plan(args: PlanArgs, mut config: AppConfig) -> Result<ExitCode> {
    args.overrides.apply(&mut config);
    config::loader::enforce(&validation::semantic::validate(&config), None)?;

    let processor = FfmpegProcessor::new(&config.tools);
    let orchestrator = Orchestrator::new(processor, config);
    let (asset, plan) = orchestrator.plan_asset(&args.file).await?;
    let target_mb = orchestrator.config().target_size_mb;

    println!("File:     {}", asset.path.display());
    println!("Size:     {:.2} MB (budget {} MB)", asset.size_mb(), target_mb);
    if let Some(duration) = asset.duration_secs {
        println!("Duration: {:.2} s", duration);
    }

    match &plan {
        None => println!("Already within budget, no action needed."),
        Some(AssetPlan::Segments(segments)) => {
            println!("Split into {} segments:", segments.len());
            for segment in segments {
                println!(
                    "  #{:<3} start {:>10.3} s  length {:>10.3} s",
                    segment.index, segment.start_secs, segment.duration_secs
                );
            }
        }
        Some(AssetPlan::Recode(bitrate)) => {
            println!(
                "Re-encode with {} at {} video bitrate and replace in place.",
                orchestrator.config().codec,
                bitrate.ffmpeg_value()
            );
        }
    }

    if let Some(plan) = &plan {
        println!("Jobs:");
        for job in orchestrator.jobs_for(&asset.path, plan) {
            println!("  {} -> {}", job.label(), job.output.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Validates the configuration and prints the report.
fn validate(config: AppConfig) -> Result<ExitCode> {
    let capabilities = SystemCapabilities::detect(&config.tools.ffmpeg, &config.tools.ffprobe)
        .map_err(AppError::from)?;
    let result = validate_config(&config, &capabilities);

    println!("{}", report::format_report(&result, None));

    if result.is_valid() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Displays the effective configuration.
fn show_config(config: &AppConfig) -> Result<ExitCode> {
    let yaml = serde_yaml::to_string(config)?;
    println!("{}", yaml);
    Ok(ExitCode::SUCCESS)
}
