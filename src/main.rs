//! `vbat` maintenance binary.
//!
//! Works directly on the annotation file configured in `config.json`:
//! listing videos, summarizing annotations, folding duplicate buckets and
//! exporting a YOLO dataset.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;

use vbat::backend::{AnnotationBackend, JsonFileBackend, list_videos};
use vbat::config::{AppConfig, ConfigError};
use vbat::error::BackendError;
use vbat::format::{ClassConfig, FormatError, VideoInfo, YoloExporter, backup_annotations};
use vbat::reconcile::{ReconciliationEngine, normalize_buckets};

/// VBAT - Video Bounding-box Annotation Tool
#[derive(Parser, Debug)]
#[command(name = "vbat", version, about = "Maintenance tasks for video bounding-box annotations")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Create the annotation file, the video folder and the config
    Init,
    /// List videos in the upload folder
    Videos,
    /// Show entries, boxes and labels
    Summary {
        /// Only this video
        video: Option<String>,
    },
    /// Merge duplicate time buckets
    Normalize,
    /// Export a YOLO dataset
    #[command(name = "export-yolo")]
    ExportYolo {
        /// Dataset folder to write `labels/` and `images/` into
        out_dir: PathBuf,
        /// JSON map of video name to `{width, height, fps}`
        video_info: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Failed to read video info: {0}")]
    VideoInfo(String),
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let rust_log = std::env::var_os("RUST_LOG").is_some();

    // Without RUST_LOG, filtering is done through the global max level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("trace"))
        .format_timestamp_millis()
        .init();
    if !rust_log {
        log::set_max_level(log::LevelFilter::Info);
    }

    let config_path = cli.config.clone().or_else(AppConfig::default_path);
    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = configured_level(&config, rust_log) {
        log::set_max_level(level);
    }

    match run(cli.command, &config, config_path.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Level from the config, unless `RUST_LOG` is set.
fn configured_level(config: &AppConfig, rust_log: bool) -> Option<log::LevelFilter> {
    (!rust_log).then(|| config.preferences.log_level.to_level_filter())
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::new(),
    };
    config.apply_env_overrides(|name| std::env::var(name).ok());
    Ok(config)
}

fn run(command: Command, config: &AppConfig, config_path: Option<&Path>) -> Result<(), CliError> {
    let backend = JsonFileBackend::new(&config.storage.annotations_file);

    match command {
        Command::Init => init(config, config_path, &backend),
        Command::Videos => videos(config, &backend),
        Command::Summary { video } => summary(config, &backend, video.as_deref()),
        Command::Normalize => normalize(config, &backend),
        Command::ExportYolo {
            out_dir,
            video_info,
        } => export_yolo(config, &backend, &out_dir, &video_info),
    }
}

fn init(
    config: &AppConfig,
    config_path: Option<&Path>,
    backend: &JsonFileBackend,
) -> Result<(), CliError> {
    if backend.ensure_exists()? {
        println!("Created {}", backend.path().display());
    }
    std::fs::create_dir_all(&config.storage.video_folder).map_err(BackendError::from)?;

    if let Some(path) = config_path {
        if !path.exists() {
            config.save(path)?;
            println!("Wrote default config to {}", path.display());
        }
    }
    Ok(())
}

fn engine_for(
    config: &AppConfig,
    backend: &dyn AnnotationBackend,
) -> Result<ReconciliationEngine, CliError> {
    let mut engine = ReconciliationEngine::new(config.annotation.bucket_index());
    engine.install(backend.fetch_all()?);
    Ok(engine)
}

fn videos(config: &AppConfig, backend: &dyn AnnotationBackend) -> Result<(), CliError> {
    let engine = engine_for(config, backend)?;
    for video in list_videos(&config.storage.video_folder)? {
        let entries = engine.collection().for_video(&video).count();
        if entries > 0 {
            println!("{}\t{} annotated frames", video, entries);
        } else {
            println!("{}", video);
        }
    }
    Ok(())
}

fn summary(
    config: &AppConfig,
    backend: &dyn AnnotationBackend,
    video: Option<&str>,
) -> Result<(), CliError> {
    let engine = engine_for(config, backend)?;
    let videos = match video {
        Some(video) => vec![video],
        None => engine.videos(),
    };

    for video in videos {
        let mut entries = 0;
        let mut boxes = 0;
        for entry in engine.collection().for_video(video) {
            entries += 1;
            boxes += entry.boxes.len();
        }
        println!("{}\t{} frames\t{} boxes", video, entries, boxes);
    }

    let labels: Vec<&str> = engine.vocabulary().iter().collect();
    println!("labels: {}", labels.join(", "));
    Ok(())
}

fn normalize(config: &AppConfig, backend: &JsonFileBackend) -> Result<(), CliError> {
    let index = config.annotation.bucket_index();
    let (normalized, folded) = normalize_buckets(&backend.fetch_all()?, index);
    if folded == 0 {
        println!("No duplicate buckets found");
        return Ok(());
    }

    backup_annotations(backend.path(), &config.storage.backup_folder)?;
    backend.persist(&normalized)?;
    println!("Merged {} duplicate buckets", folded);
    Ok(())
}

fn export_yolo(
    config: &AppConfig,
    backend: &dyn AnnotationBackend,
    out_dir: &Path,
    video_info: &Path,
) -> Result<(), CliError> {
    backup_annotations(&config.storage.annotations_file, &config.storage.backup_folder)?;

    let classes = ClassConfig::load(&config.storage.class_config_file)?;
    let info = std::fs::read_to_string(video_info)
        .map_err(|e| CliError::VideoInfo(format!("{}: {}", video_info.display(), e)))?;
    let info: HashMap<String, VideoInfo> =
        serde_json::from_str(&info).map_err(|e| CliError::VideoInfo(e.to_string()))?;

    let collection = backend.fetch_all()?;
    let result = YoloExporter::new(classes).export(&collection, &info, out_dir)?;

    for warning in &result.warnings {
        log::warn!("⚠️ {}: {}", warning.video, warning.message);
    }
    for frame in &result.frames {
        println!("{}\t{}\t{}", frame.video, frame.frame_number, frame.image_name);
    }
    println!(
        "Exported {} frames, {} annotations",
        result.frames_exported, result.annotations_exported
    );
    Ok(())
}
