use anyhow::{bail, Context};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use scoreboard_ocr::logging::{initialize_tracing, log_runtime_environment};
use scoreboard_ocr::ocr::RecordedEngine;
use scoreboard_ocr::error::InputError;
use scoreboard_ocr::{
    AppResult, Config, ExtractionError, OcrEngine, Pipeline, PipelineConfig, ProgressBus, RunId,
};

const USAGE: &str = "\
Usage: scoreboard-ocr <screenshot> [options]

Options:
  --config <path>                       Config file (default: user config folder)
  --replay <metadata.json> <players.json>
                                        Replay recorded detections instead of running OCR
  --pretty                              Pretty-print the result JSON
  -h, --help                            Show this help";

#[derive(Debug, Default)]
struct Args {
    screenshot: PathBuf,
    config: Option<PathBuf>,
    replay: Option<(PathBuf, PathBuf)>,
    pretty: bool,
}

fn parse_args() -> AppResult<Option<Args>> {
    let mut args = Args::default();
    let mut screenshot = None;
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--replay" => {
                let metadata = iter.next().context("--replay needs two paths")?;
                let players = iter.next().context("--replay needs two paths")?;
                args.replay = Some((PathBuf::from(metadata), PathBuf::from(players)));
            }
            "--pretty" => args.pretty = true,
            other if other.starts_with('-') => bail!("unknown option: {}", other),
            other => {
                if screenshot.is_some() {
                    bail!("only one screenshot may be given");
                }
                screenshot = Some(PathBuf::from(other));
            }
        }
    }

    args.screenshot = screenshot.context("missing <screenshot>")?;
    Ok(Some(args))
}

fn build_engine(args: &Args) -> AppResult<Box<dyn OcrEngine>> {
    if let Some((metadata, players)) = &args.replay {
        let engine = RecordedEngine::from_files(metadata, players)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Failed to load recorded detections")?;
        return Ok(Box::new(engine));
    }

    default_engine()
}

#[cfg(feature = "tesseract")]
fn default_engine() -> AppResult<Box<dyn OcrEngine>> {
    let engine = scoreboard_ocr::ocr::TesseractEngine::new(None)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to initialize OCR. Install Tesseract (macOS: brew install tesseract, Linux: apt-get install tesseract-ocr)")?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "tesseract"))]
fn default_engine() -> AppResult<Box<dyn OcrEngine>> {
    bail!("no OCR engine available: pass --replay or build with the `tesseract` feature")
}

/// Mask loading happens before any run starts; classify it the same way a
/// run failure is classified
fn mask_load_error(err: InputError) -> anyhow::Error {
    let err = ExtractionError::from(err);
    anyhow::anyhow!("Failed to load masks [{}]: {}", err.kind(), err)
}

fn run(args: Args) -> AppResult<ExitCode> {
    let config = match &args.config {
        Some(path) => Config::load(path),
        None => Config::load_or_create(),
    }
    .context("Failed to load config")?;

    initialize_tracing(&config.log_dir());
    log_runtime_environment();

    let engine = build_engine(&args)?;
    let masks = config.mask_set().map_err(mask_load_error)?;
    let pipeline_config = PipelineConfig::from_config(&config).context("Invalid configuration")?;
    let pipeline = Pipeline::new(pipeline_config, Box::new(masks), engine)?;

    let image_bytes = std::fs::read(&args.screenshot)
        .with_context(|| format!("Failed to read {}", args.screenshot.display()))?;

    let run_id = RunId::generate();
    let bus = ProgressBus::new();
    let (progress_rx, _subscription) = bus.subscribe_run(run_id.clone());
    let progress_logger = thread::spawn(move || {
        for update in progress_rx.iter() {
            tracing::info!(
                run_id = %update.run_id,
                "Progress {:>3}% {}",
                update.percentage,
                update.stage
            );
        }
    });

    let outcome = pipeline.run(&run_id, &image_bytes, &bus);

    // Closing the bus ends the logger loop
    drop(bus);
    if progress_logger.join().is_err() {
        tracing::warn!("Progress logger thread panicked");
    }

    match outcome {
        Ok(result) => {
            let json = if args.pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("✗ Extraction failed [{}]: {}", e.kind(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("✗ {}\n\n{}", e, USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
