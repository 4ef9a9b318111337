// Example driver for the `lifting_vision` library.
//
// Plays a directory of still images as if they were a camera stream: frames are
// decoded on a blocking task and handed to a tick loop running at a fixed rate.
// Each tick's motion mask is written out as a PNG.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use image::imageops::FilterType;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lifting_vision::core_modules::utils::image_helper::image_helper;
use lifting_vision::{LiftingPipeline, PipelineConfig, TickInput};

const FRAME_QUEUE_DEPTH: usize = 4;
const DEFAULT_FPS: u64 = 30;
const MAX_FPS: u64 = 1000;

struct Args {
    frames_dir: PathBuf,
    output_dir: PathBuf,
    config: Option<PathBuf>,
    capture_at: Option<u64>,
    fps: u64,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut capture_at = None;
    let mut fps = DEFAULT_FPS;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().context("--config needs a path")?)),
            "--capture-at" => {
                let value = args.next().context("--capture-at needs a frame index")?;
                capture_at = Some(value.parse().context("--capture-at must be an integer")?);
            }
            "--fps" => {
                let value = args.next().context("--fps needs a value")?;
                fps = value.parse().context("--fps must be an integer")?;
                if !(1..=MAX_FPS).contains(&fps) {
                    bail!("--fps must be between 1 and {MAX_FPS}, got {fps}");
                }
            }
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    if positional.len() != 2 {
        bail!(
            "Usage: lifting_vision <frames_dir> <output_dir> [--config path.toml] [--capture-at N] [--fps N]"
        );
    }
    let output_dir = positional.pop().context("missing output_dir")?;
    let frames_dir = positional.pop().context("missing frames_dir")?;
    Ok(Args { frames_dir, output_dir, config, capture_at, fps })
}

fn frame_paths(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading frames directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Time between ticks. Never zero, which `tokio::time::interval` would reject.
fn tick_period(fps: u64) -> Duration {
    Duration::from_nanos(1_000_000_000 / fps.clamp(1, MAX_FPS))
}

/// Decodes one image into a raw RGBA buffer of the configured size.
fn load_frame(path: &Path, width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
    let mut frame = image::open(path)
        .with_context(|| format!("decoding {}", path.display()))?
        .to_rgba8();
    if frame.dimensions() != (width, height) {
        frame = image::imageops::resize(&frame, width, height, FilterType::Triangle);
    }
    Ok(frame.into_raw())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating output directory {}", args.output_dir.display()))?;

    let paths = frame_paths(&args.frames_dir)?;
    info!(frames = paths.len(), width = config.image_width, height = config.image_height, "starting");

    let (frame_tx, mut frame_rx) = mpsc::channel::<Vec<u8>>(FRAME_QUEUE_DEPTH);
    let (width, height) = (config.image_width, config.image_height);
    let source = tokio::task::spawn_blocking(move || {
        for path in paths {
            match load_frame(&path, width, height) {
                Ok(frame) => {
                    if frame_tx.blocking_send(frame).is_err() {
                        break;
                    }
                }
                Err(err) => warn!("skipping frame: {err:#}"),
            }
        }
    });

    let mut pipeline = LiftingPipeline::new(config)?;
    let mut interval = tokio::time::interval(tick_period(args.fps));
    let mut written = 0u64;

    loop {
        interval.tick().await;
        let frame = match frame_rx.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => break,
        };

        let capture = args.capture_at == Some(pipeline.frame_count());
        let input = TickInput {
            frame: frame.as_deref(),
            capture_background: capture,
        };
        let output = match pipeline.tick(input) {
            Ok(Some(output)) => output,
            Ok(None) => continue,
            Err(err) => {
                warn!(%err, "skipping tick");
                continue;
            }
        };

        let path = args.output_dir.join(format!("mask_{written:05}.png"));
        image_helper::save(&path, &output.mask.to_rgba_image())
            .with_context(|| format!("writing {}", path.display()))?;
        written += 1;

        info!(
            frame = written,
            flagged = output.mask.flagged_count(),
            position = output.physics.position,
            velocity = output.physics.velocity,
            state = ?output.gate_state,
            captured = output.background_captured,
            "tick"
        );
    }

    source.await.context("frame source task failed")?;
    info!(written, output = %args.output_dir.display(), "processing complete");
    Ok(())
}
