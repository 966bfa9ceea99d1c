use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shortreel::render::WorkDir;
use shortreel::server::{self, AppState};
use shortreel::{CancelFlag, FfmpegSink, FfmpegSinkOpts, RenderManifest, RenderRequest, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "shortreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve {
        #[command(flatten)]
        config: ServiceConfig,
    },
    /// Render an MP4 from a JSON manifest (requires `ffmpeg`).
    Render(RenderArgs),
    /// Compose the frame of a single segment as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Background image.
    #[arg(long)]
    background: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ServiceConfig,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Background image.
    #[arg(long)]
    background: PathBuf,

    /// Segment index (0-based).
    #[arg(long)]
    segment: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ServiceConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve { config } => server::serve(config).await,
        Command::Render(args) => cmd_render(args).await,
        Command::Frame(args) => cmd_frame(args),
    }
}

fn read_request(in_path: &Path, background: &Path) -> anyhow::Result<RenderRequest> {
    let json = std::fs::read_to_string(in_path)
        .with_context(|| format!("open manifest '{}'", in_path.display()))?;
    let bg = std::fs::read(background)
        .with_context(|| format!("open background '{}'", background.display()))?;
    let base_dir = in_path.parent().unwrap_or_else(|| Path::new("."));
    Ok(RenderManifest::from_json(&json)?.into_request(bg, base_dir)?)
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let req = read_request(&args.in_path, &args.background)?;
    let state = AppState::from_config(&args.config)?;

    let workdir = WorkDir::new()?;
    let sink = FfmpegSink::new(FfmpegSinkOpts::new(args.config.ffmpeg_bin.clone(), &args.out));
    let (summary, _sink) = state
        .pipeline
        .render_with_sink(req, sink, workdir.path(), CancelFlag::new())
        .await?;
    workdir.close()?;

    eprintln!(
        "wrote {} ({} frames, {:.2}s, {} distinct frames)",
        args.out.display(),
        summary.frame_count,
        summary.duration_secs,
        summary.distinct_states
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let req = read_request(&args.in_path, &args.background)?;
    let state = AppState::from_config(&args.config)?;
    let frame = state.pipeline.compose_segment_frame(&req, args.segment)?;
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data)
        .context("frame buffer size mismatch")?;
    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    img.save(&args.out)
        .with_context(|| format!("write PNG '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
