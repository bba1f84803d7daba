use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use replaycast::chat::ChatRenderOpts;
use replaycast::session::{AnnotateJob, ChatJob, MergeJob};
use replaycast::{AnnotateOpts, BatchManifest, Canvas, Fps, FfmpegSinkOpts, Job, OutputTarget};

#[derive(Parser, Debug)]
#[command(name = "replaycast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Paint whiteboard annotations over a source video.
    Annotate(AnnotateArgs),
    /// Render a chat transcript as an overlay video.
    Chat(ChatArgs),
    /// Merge slides, camera and chat videos into one (three to one).
    Merge(MergeArgs),
    /// Run every job of a JSON manifest in parallel.
    Batch(BatchArgs),
    /// Print width, height, fps and duration of a video as JSON.
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output MP4 path (requires `ffmpeg` on PATH).
    #[arg(long, required_unless_present = "png_dir", conflicts_with = "png_dir")]
    out: Option<PathBuf>,

    /// Write numbered PNG frames into this directory instead of an MP4.
    #[arg(long)]
    png_dir: Option<PathBuf>,

    /// Fail instead of overwriting an existing MP4.
    #[arg(long)]
    no_overwrite: bool,
}

impl OutputArgs {
    fn target(&self) -> anyhow::Result<OutputTarget> {
        match (&self.out, &self.png_dir) {
            (Some(out), None) => {
                let mut opts = FfmpegSinkOpts::new(out);
                opts.overwrite = !self.no_overwrite;
                Ok(OutputTarget::Mp4(opts))
            }
            (None, Some(dir)) => Ok(OutputTarget::png(dir)),
            _ => anyhow::bail!("exactly one of --out or --png-dir is required"),
        }
    }
}

#[derive(Args, Debug)]
struct TextArgs {
    /// Font file for text; without it text is skipped.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Font size in pixels.
    #[arg(long, default_value_t = 16.0)]
    font_size: f32,

    /// Line height in pixels.
    #[arg(long, default_value_t = 18.0)]
    line_height: f64,
}

#[derive(Args, Debug)]
struct AnnotateArgs {
    /// Annotation records (JSON array).
    #[arg(long)]
    records: PathBuf,

    /// Source video.
    #[arg(long)]
    video: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    text: TextArgs,

    /// Rescale the output, e.g. `1280x720`.
    #[arg(long, value_parser = parse_size)]
    resize: Option<Canvas>,
}

#[derive(Args, Debug)]
struct ChatArgs {
    /// Chat records (JSON array).
    #[arg(long)]
    records: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    text: TextArgs,

    /// Canvas width.
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Canvas height.
    #[arg(long, default_value_t = 300)]
    height: u32,

    /// Output frame rate.
    #[arg(long, default_value_t = 10)]
    fps: u32,

    /// Maximum messages on screen.
    #[arg(long, default_value_t = 10)]
    capacity: usize,

    /// Left margin of every line.
    #[arg(short = 'x', long, default_value_t = 10.0)]
    x_offset: f64,

    /// Gap above every message and below every wrapped line.
    #[arg(short = 'y', long, default_value_t = 5.0)]
    y_offset: f64,

    /// Session length in seconds; defaults to the last message.
    #[arg(long)]
    duration: Option<f64>,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Slides video (left column).
    #[arg(long)]
    slides: PathBuf,

    /// Camera video (top right).
    #[arg(long)]
    camera: PathBuf,

    /// Chat video (bottom right).
    #[arg(long)]
    chat: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    /// Output frame rate.
    #[arg(long, default_value_t = 10)]
    fps: u32,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Manifest JSON: `{"jobs": [...], "threads": N}`.
    #[arg(long)]
    manifest: PathBuf,

    /// Override worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    /// Video to inspect.
    #[arg(long)]
    video: PathBuf,
}

fn parse_size(s: &str) -> Result<Canvas, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("width: {e}"))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("height: {e}"))?;
    Canvas::new(w, h).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Annotate(args) => cmd_annotate(args),
        Command::Chat(args) => cmd_chat(args),
        Command::Merge(args) => cmd_merge(args),
        Command::Batch(args) => cmd_batch(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize report")?);
    Ok(())
}

fn cmd_annotate(args: AnnotateArgs) -> anyhow::Result<()> {
    let job = Job::Annotate(AnnotateJob {
        records: args.records,
        video: args.video,
        output: args.output.target()?,
        opts: AnnotateOpts {
            font_size_px: args.text.font_size,
            line_height_px: args.text.line_height,
            font_path: args.text.font,
        },
        resize: args.resize,
    });
    let report = job.run().with_context(|| job.label())?;
    print_json(&report)
}

fn cmd_chat(args: ChatArgs) -> anyhow::Result<()> {
    let opts = ChatRenderOpts {
        width: args.width,
        height: args.height,
        fps: Fps::whole(args.fps)?,
        capacity: args.capacity,
        x_offset: args.x_offset,
        y_offset: args.y_offset,
        font_size_px: args.text.font_size,
        line_height_px: args.text.line_height,
        font_path: args.text.font,
        duration_secs: args.duration,
        ..ChatRenderOpts::default()
    };
    let job = Job::Chat(ChatJob {
        records: args.records,
        output: args.output.target()?,
        opts,
    });
    let report = job.run().with_context(|| job.label())?;
    print_json(&report)
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<()> {
    let job = Job::Merge(MergeJob {
        slides: args.slides,
        camera: args.camera,
        chat: args.chat,
        output: args.output.target()?,
        fps: Fps::whole(args.fps)?,
    });
    let report = job.run().with_context(|| job.label())?;
    print_json(&report)
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let manifest = BatchManifest::from_path(&args.manifest)?;
    let threads = args.threads.or(manifest.threads);
    let results = replaycast::batch::run_batch(&manifest.jobs, threads)?;

    let mut failed = 0usize;
    let summary: Vec<serde_json::Value> = manifest
        .jobs
        .iter()
        .zip(&results)
        .map(|(job, res)| match res {
            Ok(report) => serde_json::json!({ "job": job.label(), "report": report }),
            Err(err) => {
                failed += 1;
                serde_json::json!({ "job": job.label(), "error": err.to_string() })
            }
        })
        .collect();
    print_json(&summary)?;
    if failed > 0 {
        anyhow::bail!("{failed} of {} job(s) failed", results.len());
    }
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let info = replaycast::probe_video(&args.video)?;
    print_json(&info)
}
