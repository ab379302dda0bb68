use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use waveclip::subtitle::generate::SubtitleGenerator as _;
use waveclip::subtitle::sanitize::{parse_raw, sanitize};

#[derive(Parser, Debug)]
#[command(name = "waveclip", version, about = "Music-video compositor")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a WebM video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Generate karaoke subtitles for an audio file.
    Subtitles(SubtitlesArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Master time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Draw as if playback were paused (no layer animation, no beat).
    #[arg(long, default_value_t = false)]
    paused: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Output WebM path.
    #[arg(long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// Directory for a timestamped `waveclip-render-<millis>.webm`.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Fail instead of overwriting an existing output.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct SubtitlesArgs {
    /// Audio file passed to the generator.
    #[arg(long, required_unless_present = "raw")]
    audio: Option<PathBuf>,

    /// Generator command line, split on whitespace; defaults to `WAVECLIP_SUBTITLE_CMD`.
    #[arg(long, conflicts_with = "command")]
    cmd: Option<String>,

    /// Sanitize an existing raw JSON file instead of running a generator.
    #[arg(long, conflicts_with_all = ["cmd", "command"])]
    raw: Option<PathBuf>,

    /// Generator program and arguments after `--`, passed through unsplit.
    #[arg(last = true, value_name = "PROGRAM")]
    command: Vec<String>,

    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Subtitles(args) => cmd_subtitles(args),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_editor(path: &std::path::Path) -> anyhow::Result<waveclip::Editor<'static, waveclip::TracingHost>> {
    let project = waveclip::Project::from_path(path)
        .with_context(|| format!("load project '{}'", path.display()))?;
    let editor = waveclip::Editor::open(&project, waveclip::TracingHost)
        .with_context(|| format!("open project '{}'", path.display()))?;
    Ok(editor)
}

fn ensure_parent(path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.time.is_finite(), "--time must be finite");
    let mut editor = open_editor(&args.project)?;
    let frame = editor.draw_at(args.time.max(0.0), !args.paused)?;

    ensure_parent(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        waveclip::encode::ffmpeg::is_ffmpeg_on_path(),
        "ffmpeg was not found on PATH"
    );
    let mut editor = open_editor(&args.project)?;
    anyhow::ensure!(editor.has_audio(), "project has no audio to render against");

    let out = args
        .out
        .unwrap_or_else(|| args.out_dir.join(waveclip::artifact_file_name(SystemTime::now())));
    let mut opts = waveclip::FfmpegSinkOpts::new(out.clone());
    opts.overwrite = !args.no_overwrite;
    let sink = waveclip::FfmpegSink::new(opts);

    let artifact = editor
        .export(sink)
        .with_context(|| format!("render '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({} frames, {:.2}s)",
        out.display(),
        artifact.frames,
        artifact.duration_s
    );
    Ok(())
}

fn cmd_subtitles(args: SubtitlesArgs) -> anyhow::Result<()> {
    let raw = match (&args.raw, &args.audio) {
        (Some(raw_path), _) => {
            let text = std::fs::read_to_string(raw_path)
                .with_context(|| format!("read raw subtitles '{}'", raw_path.display()))?;
            parse_raw(&text).with_context(|| format!("parse '{}'", raw_path.display()))?
        }
        (None, Some(audio)) => {
            let mut generator = match args.cmd.as_deref() {
                Some(cmd) => waveclip::CommandGenerator::parse(cmd)?,
                None if !args.command.is_empty() => {
                    waveclip::CommandGenerator::from_argv(&args.command)?
                }
                None => waveclip::CommandGenerator::from_env()?,
            };
            generator
                .generate(audio)
                .with_context(|| format!("generate subtitles for '{}'", audio.display()))?
        }
        (None, None) => anyhow::bail!("either --audio or --raw is required"),
    };

    let subs = sanitize(raw);
    ensure_parent(&args.out)?;
    let json = serde_json::to_string_pretty(&subs)?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("write subtitles '{}'", args.out.display()))?;

    eprintln!("wrote {} lines to {}", subs.len(), args.out.display());
    Ok(())
}
