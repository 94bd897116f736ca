use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "framefold", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill a super-sampled buffer on a background thread and fold it down frame by frame.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Session config JSON. Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Display width in pixels.
    #[arg(short = 'w', long)]
    width: Option<u32>,

    /// Display height in pixels.
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Super-sampling factor per axis.
    #[arg(short = 's', long)]
    scale: Option<u32>,

    /// Number of frames to compose.
    #[arg(long)]
    frames: Option<u64>,

    /// Fire the trigger after this frame (0-based), standing in for the key press.
    #[arg(long)]
    trigger_at: Option<u64>,

    /// What the trigger does.
    #[arg(long, value_enum)]
    on_trigger: Option<framefold::TriggerKind>,

    /// Compose display rows in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel.
    #[arg(long)]
    threads: Option<usize>,

    /// Write the last presented frame to this PNG.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
    }
}

fn load_config(args: &RunArgs) -> anyhow::Result<framefold::SessionConfig> {
    let mut cfg = match &args.config {
        Some(path) => framefold::SessionConfig::from_json_file(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => framefold::SessionConfig::default(),
    };

    if let Some(v) = args.width {
        cfg.width = v;
    }
    if let Some(v) = args.height {
        cfg.height = v;
    }
    if let Some(v) = args.scale {
        cfg.scale = v;
    }
    if let Some(v) = args.frames {
        cfg.frames = v;
    }
    if args.trigger_at.is_some() {
        cfg.trigger_at = args.trigger_at;
    }
    if let Some(v) = args.on_trigger {
        cfg.on_trigger = v;
    }
    if args.parallel {
        cfg.compositor.parallel = true;
    }
    if args.threads.is_some() {
        cfg.compositor.threads = args.threads;
    }

    cfg.validate().with_context(|| "invalid session config")?;
    Ok(cfg)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    let mut frame_loop = cfg.build_loop()?;

    let producer = framefold::spawn_gradient_producer(frame_loop.source())
        .with_context(|| "spawn producer thread")?;

    let stats = match &args.out {
        Some(out) => {
            let mut sink = framefold::PngSink::new(out);
            frame_loop.run(&cfg.loop_opts(), &mut sink)?
        }
        None => frame_loop.run(&cfg.loop_opts(), &mut framefold::NullSink)?,
    };

    // The producer is fire-and-forget; only report whether it got to the end in time.
    if producer.is_finished() {
        producer
            .join()
            .map_err(|_| anyhow::anyhow!("producer thread panicked"))?;
    } else {
        eprintln!("producer still running after last frame");
    }

    eprintln!(
        "composed {} frames at {}x{} (scale {}): {} blocks recomputed, {} skipped",
        stats.frames,
        cfg.width,
        cfg.height,
        cfg.scale,
        stats.blocks_recomputed,
        stats.blocks_skipped
    );
    if let Some(out) = &args.out {
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}
