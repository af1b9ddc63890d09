use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use scenecut::pipeline::stages::{
    self, Tooling, assemble_stage, compose_stage, narrate_stage, parse_stage,
    render_layers_stage, write_captions,
};
use scenecut::{
    CommandRenderer, CommandSynthesizer, FfmpegEncoder, LayerKind, LayerRenderer,
    PipelineConfig, PipelineContext, PrerecordedNarration, Synthesizer,
};

#[derive(Parser, Debug)]
#[command(name = "scenecut", version, about = "Script-driven scene composition and assembly")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Pipeline config JSON. Missing sections use defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project root that asset directories are resolved against.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Scene state file (defaults to `<work_dir>/scene_timing.json`).
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Skip the hardware encoder and go straight to the software one.
    #[arg(long, global = true)]
    no_hardware: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a marked-up script into the scene state file.
    Parse(ScriptArgs),
    /// Synthesize narration and recompute the timeline.
    Narrate(NarrateArgs),
    /// Run configured layer renderers for missing layer sources.
    RenderLayers,
    /// Composite every narrated scene.
    Compose,
    /// Concatenate composited scenes into one MP4 (requires `ffmpeg` on PATH).
    Assemble(OutArgs),
    /// Write an SRT caption track for the current timeline.
    Captions(OutArgs),
    /// Run every stage from script to finished video.
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct ScriptArgs {
    /// Input script (plain UTF-8 text with scene markers).
    #[arg(long)]
    script: PathBuf,
}

#[derive(Args, Debug)]
struct NarrateArgs {
    /// Use recordings already in the audio directory even if a synthesizer is configured.
    #[arg(long)]
    prerecorded: bool,
}

#[derive(Args, Debug)]
struct OutArgs {
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    script: ScriptArgs,

    /// Output MP4 path. Captions are written next to it with an `.srt` extension.
    #[arg(long)]
    out: PathBuf,

    #[arg(long)]
    prerecorded: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    let ctx = load_context(&cli.global)?;
    match cli.cmd {
        Command::Parse(args) => {
            let script = read_script(&args.script)?;
            let out = parse_stage(&ctx, &script)?;
            eprintln!(
                "parsed {} scenes into {}",
                out.scenes.len(),
                ctx.state_path().display()
            );
        }
        Command::Narrate(args) => {
            let scenes = ctx.load_state()?;
            let mut synth = make_synthesizer(&ctx, args.prerecorded);
            let out = narrate_stage(&ctx, scenes, synth.as_mut())?;
            eprintln!("{}", out.report);
        }
        Command::RenderLayers => {
            let scenes = ctx.load_state()?;
            let mut renderers = make_renderers(&ctx);
            let out = render_layers_stage(&ctx, scenes, &mut renderers)?;
            eprintln!("{}", out.report);
        }
        Command::Compose => {
            let scenes = ctx.load_state()?;
            let mut encoder = make_encoder(&ctx);
            let out = compose_stage(&ctx, scenes, &mut encoder)?;
            eprintln!("{}", out.report);
        }
        Command::Assemble(args) => {
            let scenes = ctx.load_state()?;
            let mut encoder = make_encoder(&ctx);
            let summary = assemble_stage(&ctx, &scenes, &mut encoder, &args.out)?;
            eprintln!("{summary}");
            eprintln!("wrote {}", summary.output.display());
        }
        Command::Captions(args) => {
            let scenes = ctx.load_state()?;
            write_captions(&args.out, &scenes)?;
            eprintln!("wrote {}", args.out.display());
        }
        Command::Run(args) => {
            let script = read_script(&args.script.script)?;
            let mut synth = make_synthesizer(&ctx, args.prerecorded);
            let mut renderers = make_renderers(&ctx);
            let mut encoder = make_encoder(&ctx);
            let summary = stages::run_all(
                &ctx,
                &script,
                Tooling {
                    synthesizer: synth.as_mut(),
                    renderers: &mut renderers,
                    encoder: &mut encoder,
                },
                &args.out,
            )?;
            eprintln!("{summary}");
            eprintln!("wrote {}", summary.output.display());
        }
    }
    Ok(())
}

fn init_tracing(args: &GlobalArgs) {
    let level = if args.quiet {
        LevelFilter::ERROR
    } else {
        match args.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_context(args: &GlobalArgs) -> anyhow::Result<PipelineContext> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(root) = &args.root {
        config.paths.root = root.clone();
    }
    if args.no_hardware {
        config.encoder.prefer_hardware = false;
    }
    Ok(PipelineContext::new(config, args.state.clone())?)
}

fn read_script(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read script '{}'", path.display()))
}

fn make_synthesizer(ctx: &PipelineContext, prerecorded: bool) -> Box<dyn Synthesizer> {
    let cfg = &ctx.config;
    match (&cfg.tools.synthesizer, prerecorded) {
        (Some(spec), false) => Box::new(CommandSynthesizer::new(
            spec.clone(),
            ctx.paths.clone(),
            &cfg.encoder.ffprobe_bin,
            cfg.process.timeout(),
        )),
        _ => Box::new(PrerecordedNarration::new(
            ctx.paths.clone(),
            &cfg.encoder.ffprobe_bin,
            cfg.process.timeout(),
        )),
    }
}

fn make_renderers(ctx: &PipelineContext) -> Vec<Box<dyn LayerRenderer>> {
    let cfg = &ctx.config;
    [LayerKind::Stock, LayerKind::Infographic, LayerKind::Avatar]
        .into_iter()
        .filter_map(|layer| {
            cfg.tools.renderer(layer).map(|spec| {
                Box::new(CommandRenderer::new(layer, spec.clone(), cfg.process.timeout()))
                    as Box<dyn LayerRenderer>
            })
        })
        .collect()
}

fn make_encoder(ctx: &PipelineContext) -> FfmpegEncoder {
    FfmpegEncoder::new(&ctx.config.encoder.ffmpeg_bin, ctx.config.process.timeout())
}
