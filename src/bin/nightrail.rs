use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nightrail", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a sequence of frames as numbered PNGs.
    Frames(FramesArgs),
    /// Print the constructed scene as JSON.
    Dump(DumpArgs),
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Frame width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Number of frames to render.
    #[arg(long, default_value_t = 60)]
    count: u32,

    /// Tick delta per frame (1.0 = one reference frame).
    #[arg(long, default_value_t = 1.0)]
    delta: f64,

    /// Seed for the scene's random scatter.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output directory for the PNG sequence.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct DumpArgs {
    /// Frame width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Seed for the scene's random scatter.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frames(args) => cmd_frames(args),
        Command::Dump(args) => cmd_dump(args),
    }
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let viewport = nightrail::Viewport::new(args.width, args.height)?;
    let mut scene = nightrail::Scene::night_train(viewport, args.seed)?;
    let mut renderer = nightrail::CpuRenderer::new(viewport)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    for index in 0..args.count {
        let frame = renderer.render(&scene)?;
        let path = args.out.join(format!("frame_{index:05}.png"));
        image::save_buffer_with_format(
            &path,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        scene.tick(args.delta)?;
    }

    eprintln!("wrote {} frames to {}", args.count, args.out.display());
    Ok(())
}

fn cmd_dump(args: DumpArgs) -> anyhow::Result<()> {
    let viewport = nightrail::Viewport::new(args.width, args.height)?;
    let scene = nightrail::Scene::night_train(viewport, args.seed)?;
    let json = serde_json::to_string_pretty(&scene).context("serialize scene")?;
    println!("{json}");
    Ok(())
}
