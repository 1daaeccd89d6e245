mod app;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use percept_core::CompletionRecord;
use percept_render::{Compositor, StimulusRenderer};
use percept_timing::HighPrecisionTimer;
use percept_trial::{SessionConfig, TrialParams, TrialSession, normalize};
use tracing::info;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "percept", version)]
struct Cli {
    /// Log verbosity on stderr (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one trial to a PNG.
    Render(RenderArgs),
    /// Show one trial fullscreen and wait for a key press.
    Present(PresentArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Trial parameters JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the resolved item echo as a completion record.
    #[arg(long)]
    record: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PresentArgs {
    /// Trial parameters JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Present(args) => cmd_present(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_params(path: &Path) -> anyhow::Result<TrialParams> {
    TrialParams::from_path(path).with_context(|| format!("load trial '{}'", path.display()))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let params = read_params(&args.in_path)?;
    let trial = normalize(&params);

    let mut compositor = Compositor::new(trial.context.clone(), HighPrecisionTimer::new());
    let mut surface = compositor.new_surface().context("allocate canvas")?;
    let stats = compositor
        .render(&trial.items, &mut surface)
        .context("render trial")?;
    info!(
        items = stats.items,
        offscreen = stats.offscreen,
        total_ms = stats.total.as_secs_f64() * 1e3,
        "rendered"
    );

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &surface.to_rgba8(),
        surface.width(),
        surface.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    if let Some(path) = args.record {
        // Nothing was shown, so the record carries only the item echo.
        let mut session = TrialSession::new(
            SessionConfig::from(&params),
            &trial.items,
            HighPrecisionTimer::new(),
        );
        write_record(&session.finish(), Some(&path))?;
    }
    Ok(())
}

fn cmd_present(args: PresentArgs) -> anyhow::Result<()> {
    let params = read_params(&args.in_path)?;
    let record = App::new(&params)?.run()?;
    write_record(&record, None)
}

fn write_record(record: &CompletionRecord, path: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(record).context("serialize completion record")?;
    match path {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("write record '{}'", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
