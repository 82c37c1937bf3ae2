use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use polar_horizon::io::{save_canvas, to_canvas};
use polar_horizon::render::rasterize;
use polar_horizon::script::{load_script, replay};
use polar_horizon::{
    AppState, ClickOutcome, EventOutcome, ExportOutcome, HorizonPath, ReferenceOverlay,
    SessionConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "polar-horizon",
    version,
    about = "Trace the horizon of a 360° panorama into an azimuth/elevation table"
)]
struct Cli {
    /// JSON session config (canvas size, zoom, padding, phase, output path).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the polar view of a panorama, with guides and overlays.
    Warp(WarpArgs),
    /// Replay a click script against a panorama and export the horizon.
    Trace(TraceArgs),
    /// Parse a horizon file and check its trace order.
    Check {
        /// Horizon or reference file.
        horizon: PathBuf,
    },
}

#[derive(Args, Debug)]
struct WarpArgs {
    /// Equirectangular panorama.
    image: PathBuf,
    #[arg(long)]
    zoom: Option<f32>,
    /// Canvas edge in pixels.
    #[arg(long)]
    size: Option<usize>,
    #[arg(long, default_value = "polar.png")]
    out: PathBuf,
    /// Reference horizon drawn as a dashed line.
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Skip guides and overlays.
    #[arg(long)]
    no_overlay: bool,
}

#[derive(Args, Debug)]
struct TraceArgs {
    /// Equirectangular panorama.
    image: PathBuf,
    /// Session script (`click X Y`, `zoom Z`, `undo`, `clear`, `reset`, `export [PATH]`).
    script: PathBuf,
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Export destination; defaults to the config's output path.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also write the final polar view with overlays.
    #[arg(long)]
    preview: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => SessionConfig::load_json(path)?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Command::Warp(args) => run_warp(config, args),
        Command::Trace(args) => run_trace(config, args),
        Command::Check { horizon } => run_check(&config, &horizon),
    }
}

fn init_logging(verbose: u8) {
    let level = polar_horizon::core::level_from_verbosity(verbose);
    // Ignore errors if a logger/subscriber was already installed.
    #[cfg(feature = "tracing")]
    {
        let _ = tracing_log::LogTracer::init();
        polar_horizon::core::init_tracing(level, false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = polar_horizon::core::init_with_level(level);
    }
}

fn run_warp(mut config: SessionConfig, args: WarpArgs) -> Result<(), Box<dyn Error>> {
    if let Some(size) = args.size {
        config.canvas_size = size;
    }
    if let Some(zoom) = args.zoom {
        config.zoom = zoom;
    }
    config.validate()?;

    let mut state = AppState::new(config);
    state.load_panorama_file(&args.image)?;
    if let Some(reference) = &args.reference {
        state.load_reference_file(reference)?;
    }
    write_preview(&mut state, &args.out, !args.no_overlay)?;
    println!(
        "wrote {} ({size}x{size}, zoom {:.2})",
        args.out.display(),
        state.params().zoom,
        size = state.params().canvas_size
    );
    Ok(())
}

fn run_trace(mut config: SessionConfig, args: TraceArgs) -> Result<(), Box<dyn Error>> {
    if let Some(out) = &args.out {
        config.output_path = out.clone();
    }
    let mut state = AppState::new(config);
    state.load_panorama_file(&args.image)?;
    if let Some(reference) = &args.reference {
        state.load_reference_file(reference)?;
    }

    let events = load_script(&args.script)?;
    let outcomes = replay(&mut state, &events)?;

    let (mut recorded, mut rejected, mut ignored) = (0usize, 0usize, 0usize);
    for outcome in &outcomes {
        match outcome {
            EventOutcome::Click(ClickOutcome::Recorded(_)) => recorded += 1,
            EventOutcome::Click(ClickOutcome::Rejected(err)) => {
                rejected += 1;
                eprintln!("warning: {err}");
            }
            EventOutcome::Click(_) => ignored += 1,
            _ => {}
        }
    }
    log::info!(
        "replayed {} events: {recorded} recorded, {rejected} rejected, {ignored} ignored",
        events.len()
    );

    match state.export_default()? {
        ExportOutcome::Written { path, lines } => {
            println!("wrote {lines} points to {}", path.display());
        }
        ExportOutcome::Skipped => println!("no points recorded; nothing written"),
    }

    if let Some(preview) = &args.preview {
        if state.has_panorama() {
            write_preview(&mut state, preview, true)?;
        } else {
            log::warn!("session was reset; no preview written");
        }
    }
    Ok(())
}

fn run_check(config: &SessionConfig, horizon: &Path) -> Result<(), Box<dyn Error>> {
    let overlay = ReferenceOverlay::load(horizon)?;
    println!("{} points", overlay.len());
    if let Some((lo, hi)) = overlay.azimuth_range() {
        println!("azimuth range {lo}..{hi}");
    }

    let mut path = HorizonPath::with_direction(config.direction);
    let out_of_order = overlay
        .points()
        .iter()
        .filter(|p| path.append(**p).is_err())
        .count();
    if out_of_order > 0 {
        return Err(format!("{out_of_order} point(s) out of trace order").into());
    }
    println!("trace order ok");
    Ok(())
}

fn write_preview(state: &mut AppState, out: &Path, overlay: bool) -> Result<(), Box<dyn Error>> {
    let commands = if overlay {
        state.draw_commands()
    } else {
        Vec::new()
    };
    let Some(raster) = state.polar_raster() else {
        return Err("no panorama loaded".into());
    };
    let mut canvas = to_canvas(raster)?;
    rasterize(&commands, &mut canvas);
    save_canvas(out, &canvas)?;
    Ok(())
}
