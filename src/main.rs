//! frame-hook: command-line front end for region selection and capture
//!
//! Provides commands for listing displays, selecting and refining a region,
//! grabbing a single snapshot, and running the capture loop.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use frame_hook::{
    capture::{MockGrabber, ScreenGrabber, create_default_grabber, grab_with_timeout},
    game::GameRegion,
    hook::{CancelToken, MaxFrames},
    input::ScriptedPointer,
    model::{LoopOptions, Rectangle, SelectOptions},
    region::EdgeRefiner,
    render::{NullSink, PngSink, PreviewSink},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "frame-hook")]
#[command(about = "Select a screen region and capture it in a loop")]
struct Cli {
    /// Use synthetic frames instead of the real screen
    #[arg(long, global = true)]
    mock: bool,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
    /// Per-grab timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List display rectangles (index 0 is the union of all monitors)
    Displays,
    /// Select a region from two corner clicks given in preview coordinates
    Select {
        /// Display index
        #[arg(long, default_value_t = 0)]
        monitor: usize,
        /// Corners as x1,y1,x2,y2 in preview pixels
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        corners: Vec<i32>,
        /// Preview downsample divisor
        #[arg(long)]
        scale: Option<u32>,
        /// Snap the selection to nearby content edges
        #[arg(long)]
        trim: bool,
        /// Write the last preview with its overlay to this PNG
        #[arg(long)]
        preview_out: Option<PathBuf>,
    },
    /// Snap a rectangle to nearby content edges
    Refine {
        /// Region as top,left,width,height
        #[arg(long)]
        region: Rectangle,
    },
    /// Grab a region once and save it as PNG
    Snapshot {
        /// Region as top,left,width,height
        #[arg(long)]
        region: Rectangle,
        /// Output file path
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Capture a region repeatedly until Ctrl-C or the frame limit
    Run {
        /// Display index the region must be resolved against
        #[arg(long, default_value_t = 0)]
        monitor: usize,
        /// Region as top,left,width,height
        #[arg(long)]
        region: Rectangle,
        /// Stop after this many frames
        #[arg(long)]
        frames: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let grabber = make_grabber(cli.mock)?;
    let timeout = cli.timeout_ms.map(Duration::from_millis);

    match cli.command {
        Commands::Displays => list_displays(grabber.as_ref()).await?,
        Commands::Select {
            monitor,
            corners,
            scale,
            trim,
            preview_out,
        } => select(grabber, monitor, &corners, scale, trim, preview_out, timeout).await?,
        Commands::Refine { region } => refine(grabber.as_ref(), region, timeout).await?,
        Commands::Snapshot { region, out } => snapshot(grabber.as_ref(), region, out, timeout).await?,
        Commands::Run {
            monitor,
            region,
            frames,
        } => run(grabber, monitor, region, frames, timeout).await?,
    }

    Ok(())
}

fn init_logging(json: bool) {
    // Respects RUST_LOG, default level: info
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("frame_hook=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn make_grabber(mock: bool) -> Result<Arc<dyn ScreenGrabber>> {
    if mock {
        info!("Using mock grabber");
        return Ok(Arc::new(MockGrabber::new()));
    }

    let grabber = create_default_grabber()?;
    info!("Using {} grabber", grabber.backend());
    Ok(grabber)
}

fn capture_timeout(timeout: Option<Duration>) -> Duration {
    timeout.unwrap_or(LoopOptions::default().capture_timeout)
}

async fn list_displays(grabber: &dyn ScreenGrabber) -> Result<()> {
    let displays = grabber.displays().await?;

    println!("Found {} displays:\n", displays.len());
    for (index, rect) in displays.iter().enumerate() {
        let label = if index == 0 { " (all monitors)" } else { "" };
        println!("  [{}] {}{}", index, rect, label);
    }

    Ok(())
}

async fn select(
    grabber: Arc<dyn ScreenGrabber>,
    monitor: usize,
    corners: &[i32],
    scale: Option<u32>,
    trim: bool,
    preview_out: Option<PathBuf>,
    timeout: Option<Duration>,
) -> Result<()> {
    let [x1, y1, x2, y2] = corners else {
        anyhow::bail!("--corners needs exactly four values: x1,y1,x2,y2");
    };

    let mut opts = SelectOptions::builder().trim(trim).capture_timeout(capture_timeout(timeout));
    if let Some(scale) = scale {
        opts = opts.preview_scale(scale);
    }

    let mut pointer = ScriptedPointer::clicks(&[(*x1, *y1), (*x2, *y2)]);
    let mut sink: Box<dyn PreviewSink> = match preview_out {
        Some(path) => Box::new(PngSink::new(path)),
        None => Box::new(NullSink),
    };

    let game = GameRegion::builder(grabber)
        .monitor_index(monitor)
        .select_options(opts.build())
        .select(&mut pointer, sink.as_mut(), None)
        .await?;

    println!("{}", serde_json::to_string(&game.region())?);
    Ok(())
}

async fn refine(grabber: &dyn ScreenGrabber, region: Rectangle, timeout: Option<Duration>) -> Result<()> {
    let frame = grab_with_timeout(grabber, region, capture_timeout(timeout)).await?;
    let refined = EdgeRefiner::new().refine(&frame, region)?;

    println!("{}", serde_json::to_string(&refined)?);
    Ok(())
}

async fn snapshot(
    grabber: &dyn ScreenGrabber,
    region: Rectangle,
    out: PathBuf,
    timeout: Option<Duration>,
) -> Result<()> {
    println!("Capturing {}...", region);
    let frame = grab_with_timeout(grabber, region, capture_timeout(timeout)).await?;

    println!("Saving to {}...", out.display());
    frame.save_png(&out)?;

    println!("✓ Snapshot saved to {}", out.display());
    Ok(())
}

async fn run(
    grabber: Arc<dyn ScreenGrabber>,
    monitor: usize,
    region: Rectangle,
    frames: Option<u64>,
    timeout: Option<Duration>,
) -> Result<()> {
    let game = GameRegion::builder(grabber)
        .monitor_index(monitor)
        .region(region)
        .loop_options(LoopOptions::builder().capture_timeout(capture_timeout(timeout)).build())
        .build()
        .await?;

    if !game.monitor().contains(region.origin()) {
        tracing::warn!("Region {} starts outside display {} ({})", region, monitor, game.monitor());
    }

    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping after the current frame");
            on_signal.cancel();
        }
    });

    let limit = MaxFrames(frames.unwrap_or(u64::MAX));
    let summary = game
        .play(
            |frame, ctx| {
                if ctx.frame_counter % 100 == 1 {
                    info!(
                        "Frame {} ({}x{}) at {}ms, {:.2} fps",
                        ctx.frame_counter,
                        frame.width(),
                        frame.height(),
                        ctx.elapsed_ms,
                        ctx.fps
                    );
                }
            },
            (limit, cancel),
        )
        .await?;

    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
