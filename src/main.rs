use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context as _;
use clap::Parser;
use rasterkit::demo::FlowDemo;
use rasterkit::util::FpsCounter;
use rasterkit::{DemoConfig, Renderer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Fixed simulation step
const DT: f64 = 1.0 / 60.0;
/// Frames between statistics log lines
const REPORT_EVERY: u64 = 120;
/// Headless frame count when `--frames` is not given
const DEFAULT_HEADLESS_FRAMES: u64 = 300;

#[derive(Parser, Debug)]
#[command(name = "rasterkit", version, about = "Flow-field particle demo")]
struct Args {
    /// Demo config JSON; missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Image width in pixels.
    #[arg(long)]
    width: Option<usize>,

    /// Image height in pixels.
    #[arg(long)]
    height: Option<usize>,

    /// Render threads (1 renders on the calling thread).
    #[arg(long)]
    threads: Option<usize>,

    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,

    /// Render without opening a window.
    #[arg(long)]
    headless: bool,

    /// Disable VSync for an uncapped frame rate.
    #[arg(long)]
    no_vsync: bool,

    /// Seed for particle placement and the noise field.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        },
    }
}

fn load_config(args: &Args) -> anyhow::Result<DemoConfig> {
    let mut config = match &args.config {
        Some(path) => DemoConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => DemoConfig::default(),
    };
    if let Some(w) = args.width {
        config.renderer.width = w;
    }
    if let Some(h) = args.height {
        config.renderer.height = h;
    }
    if args.threads.is_some() {
        config.renderer.threads = args.threads;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().context("invalid settings")?;
    Ok(config)
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    let demo = FlowDemo::new(config.clone())?;

    let mut renderer = Renderer::new(&config.renderer)?;
    if config.renderer.transform.is_none() {
        renderer.set_transform(demo.fitted_transform(config.renderer.width, config.renderer.height));
    }
    info!(
        width = config.renderer.width,
        height = config.renderer.height,
        threads = renderer.thread_count(),
        particles = config.particles,
        "rasterkit flow field"
    );

    if args.headless {
        return run_headless(demo, renderer, args.frames.unwrap_or(DEFAULT_HEADLESS_FRAMES));
    }

    #[cfg(feature = "display")]
    {
        run_windowed(demo, renderer, args.frames, !args.no_vsync)
    }
    #[cfg(not(feature = "display"))]
    {
        tracing::warn!("built without the `display` feature, rendering headless");
        run_headless(demo, renderer, args.frames.unwrap_or(DEFAULT_HEADLESS_FRAMES))
    }
}

fn run_headless(mut demo: FlowDemo, mut renderer: Renderer, frames: u64) -> anyhow::Result<()> {
    let mut fps = FpsCounter::new(REPORT_EVERY as usize);
    let start = Instant::now();
    for frame in 1..=frames {
        let t = Instant::now();
        demo.frame(&mut renderer, DT);
        fps.record(t.elapsed());
        if frame % REPORT_EVERY == 0 {
            info!(frame, avg_ms = fps.avg_frame_time_ms(), "rendering");
        }
    }
    let elapsed = start.elapsed();
    let avg_ms = if frames > 0 {
        elapsed.as_secs_f64() * 1000.0 / frames as f64
    } else {
        0.0
    };
    info!(frames, avg_ms, total_s = elapsed.as_secs_f64(), "headless run finished");
    Ok(())
}

#[cfg(feature = "display")]
fn run_windowed(
    mut demo: FlowDemo,
    mut renderer: Renderer,
    frames: Option<u64>,
    vsync: bool,
) -> anyhow::Result<()> {
    use rasterkit::display::{Display, InputEvent, RenderTarget};
    use rasterkit::Vec2;
    use sdl2::keyboard::Keycode;

    /// Zoom factor per wheel notch
    const ZOOM_STEP: f64 = 1.1;

    let dims = renderer.image().dims();
    let (mut display, texture_creator) = Display::new("rasterkit", dims, vsync)?;
    let mut target = RenderTarget::new(&texture_creator, dims)?;
    let mut fps = FpsCounter::new(60);

    'main: loop {
        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::Wheel { x, y, delta } => {
                    let anchor = Vec2::new(f64::from(x), f64::from(y));
                    renderer
                        .transform_mut()
                        .zoom_about(anchor, ZOOM_STEP.powf(f64::from(delta)));
                },
                InputEvent::Drag { dx, dy } => {
                    renderer.transform_mut().pos += Vec2::new(f64::from(dx), f64::from(dy));
                },
                InputEvent::KeyDown(_) => {},
            }
        }

        demo.frame(&mut renderer, DT);
        display.present(&mut target, renderer.image())?;
        fps.tick();

        if fps.frame_count() % REPORT_EVERY == 0 {
            info!(fps = fps.avg_fps(), avg_ms = fps.avg_frame_time_ms(), "rendering");
        }
        if frames.is_some_and(|n| fps.frame_count() >= n) {
            break;
        }
    }
    Ok(())
}
