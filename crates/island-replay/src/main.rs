use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use glam::Vec2;
use island_core::{
    composition, FixedMetrics, ManualScheduler, ManualVisibility, MemoryTarget, NodeRegistry,
    PointerSample, Scene, SceneConfig, Stage, Viewport,
};

mod args;

use args::Args;

const FRAME: Duration = Duration::from_micros(16_667);
const VIEWPORT: Vec2 = Vec2::new(1440.0, 900.0);

// Nodes whose transforms are logged once per replayed second
const WATCHED: [&str; 5] = ["island", "palm-trees", "bottle", "grass-0", "cloud-1"];

/// Pointer position for frame `i`: a slow figure-eight over the viewport.
fn sweep(i: u32) -> PointerSample {
    let t = i as f32 * FRAME.as_secs_f32();
    let x = VIEWPORT.x * (0.5 + 0.45 * (t * 0.7).sin());
    let y = VIEWPORT.y * (0.5 + 0.4 * (t * 1.4).sin());
    PointerSample::new(x, y)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let args = Args::parse();

    let config = SceneConfig::default().with_seed(args.seed);
    let mut registry = NodeRegistry::new();
    let elements = composition::island(&mut registry, &config);
    let island_node = registry.require("island")?;
    let watched = WATCHED
        .iter()
        .map(|name| registry.require(name).map(|id| (*name, id)))
        .collect::<Result<Vec<_>, _>>()?;

    let scheduler = ManualScheduler::new();
    let target = Rc::new(MemoryTarget::from_registry(&registry));
    let visibility = Rc::new(ManualVisibility::new());
    let stage = Stage::new(config, scheduler.clone(), target.clone(), visibility.clone())
        .with_registry(registry)
        .with_viewport(Viewport::new(VIEWPORT.x, VIEWPORT.y));

    let mut scene = Scene::new(stage);
    scene.attach_pointer(Rc::new(FixedMetrics::new(VIEWPORT.x, VIEWPORT.y)));
    scene.mount_all(elements);
    log::info!(
        "[replay] seed={} seconds={} elements={}",
        args.seed,
        args.seconds,
        scene.len()
    );

    let frames_per_sec = (1.0 / FRAME.as_secs_f64()).round() as u32;
    for i in 0..args.seconds * frames_per_sec {
        // the island scrolls into view half a second in
        if i == frames_per_sec / 2 {
            visibility.set_intersecting(island_node, true);
        }
        scene.pointer_moved(sweep(i));
        scheduler.frame(FRAME);

        if (i + 1) % frames_per_sec == 0 {
            let stats = scene.stage().ticker.stats();
            log::info!(
                "[replay] t={}s frames={} peak_active={} writes={}",
                (i + 1) / frames_per_sec,
                stats.frames,
                stats.peak_active,
                target.total_writes()
            );
            for (name, node) in &watched {
                if let Some(style) = target.style(*node) {
                    log::info!("[replay]   {name:<12} {}", style.svg_transform());
                }
            }
        }
    }

    scene.teardown();
    log::info!(
        "[replay] torn down: pending frames={} timers={}",
        scheduler.pending_frames(),
        scheduler.pending_timers()
    );
    if scheduler.pending_frames() + scheduler.pending_timers() > 0 {
        anyhow::bail!("callbacks left behind after teardown");
    }
    Ok(())
}
