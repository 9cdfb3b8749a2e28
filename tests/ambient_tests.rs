// Host-side tests for ambient loops.

use island_core::{
    AmbientLoop, AmbientSpec, Ease, LoopStatus, ManualScheduler, ManualVisibility, MemoryTarget,
    NodeId, NodeRegistry, NodeStyle, Property, Sample, SceneConfig, ScriptedRandom, Stage,
};
use std::rc::Rc;
use std::time::Duration;

const FRAME: Duration = Duration::from_micros(16_667);

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

struct Harness {
    scheduler: Rc<ManualScheduler>,
    target: Rc<MemoryTarget>,
    stage: Stage,
    node: NodeId,
}

fn harness_with(config: SceneConfig, rest: NodeStyle) -> Harness {
    let mut registry = NodeRegistry::new();
    let node = registry.register("blade", rest);
    let scheduler = ManualScheduler::new();
    let target = Rc::new(MemoryTarget::from_registry(&registry));
    let stage = Stage::new(
        config,
        scheduler.clone(),
        target.clone(),
        Rc::new(ManualVisibility::new()),
    )
    .with_registry(registry);
    Harness {
        scheduler,
        target,
        stage,
        node,
    }
}

fn harness() -> Harness {
    harness_with(SceneConfig::default(), NodeStyle::default())
}

fn style(h: &Harness) -> NodeStyle {
    h.target.style(h.node).unwrap()
}

fn step(h: &Harness, millis: u64) {
    h.scheduler.frame(Duration::from_millis(millis));
}

#[test]
fn yoyo_cycle_follows_drawn_values() {
    let h = harness();
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::range(1.0, 2.0), Ease::Linear)
        .to(Property::Rotation, Sample::range(-10.0, 10.0))
        .yoyo();
    // duration 1.5s, angle 5; then duration 1.0s, angle -10
    let rng = ScriptedRandom::new(vec![0.5, 0.75, 0.0, 0.0]);
    let ambient = AmbientLoop::with_random(&h.stage, spec, Box::new(rng));
    assert_eq!(ambient.status(), LoopStatus::Running);
    assert_eq!(h.scheduler.pending_frames(), 1);

    step(&h, 750);
    assert!(approx(style(&h).rotation, 2.5));
    step(&h, 750);
    assert!(approx(style(&h).rotation, 5.0));
    step(&h, 750);
    assert!(approx(style(&h).rotation, 2.5));
    // back at rest: one cycle done, the next starts from here
    step(&h, 750);
    assert!(approx(style(&h).rotation, 0.0));
    assert_eq!(ambient.cycles_completed(), 1);

    step(&h, 500);
    assert!(approx(style(&h).rotation, -5.0));
    assert!(approx(ambient.value(Property::Rotation).unwrap(), -5.0));
}

#[test]
fn forward_loop_restarts_from_the_end_value() {
    let h = harness();
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::Fixed(1.0), Ease::Linear)
        .to(Property::SkewX, Sample::range(0.0, 10.0));
    let rng = ScriptedRandom::new(vec![1.0, 0.5]);
    let ambient = AmbientLoop::with_random(&h.stage, spec, Box::new(rng));

    step(&h, 1000);
    assert!(approx(style(&h).skew_x, 10.0));
    // second cycle goes 10 -> 5, with no jump back to 0
    step(&h, 500);
    assert!(approx(style(&h).skew_x, 7.5));
    assert_eq!(ambient.cycles_completed(), 1);
}

#[test]
fn multi_segment_timeline_plays_in_order() {
    let h = harness();
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::Fixed(3.0), Ease::Linear)
        .to(Property::Hue, Sample::Fixed(180.0))
        .segment(Sample::Fixed(3.0), Ease::Linear)
        .to(Property::Hue, Sample::Fixed(359.0));
    let _ambient = AmbientLoop::start(&h.stage, spec);

    step(&h, 1500);
    assert!(approx(style(&h).hue, 90.0));
    step(&h, 1500);
    assert!(approx(style(&h).hue, 180.0));
    step(&h, 1500);
    assert!(approx(style(&h).hue, 269.5));
    step(&h, 1500);
    assert!(approx(style(&h).hue, 359.0));
    // next cycle heads back to 180 from where it ended
    step(&h, 1500);
    assert!(approx(style(&h).hue, 269.5));
}

#[test]
fn explicit_from_value_restarts_every_cycle() {
    let h = harness();
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::Fixed(2.0), Ease::Linear)
        .from_to(Property::TranslateX, Sample::Fixed(-100.0), Sample::Fixed(1000.0));
    let _ambient = AmbientLoop::start(&h.stage, spec);
    step(&h, 1000);
    assert!(approx(style(&h).translate.x, 450.0));
    step(&h, 1000);
    step(&h, 1000);
    assert!(approx(style(&h).translate.x, 450.0));
}

#[test]
fn repeat_delay_waits_on_a_timer() {
    let h = harness();
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::Fixed(1.0), Ease::Linear)
        .from_to(Property::TranslateX, Sample::Fixed(-100.0), Sample::Fixed(1000.0))
        .repeat_delay(2.0);
    let ambient = AmbientLoop::start(&h.stage, spec);

    step(&h, 500);
    assert!(approx(style(&h).translate.x, 450.0));
    step(&h, 500);
    assert!(approx(style(&h).translate.x, 1000.0));
    assert_eq!(ambient.status(), LoopStatus::Waiting);
    assert!(ambient.is_running());
    assert_eq!(h.scheduler.pending_timers(), 1);

    // idle while waiting: no frames requested, no writes
    let writes = h.target.write_count(h.node);
    for _ in 0..3 {
        step(&h, 500);
    }
    assert_eq!(h.target.write_count(h.node), writes);
    assert_eq!(h.scheduler.pending_frames(), 0);

    // delay ends at 3.0s
    step(&h, 500);
    assert_eq!(ambient.status(), LoopStatus::Running);
    assert!(approx(style(&h).translate.x, -100.0));
    step(&h, 500);
    assert!(approx(style(&h).translate.x, 450.0));
    assert_eq!(ambient.cycles_completed(), 1);
}

#[test]
fn seek_starts_part_way_into_the_first_cycle() {
    let h = harness();
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::Fixed(10.0), Ease::Linear)
        .from_to(Property::TranslateX, Sample::Fixed(-100.0), Sample::Fixed(900.0))
        .seek(5.0);
    let _ambient = AmbientLoop::start(&h.stage, spec);
    step(&h, 100);
    assert!(approx(style(&h).translate.x, 410.0));
}

#[test]
fn initial_values_come_from_the_rest_style() {
    let rest = NodeStyle {
        rotation: 4.0,
        ..NodeStyle::default()
    };
    let h = harness_with(SceneConfig::default(), rest);
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::Fixed(1.0), Ease::Linear)
        .to(Property::Rotation, Sample::Fixed(-4.0));
    let ambient = AmbientLoop::start(&h.stage, spec);
    assert_eq!(ambient.value(Property::Rotation), Some(4.0));
    step(&h, 500);
    assert!(approx(style(&h).rotation, 0.0));
}

#[test]
fn drawn_values_stay_in_range() {
    let h = harness();
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::range(0.5, 1.5), Ease::SineInOut)
        .to(Property::Rotation, Sample::range(-1.0, 1.0))
        .to(Property::SkewX, Sample::range(-15.0, 15.0))
        .yoyo();
    let ambient = AmbientLoop::start(&h.stage, spec);
    for _ in 0..600 {
        h.scheduler.frame(FRAME);
        let s = style(&h);
        assert!((-1.0..=1.0).contains(&s.rotation), "rotation {}", s.rotation);
        assert!((-15.0..=15.0).contains(&s.skew_x), "skew {}", s.skew_x);
    }
    assert!(ambient.cycles_completed() >= 3);
}

#[test]
fn same_seed_replays_identically() {
    let run = |seed: u64| {
        let h = harness_with(SceneConfig::default().with_seed(seed), NodeStyle::default());
        let spec = AmbientSpec::new(h.node)
            .segment(Sample::range(0.2, 0.8), Ease::Power1InOut)
            .to(Property::Rotation, Sample::range(-3.0, 3.0))
            .yoyo();
        let _ambient = AmbientLoop::start(&h.stage, spec);
        let mut trace = Vec::new();
        for _ in 0..120 {
            h.scheduler.frame(FRAME);
            trace.push(style(&h).rotation);
        }
        trace
    };
    assert_eq!(run(7), run(7));
    assert_ne!(run(7), run(8));
}

#[test]
fn sibling_loops_draw_independent_streams() {
    let h = harness();
    let mut a = h.stage.next_random();
    let mut b = h.stage.next_random();
    let da: Vec<f32> = (0..4).map(|_| a.unit()).collect();
    let db: Vec<f32> = (0..4).map(|_| b.unit()).collect();
    assert_ne!(da, db);
}

#[test]
fn dropping_the_loop_stops_it() {
    let h = harness();
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::Fixed(1.0), Ease::Linear)
        .to(Property::Rotation, Sample::Fixed(10.0))
        .yoyo();
    let ambient = AmbientLoop::start(&h.stage, spec);
    step(&h, 300);
    drop(ambient);
    let frozen = h.target.write_count(h.node);
    h.scheduler.run_for(Duration::from_secs(3), FRAME);
    assert_eq!(h.target.write_count(h.node), frozen);
    assert_eq!(h.scheduler.pending_frames(), 0);
}

#[test]
fn dropping_a_waiting_loop_cancels_its_timer() {
    let h = harness();
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::Fixed(0.5), Ease::Linear)
        .to(Property::Opacity, Sample::Fixed(0.0))
        .repeat_delay(5.0);
    let ambient = AmbientLoop::start(&h.stage, spec);
    step(&h, 600);
    assert_eq!(ambient.status(), LoopStatus::Waiting);
    drop(ambient);
    assert_eq!(h.scheduler.pending_timers(), 0);
}

#[test]
fn write_failure_stops_the_loop_for_good() {
    let h = harness();
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::Fixed(1.0), Ease::Linear)
        .to(Property::Rotation, Sample::Fixed(10.0));
    let ambient = AmbientLoop::start(&h.stage, spec);
    h.target.fail_writes(h.node);
    step(&h, 100);
    assert_eq!(ambient.status(), LoopStatus::Failed);
    assert!(!ambient.is_running());
    h.scheduler.run_for(Duration::from_secs(2), FRAME);
    assert_eq!(h.scheduler.pending_frames(), 0);
}

#[test]
fn missing_node_never_starts() {
    let h = harness();
    h.target.detach(h.node);
    let spec = AmbientSpec::new(h.node)
        .segment(Sample::Fixed(1.0), Ease::Linear)
        .to(Property::Rotation, Sample::Fixed(10.0));
    let ambient = AmbientLoop::start(&h.stage, spec);
    assert_eq!(ambient.status(), LoopStatus::Stopped);
    assert_eq!(h.scheduler.pending_frames(), 0);
}
