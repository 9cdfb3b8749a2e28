//! Ambient animation loops: infinite, pointer-independent micro-animations.
//!
//! A loop is a timeline of one or more segments. Every cycle draws fresh
//! random durations and targets, plays the segments in order (then mirrored,
//! when yoyo is on) and starts the next cycle, optionally after a delay.
//! Segments start from the node's current values unless a track gives an
//! explicit start value.

use crate::constants::MIN_SEGMENT_SEC;
use crate::easing::Ease;
use crate::scheduler::{Animate, TaskId};
use crate::stage::Stage;
use crate::target::{NodeId, Property};
use rand::rngs::StdRng;
use rand::Rng;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Upper bound on segments crossed in one frame before the loop resyncs to
/// the frame clock (after a long host suspension, say).
const MAX_CATCH_UP: usize = 64;

/// Uniform `[0, 1)` source for per-cycle parameters.
pub trait RandomSource {
    fn unit(&mut self) -> f32;
}

impl RandomSource for StdRng {
    fn unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

/// Replays a fixed list of unit values, wrapping around.
#[derive(Clone, Debug)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    at: usize,
}

impl ScriptedRandom {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        Self {
            values: values.into(),
            at: 0,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.at % self.values.len()];
        self.at += 1;
        v.clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample {
    Fixed(f32),
    Uniform { min: f32, max: f32 },
}

impl Sample {
    pub const fn range(min: f32, max: f32) -> Self {
        Sample::Uniform { min, max }
    }

    pub fn draw(&self, rng: &mut dyn RandomSource) -> f32 {
        match *self {
            Sample::Fixed(v) => v,
            Sample::Uniform { min, max } => min + (max - min) * rng.unit(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackSpec {
    pub property: Property,
    pub from: Option<Sample>,
    pub to: Sample,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentSpec {
    /// Seconds.
    pub duration: Sample,
    pub ease: Ease,
    pub tracks: SmallVec<[TrackSpec; 2]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AmbientSpec {
    pub node: NodeId,
    pub segments: Vec<SegmentSpec>,
    pub yoyo: bool,
    /// Pause between cycles, seconds.
    pub repeat_delay: f64,
    /// Start this many seconds into the first cycle.
    pub seek: f64,
}

impl AmbientSpec {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            segments: Vec::new(),
            yoyo: false,
            repeat_delay: 0.0,
            seek: 0.0,
        }
    }

    /// Open a new segment; following `to`/`from_to` calls add tracks to it.
    pub fn segment(mut self, duration: Sample, ease: Ease) -> Self {
        self.segments.push(SegmentSpec {
            duration,
            ease,
            tracks: SmallVec::new(),
        });
        self
    }

    pub fn to(self, property: Property, to: Sample) -> Self {
        self.track(TrackSpec {
            property,
            from: None,
            to,
        })
    }

    pub fn from_to(self, property: Property, from: Sample, to: Sample) -> Self {
        self.track(TrackSpec {
            property,
            from: Some(from),
            to,
        })
    }

    fn track(mut self, track: TrackSpec) -> Self {
        if let Some(seg) = self.segments.last_mut() {
            seg.tracks.push(track);
        }
        self
    }

    pub fn yoyo(mut self) -> Self {
        self.yoyo = true;
        self
    }

    pub fn repeat_delay(mut self, secs: f64) -> Self {
        self.repeat_delay = secs.max(0.0);
        self
    }

    pub fn seek(mut self, secs: f64) -> Self {
        self.seek = secs.max(0.0);
        self
    }
}

/// One resolved segment of a cycle.
#[derive(Clone, Debug)]
struct Leg {
    duration: f64,
    ease: Ease,
    tracks: SmallVec<[(Property, f32, f32); 2]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopStatus {
    Running,
    /// Between cycles, waiting on the repeat-delay timer.
    Waiting,
    Stopped,
    /// A render write failed; the loop never restarts.
    Failed,
}

struct LoopState {
    rng: Box<dyn RandomSource>,
    legs: Vec<Leg>,
    leg: usize,
    leg_start: f64,
    /// Last value written per property.
    current: SmallVec<[(Property, f32); 4]>,
    status: LoopStatus,
    cycles: u64,
    delay_task: Option<TaskId>,
}

impl LoopState {
    fn value(&self, property: Property) -> Option<f32> {
        self.current
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| *v)
    }

    fn record(&mut self, property: Property, value: f32) {
        match self.current.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.current.push((property, value)),
        }
    }
}

struct LoopCore {
    stage: Stage,
    spec: AmbientSpec,
    name: String,
    state: RefCell<LoopState>,
    me: Weak<LoopCore>,
}

/// Handle to a running loop. Dropping it stops the loop.
pub struct AmbientLoop {
    core: Rc<LoopCore>,
}

impl AmbientLoop {
    pub fn start(stage: &Stage, spec: AmbientSpec) -> Self {
        let rng = stage.next_random();
        Self::with_random(stage, spec, rng)
    }

    pub fn with_random(stage: &Stage, spec: AmbientSpec, rng: Box<dyn RandomSource>) -> Self {
        let name = stage.node_name(spec.node);
        let rest = stage.registry.borrow().rest(spec.node);
        let current = spec
            .segments
            .iter()
            .flat_map(|s| s.tracks.iter().map(|t| t.property))
            .fold(SmallVec::<[(Property, f32); 4]>::new(), |mut acc, p| {
                if !acc.iter().any(|(q, _)| *q == p) {
                    acc.push((p, rest.get(p)));
                }
                acc
            });
        let core = Rc::new_cyclic(|me| LoopCore {
            stage: stage.clone(),
            spec,
            name,
            state: RefCell::new(LoopState {
                rng,
                legs: Vec::new(),
                leg: 0,
                leg_start: 0.0,
                current,
                status: LoopStatus::Stopped,
                cycles: 0,
                delay_task: None,
            }),
            me: me.clone(),
        });

        if core.spec.segments.iter().all(|s| s.tracks.is_empty()) {
            log::debug!("[ambient] {}: nothing to animate", core.name);
        } else if !stage.target.has_node(core.spec.node) {
            log::warn!("[ambient] {}: render node missing, loop not started", core.name);
        } else {
            let now = stage.ticker.now();
            core.begin_cycle(now - core.spec.seek);
            core.wake();
        }
        Self { core }
    }

    pub fn status(&self) -> LoopStatus {
        self.core.state.borrow().status
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status(), LoopStatus::Running | LoopStatus::Waiting)
    }

    pub fn cycles_completed(&self) -> u64 {
        self.core.state.borrow().cycles
    }

    pub fn node(&self) -> NodeId {
        self.core.spec.node
    }

    /// Last written value of `property`, or its rest value before any write.
    pub fn value(&self, property: Property) -> Option<f32> {
        self.core.state.borrow().value(property)
    }
}

impl Drop for AmbientLoop {
    fn drop(&mut self) {
        self.core.stop(LoopStatus::Stopped);
    }
}

impl LoopCore {
    fn wake(&self) {
        let me: Weak<dyn Animate> = self.me.clone();
        self.stage.ticker.wake(me);
    }

    /// Draw a fresh cycle starting at `start`.
    fn begin_cycle(&self, start: f64) {
        let mut st = self.state.borrow_mut();
        let mut legs = Vec::with_capacity(self.spec.segments.len() * 2);
        // values each segment starts from, carried forward through the cycle
        let mut running = st.current.clone();
        for seg in &self.spec.segments {
            let duration = (seg.duration.draw(st.rng.as_mut()) as f64).max(MIN_SEGMENT_SEC);
            let mut tracks = SmallVec::new();
            for t in &seg.tracks {
                let from = match t.from {
                    Some(s) => s.draw(st.rng.as_mut()),
                    None => running
                        .iter()
                        .find(|(p, _)| *p == t.property)
                        .map(|(_, v)| *v)
                        .unwrap_or_else(|| t.property.neutral()),
                };
                let to = t.to.draw(st.rng.as_mut());
                tracks.push((t.property, from, to));
                match running.iter_mut().find(|(p, _)| *p == t.property) {
                    Some(slot) => slot.1 = to,
                    None => running.push((t.property, to)),
                }
            }
            legs.push(Leg {
                duration,
                ease: seg.ease,
                tracks,
            });
        }
        if self.spec.yoyo {
            let back: Vec<Leg> = legs
                .iter()
                .rev()
                .map(|leg| Leg {
                    duration: leg.duration,
                    ease: leg.ease,
                    tracks: leg.tracks.iter().map(|&(p, a, b)| (p, b, a)).collect(),
                })
                .collect();
            legs.extend(back);
        }
        st.legs = legs;
        st.leg = 0;
        st.leg_start = start;
        st.status = LoopStatus::Running;
    }

    fn stop(&self, status: LoopStatus) {
        let task = {
            let mut st = self.state.borrow_mut();
            st.status = status;
            st.legs.clear();
            st.delay_task.take()
        };
        if let Some(task) = task {
            self.stage.ticker.scheduler().cancel(task);
        }
    }

    fn schedule_repeat(&self, cycle_end: f64, now: f64) {
        let resume_at = cycle_end + self.spec.repeat_delay;
        let wait = Duration::try_from_secs_f64((resume_at - now).max(0.0)).unwrap_or_default();
        let weak = self.me.clone();
        let task = self.stage.ticker.scheduler().set_timer(
            wait,
            Box::new(move || {
                if let Some(core) = weak.upgrade() {
                    if core.state.borrow().status != LoopStatus::Waiting {
                        return;
                    }
                    core.state.borrow_mut().delay_task = None;
                    core.begin_cycle(resume_at);
                    core.wake();
                }
            }),
        );
        let mut st = self.state.borrow_mut();
        st.status = LoopStatus::Waiting;
        st.delay_task = Some(task);
    }

    /// Step the timeline to `now`, collecting the values to write.
    /// Returns whether the loop should keep ticking.
    fn step(&self, now: f64, out: &mut SmallVec<[(Property, f32); 4]>) -> bool {
        let mut crossed = 0;
        loop {
            let (finished_at, leg_done) = {
                let mut st = self.state.borrow_mut();
                if st.status != LoopStatus::Running || st.legs.is_empty() {
                    return false;
                }
                let leg = st.legs[st.leg].clone();
                let elapsed = now - st.leg_start;
                if elapsed < leg.duration {
                    let k = leg.ease.apply((elapsed.max(0.0) / leg.duration) as f32);
                    for &(p, a, b) in &leg.tracks {
                        let v = a + (b - a) * k;
                        st.record(p, v);
                        push_prop(out, p, v);
                    }
                    return true;
                }
                for &(p, _, b) in &leg.tracks {
                    st.record(p, b);
                    push_prop(out, p, b);
                }
                st.leg_start += leg.duration;
                st.leg += 1;
                let cycle_done = st.leg >= st.legs.len();
                if cycle_done {
                    st.cycles += 1;
                }
                (st.leg_start, cycle_done)
            };
            if !leg_done {
                crossed += 1;
                if crossed >= MAX_CATCH_UP {
                    self.state.borrow_mut().leg_start = now;
                }
                continue;
            }
            if self.spec.repeat_delay > 0.0 {
                self.schedule_repeat(finished_at, now);
                return false;
            }
            crossed += 1;
            let start = if crossed >= MAX_CATCH_UP { now } else { finished_at };
            self.begin_cycle(start);
        }
    }
}

fn push_prop(out: &mut SmallVec<[(Property, f32); 4]>, p: Property, v: f32) {
    match out.iter_mut().find(|(q, _)| *q == p) {
        Some(slot) => slot.1 = v,
        None => out.push((p, v)),
    }
}

impl Animate for LoopCore {
    fn advance(&self, now: f64) -> bool {
        let mut props = SmallVec::new();
        let keep = self.step(now, &mut props);
        if props.is_empty() {
            return keep;
        }
        match self.stage.target.write(self.spec.node, &props) {
            Ok(()) => keep,
            Err(e) => {
                log::error!("[ambient] {}: {e}; loop stopped", self.name);
                self.stop(LoopStatus::Failed);
                false
            }
        }
    }
}
