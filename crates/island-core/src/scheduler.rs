//! Frame and timer capabilities plus the shared animation ticker.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Receives the frame timestamp in seconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;
pub type TimerCallback = Box<dyn FnOnce()>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// Host scheduling capability: animation frames, timers and a clock.
///
/// All times are seconds on the same timebase as frame timestamps.
pub trait Scheduler {
    fn now(&self) -> f64;
    fn request_frame(&self, callback: FrameCallback) -> TaskId;
    fn set_timer(&self, delay: Duration, callback: TimerCallback) -> TaskId;
    /// Cancelling an unknown or already fired task is a no-op.
    fn cancel(&self, task: TaskId);
}

/// Deterministic scheduler driven by explicit [`ManualScheduler::frame`] calls.
///
/// Frame callbacks requested while a frame runs are deferred to the next one.
/// Timers fire in due order before the frame callbacks of the frame that
/// reaches their due time.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<f64>,
    next_id: Cell<u64>,
    frames: RefCell<Vec<(TaskId, FrameCallback)>>,
    timers: RefCell<Vec<(TaskId, f64, TimerCallback)>>,
    frames_run: Cell<u64>,
}

impl ManualScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn alloc(&self) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TaskId(id)
    }

    /// Advance the clock by `dt`, fire due timers, then run one frame.
    pub fn frame(&self, dt: Duration) {
        self.now.set(self.now.get() + dt.as_secs_f64());
        self.fire_due_timers();
        let batch = std::mem::take(&mut *self.frames.borrow_mut());
        let now = self.now.get();
        for (_, callback) in batch {
            callback(now);
        }
        self.frames_run.set(self.frames_run.get() + 1);
    }

    /// Run frames of `step` until `total` has elapsed.
    pub fn run_for(&self, total: Duration, step: Duration) {
        if step.is_zero() {
            return;
        }
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            self.frame(step);
            elapsed += step;
        }
    }

    fn fire_due_timers(&self) {
        loop {
            let now = self.now.get();
            let due = {
                let mut timers = self.timers.borrow_mut();
                let earliest = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, at, _))| *at <= now)
                    .min_by(|a, b| a.1 .1.total_cmp(&b.1 .1))
                    .map(|(i, _)| i);
                earliest.map(|i| timers.remove(i))
            };
            match due {
                Some((_, _, callback)) => callback(),
                None => break,
            }
        }
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn frames_run(&self) -> u64 {
        self.frames_run.get()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn request_frame(&self, callback: FrameCallback) -> TaskId {
        let id = self.alloc();
        self.frames.borrow_mut().push((id, callback));
        id
    }

    fn set_timer(&self, delay: Duration, callback: TimerCallback) -> TaskId {
        let id = self.alloc();
        let at = self.now.get() + delay.as_secs_f64();
        self.timers.borrow_mut().push((id, at, callback));
        id
    }

    fn cancel(&self, task: TaskId) {
        self.frames.borrow_mut().retain(|(id, _)| *id != task);
        self.timers.borrow_mut().retain(|(id, _, _)| *id != task);
    }
}

/// Something the ticker advances once per frame.
pub trait Animate {
    /// Advance to `now` (seconds). Return `false` when there is nothing left
    /// to animate; the ticker then forgets this animation until woken again.
    fn advance(&self, now: f64) -> bool;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub peak_active: usize,
}

struct TickerInner {
    scheduler: Rc<dyn Scheduler>,
    active: Vec<Weak<dyn Animate>>,
    pending: Option<TaskId>,
    stats: FrameStats,
}

/// Shared per-scene frame driver.
///
/// At most one frame request is outstanding. Every woken animation is advanced
/// with the same timestamp in a frame, so all of them observe the same state.
#[derive(Clone)]
pub struct Ticker {
    inner: Rc<RefCell<TickerInner>>,
}

impl Ticker {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TickerInner {
                scheduler,
                active: Vec::new(),
                pending: None,
                stats: FrameStats::default(),
            })),
        }
    }

    pub fn now(&self) -> f64 {
        let scheduler = self.scheduler();
        scheduler.now()
    }

    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        self.inner.borrow().scheduler.clone()
    }

    /// Schedule `anim` for advancing on the next frame. Waking an animation
    /// that is already active is a no-op.
    pub fn wake(&self, anim: Weak<dyn Animate>) {
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.active.iter().any(|a| a.ptr_eq(&anim)) {
                inner.active.push(anim);
            }
        }
        self.ensure_frame();
    }

    pub fn active_count(&self) -> usize {
        self.inner
            .borrow()
            .active
            .iter()
            .filter(|a| a.strong_count() > 0)
            .count()
    }

    pub fn stats(&self) -> FrameStats {
        self.inner.borrow().stats
    }

    /// Forget every animation and cancel the outstanding frame request.
    pub fn clear(&self) {
        let (scheduler, task) = {
            let mut inner = self.inner.borrow_mut();
            inner.active.clear();
            (inner.scheduler.clone(), inner.pending.take())
        };
        if let Some(task) = task {
            scheduler.cancel(task);
        }
    }

    fn ensure_frame(&self) {
        let scheduler = {
            let inner = self.inner.borrow();
            if inner.pending.is_some() || inner.active.is_empty() {
                return;
            }
            inner.scheduler.clone()
        };
        let weak = Rc::downgrade(&self.inner);
        let task = scheduler.request_frame(Box::new(move |now| {
            if let Some(inner) = weak.upgrade() {
                Ticker { inner }.run_frame(now);
            }
        }));
        self.inner.borrow_mut().pending = Some(task);
    }

    fn run_frame(&self, now: f64) {
        let batch = {
            let mut inner = self.inner.borrow_mut();
            inner.pending = None;
            std::mem::take(&mut inner.active)
        };
        let advanced = batch.len();
        let mut keep = Vec::with_capacity(batch.len());
        for weak in batch {
            if let Some(anim) = weak.upgrade() {
                if anim.advance(now) {
                    keep.push(weak);
                }
            }
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.stats.frames += 1;
            inner.stats.peak_active = inner.stats.peak_active.max(advanced);
            // merge in anything woken while this frame ran
            for weak in keep {
                if !inner.active.iter().any(|a| a.ptr_eq(&weak)) {
                    inner.active.push(weak);
                }
            }
        }
        self.ensure_frame();
    }
}

impl Drop for TickerInner {
    fn drop(&mut self) {
        if let Some(task) = self.pending.take() {
            self.scheduler.cancel(task);
        }
    }
}
