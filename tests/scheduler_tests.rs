// Host-side tests for the manual scheduler and the shared ticker.

use island_core::{Animate, ManualScheduler, Scheduler, Ticker};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

struct Counter {
    left: Cell<u32>,
    seen: RefCell<Vec<f64>>,
}

impl Counter {
    fn new(frames: u32) -> Rc<Self> {
        Rc::new(Self {
            left: Cell::new(frames),
            seen: RefCell::new(Vec::new()),
        })
    }
}

impl Animate for Counter {
    fn advance(&self, now: f64) -> bool {
        self.seen.borrow_mut().push(now);
        self.left.set(self.left.get().saturating_sub(1));
        self.left.get() > 0
    }
}

fn weak(counter: &Rc<Counter>) -> Weak<dyn Animate> {
    let w: Weak<Counter> = Rc::downgrade(counter);
    w
}

#[test]
fn frame_callbacks_requested_during_a_frame_wait_for_the_next() {
    let scheduler = ManualScheduler::new();
    let runs = Rc::new(Cell::new(0));
    let inner_runs = runs.clone();
    let inner_sched = scheduler.clone();
    scheduler.request_frame(Box::new(move |_| {
        inner_runs.set(inner_runs.get() + 1);
        let again = inner_runs.clone();
        inner_sched.request_frame(Box::new(move |_| again.set(again.get() + 1)));
    }));
    scheduler.frame(FRAME);
    assert_eq!(runs.get(), 1);
    assert_eq!(scheduler.pending_frames(), 1);
    scheduler.frame(FRAME);
    assert_eq!(runs.get(), 2);
    assert_eq!(scheduler.pending_frames(), 0);
}

#[test]
fn timers_fire_in_due_order() {
    let scheduler = ManualScheduler::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    let late = order.clone();
    let early = order.clone();
    scheduler.set_timer(
        Duration::from_millis(100),
        Box::new(move || late.borrow_mut().push("late")),
    );
    scheduler.set_timer(
        Duration::from_millis(50),
        Box::new(move || early.borrow_mut().push("early")),
    );
    scheduler.frame(Duration::from_millis(60));
    assert_eq!(*order.borrow(), vec!["early"]);
    scheduler.frame(Duration::from_millis(60));
    assert_eq!(*order.borrow(), vec!["early", "late"]);
    assert_eq!(scheduler.pending_timers(), 0);
}

#[test]
fn cancel_removes_pending_work() {
    let scheduler = ManualScheduler::new();
    let fired = Rc::new(Cell::new(false));
    let f1 = fired.clone();
    let f2 = fired.clone();
    let frame = scheduler.request_frame(Box::new(move |_| f1.set(true)));
    let timer = scheduler.set_timer(FRAME, Box::new(move || f2.set(true)));
    scheduler.cancel(frame);
    scheduler.cancel(timer);
    // unknown ids are fine
    scheduler.cancel(timer);
    scheduler.run_for(Duration::from_millis(100), FRAME);
    assert!(!fired.get());
}

#[test]
fn ticker_keeps_one_frame_request_outstanding() {
    let scheduler = ManualScheduler::new();
    let ticker = Ticker::new(scheduler.clone());
    let a = Counter::new(3);
    let b = Counter::new(1);
    let wa = weak(&a);
    let wb = weak(&b);
    ticker.wake(wa.clone());
    ticker.wake(wb);
    ticker.wake(wa);
    assert_eq!(scheduler.pending_frames(), 1);
    assert_eq!(ticker.active_count(), 2);

    scheduler.frame(FRAME);
    // b finished, a keeps going
    assert_eq!(ticker.active_count(), 1);
    assert_eq!(scheduler.pending_frames(), 1);

    scheduler.run_for(Duration::from_millis(100), FRAME);
    assert_eq!(a.seen.borrow().len(), 3);
    assert_eq!(b.seen.borrow().len(), 1);
    assert_eq!(scheduler.pending_frames(), 0);
    assert_eq!(ticker.stats().frames, 3);
    assert_eq!(ticker.stats().peak_active, 2);
}

#[test]
fn every_animation_sees_the_same_timestamp() {
    let scheduler = ManualScheduler::new();
    let ticker = Ticker::new(scheduler.clone());
    let a = Counter::new(2);
    let b = Counter::new(2);
    let wa = weak(&a);
    let wb = weak(&b);
    ticker.wake(wa);
    ticker.wake(wb);
    scheduler.frame(FRAME);
    scheduler.frame(FRAME);
    assert_eq!(*a.seen.borrow(), *b.seen.borrow());
    assert_eq!(a.seen.borrow()[0], scheduler.now());
    assert!(a.seen.borrow()[0] > 0.0);
}

#[test]
fn dropped_animations_are_forgotten() {
    let scheduler = ManualScheduler::new();
    let ticker = Ticker::new(scheduler.clone());
    let a = Counter::new(100);
    let wa = weak(&a);
    ticker.wake(wa);
    drop(a);
    assert_eq!(ticker.active_count(), 0);
    scheduler.frame(FRAME);
    assert_eq!(scheduler.pending_frames(), 0);
}

#[test]
fn clear_cancels_the_outstanding_frame() {
    let scheduler = ManualScheduler::new();
    let ticker = Ticker::new(scheduler.clone());
    let a = Counter::new(100);
    let wa = weak(&a);
    ticker.wake(wa);
    ticker.clear();
    assert_eq!(scheduler.pending_frames(), 0);
    scheduler.frame(FRAME);
    assert!(a.seen.borrow().is_empty());
}

#[test]
fn dropping_the_ticker_cancels_its_frame() {
    let scheduler = ManualScheduler::new();
    let a = Counter::new(100);
    {
        let ticker = Ticker::new(scheduler.clone());
        let wa = weak(&a);
        ticker.wake(wa);
        assert_eq!(scheduler.pending_frames(), 1);
    }
    assert_eq!(scheduler.pending_frames(), 0);
}
