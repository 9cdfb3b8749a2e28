//! Pointer signal source: turns raw pointer positions into the scene offset.
//!
//! Pointer events are coalesced to one offset write per animation frame, using
//! the latest sample of that frame.

use crate::constants::SKEW_FACTOR;
use crate::offset::{Offset, OffsetStore};
use crate::scheduler::{Scheduler, TaskId};
use crate::stage::Stage;
use glam::Vec2;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Pointer position in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Derive the offset for `sample`. `None` if the scene cannot be measured.
pub fn derive_offset(
    sample: PointerSample,
    scene: Vec2,
    rendered_width: f32,
    viewport_height: f32,
) -> Option<Offset> {
    let measurable = rendered_width.is_finite() && rendered_width > 0.0 && viewport_height > 0.0;
    if !measurable {
        return None;
    }
    let dx = (sample.x * scene.x) / rendered_width - scene.x / 2.0;
    let dy = (sample.y * scene.y) / viewport_height - scene.y / 2.0;
    Some(Offset {
        pos: Vec2::new(sample.x, sample.y),
        dist: Vec2::new(dx, dy),
        scale: sample.y / viewport_height,
        skew: (dx * 100.0 / scene.x) * -1.0 * SKEW_FACTOR,
    })
}

/// Host layout measurements the pointer mapping depends on.
pub trait SceneMetrics {
    /// Rendered width of the scene element, `None` before layout.
    fn rendered_width(&self) -> Option<f32>;
    fn viewport_height(&self) -> f32;
}

/// Settable measurements for native hosts and tests.
pub struct FixedMetrics {
    width: Cell<Option<f32>>,
    height: Cell<f32>,
}

impl FixedMetrics {
    pub fn new(rendered_width: f32, viewport_height: f32) -> Self {
        Self {
            width: Cell::new(Some(rendered_width)),
            height: Cell::new(viewport_height),
        }
    }

    /// Scene not laid out yet.
    pub fn unmeasured(viewport_height: f32) -> Self {
        Self {
            width: Cell::new(None),
            height: Cell::new(viewport_height),
        }
    }

    pub fn set_rendered_width(&self, width: Option<f32>) {
        self.width.set(width);
    }

    pub fn set_viewport_height(&self, height: f32) {
        self.height.set(height);
    }
}

impl SceneMetrics for FixedMetrics {
    fn rendered_width(&self) -> Option<f32> {
        self.width.get()
    }

    fn viewport_height(&self) -> f32 {
        self.height.get()
    }
}

struct PointerInner {
    offsets: OffsetStore,
    scheduler: Rc<dyn Scheduler>,
    metrics: Rc<dyn SceneMetrics>,
    scene: Vec2,
    latest: Option<PointerSample>,
    pending: Option<TaskId>,
    applied: u64,
    skipped: u64,
}

/// Sole writer of the scene's offset store.
pub struct PointerSignal {
    inner: Rc<RefCell<PointerInner>>,
}

impl PointerSignal {
    pub fn attach(stage: &Stage, metrics: Rc<dyn SceneMetrics>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PointerInner {
                offsets: stage.offsets.clone(),
                scheduler: stage.ticker.scheduler(),
                metrics,
                scene: stage.config.scene_size,
                latest: None,
                pending: None,
                applied: 0,
                skipped: 0,
            })),
        }
    }

    /// Record a pointer event. The offset is updated on the next frame.
    pub fn pointer_moved(&self, sample: PointerSample) {
        let scheduler = {
            let mut inner = self.inner.borrow_mut();
            inner.latest = Some(sample);
            if inner.pending.is_some() {
                return;
            }
            inner.scheduler.clone()
        };
        let weak: Weak<RefCell<PointerInner>> = Rc::downgrade(&self.inner);
        let task = scheduler.request_frame(Box::new(move |_now| {
            if let Some(inner) = weak.upgrade() {
                flush(&inner);
            }
        }));
        self.inner.borrow_mut().pending = Some(task);
    }

    /// Offsets written so far.
    pub fn applied(&self) -> u64 {
        self.inner.borrow().applied
    }

    /// Frames skipped because the scene could not be measured.
    pub fn skipped(&self) -> u64 {
        self.inner.borrow().skipped
    }

    pub fn has_pending_frame(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }
}

fn flush(inner: &Rc<RefCell<PointerInner>>) {
    let (store, offset) = {
        let mut p = inner.borrow_mut();
        p.pending = None;
        let Some(sample) = p.latest.take() else {
            return;
        };
        let width = p.metrics.rendered_width().unwrap_or(0.0);
        let height = p.metrics.viewport_height();
        match derive_offset(sample, p.scene, width, height) {
            Some(offset) => {
                p.applied += 1;
                (p.offsets.clone(), offset)
            }
            None => {
                p.skipped += 1;
                log::debug!("[pointer] scene not measurable (width {width}), frame skipped");
                return;
            }
        }
    };
    // no borrow held: subscribers run synchronously
    store.set_offset(offset);
}

impl Drop for PointerInner {
    fn drop(&mut self) {
        if let Some(task) = self.pending.take() {
            self.scheduler.cancel(task);
        }
    }
}
