//! Parallax binder: turns the shared offset plus a per-element depth modifier
//! into an eased transform on one render node.

use crate::constants::{NEUTRAL_SCALE, NEUTRAL_SKEW};
use crate::offset::Subscription;
use crate::scheduler::Animate;
use crate::stage::Stage;
use crate::target::{NodeId, Property};
use crate::tween::Interpolator;
use glam::Vec2;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// How strongly an element travels with the offset. Larger moves further.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepthModifier {
    pub x: f32,
    pub y: f32,
}

impl DepthModifier {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn uniform(v: f32) -> Self {
        Self { x: v, y: v }
    }

    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Which parts of the transform follow the offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Channels {
    pub pos_x: bool,
    pub pos_y: bool,
    pub scale: bool,
    pub skew: bool,
}

impl Default for Channels {
    fn default() -> Self {
        Self::position()
    }
}

impl Channels {
    pub const fn position() -> Self {
        Self {
            pos_x: true,
            pos_y: true,
            scale: false,
            skew: false,
        }
    }

    pub const fn x_only() -> Self {
        Self {
            pos_y: false,
            ..Self::position()
        }
    }

    pub const fn y_only() -> Self {
        Self {
            pos_x: false,
            ..Self::position()
        }
    }

    pub const fn with_scale(mut self) -> Self {
        self.scale = true;
        self
    }

    pub const fn with_skew(mut self) -> Self {
        self.skew = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallaxSpec {
    pub node: NodeId,
    pub base: Vec2,
    pub modifier: DepthModifier,
    pub channels: Channels,
}

impl ParallaxSpec {
    pub fn new(node: NodeId, base: Vec2, modifier: DepthModifier) -> Self {
        Self {
            node,
            base,
            modifier,
            channels: Channels::position(),
        }
    }

    pub fn channels(mut self, channels: Channels) -> Self {
        self.channels = channels;
        self
    }
}

/// `base - dist * modifier / damping`
#[inline]
pub fn parallax_target(base: Vec2, dist: Vec2, modifier: DepthModifier, damping: f32) -> Vec2 {
    base - dist * modifier.as_vec2() / damping
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub pos: Vec2,
    pub scale: f32,
    pub skew: f32,
}

/// The four eased setters of one bound element.
struct ChannelSet {
    x: Interpolator,
    y: Interpolator,
    skew: Interpolator,
    scale: Interpolator,
}

impl ChannelSet {
    fn is_animating(&self) -> bool {
        self.x.is_animating()
            || self.y.is_animating()
            || self.skew.is_animating()
            || self.scale.is_animating()
    }

    fn cancel(&mut self) {
        self.x.cancel();
        self.y.cancel();
        self.skew.cancel();
        self.scale.cancel();
    }

    fn values(&self) -> Pose {
        Pose {
            pos: Vec2::new(self.x.value(), self.y.value()),
            scale: self.scale.value(),
            skew: self.skew.value(),
        }
    }

    fn targets(&self) -> Pose {
        Pose {
            pos: Vec2::new(self.x.target(), self.y.target()),
            scale: self.scale.target(),
            skew: self.skew.target(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinderStatus {
    /// Parallax is switched off globally.
    Inert,
    /// The node was missing at bind time; see [`ParallaxBinder::retry`].
    Dormant,
    Active,
    /// A render write failed. Never retried.
    Disabled,
    Disposed,
}

struct BinderCore {
    stage: Stage,
    spec: ParallaxSpec,
    name: String,
    channels: RefCell<ChannelSet>,
    status: Cell<BinderStatus>,
    subscriptions: RefCell<Vec<Subscription>>,
    me: Weak<BinderCore>,
}

pub struct ParallaxBinder {
    core: Rc<BinderCore>,
}

impl ParallaxBinder {
    pub fn bind(stage: &Stage, spec: ParallaxSpec) -> Self {
        let cfg = &stage.config;
        let (duration, ease) = (cfg.parallax_duration, cfg.parallax_ease);
        let core = Rc::new_cyclic(|me| BinderCore {
            stage: stage.clone(),
            spec,
            name: stage.node_name(spec.node),
            channels: RefCell::new(ChannelSet {
                x: Interpolator::new(spec.base.x, duration, ease),
                y: Interpolator::new(spec.base.y, duration, ease),
                skew: Interpolator::new(NEUTRAL_SKEW, duration, ease),
                scale: Interpolator::new(NEUTRAL_SCALE, duration, ease),
            }),
            status: Cell::new(BinderStatus::Dormant),
            subscriptions: RefCell::new(Vec::new()),
            me: me.clone(),
        });
        if !cfg.parallax_enabled {
            core.status.set(BinderStatus::Inert);
        } else {
            core.activate();
        }
        Self { core }
    }

    /// Bind again after the node was missing. No-op in any other state.
    pub fn retry(&self) -> BinderStatus {
        if self.core.status.get() == BinderStatus::Dormant {
            self.core.activate();
        }
        self.core.status.get()
    }

    pub fn status(&self) -> BinderStatus {
        self.core.status.get()
    }

    pub fn node(&self) -> NodeId {
        self.core.spec.node
    }

    pub fn targets(&self) -> Pose {
        self.core.channels.borrow().targets()
    }

    pub fn values(&self) -> Pose {
        self.core.channels.borrow().values()
    }

    pub fn is_animating(&self) -> bool {
        self.core.channels.borrow().is_animating()
    }
}

impl Drop for ParallaxBinder {
    fn drop(&mut self) {
        self.core.dispose();
    }
}

impl BinderCore {
    fn activate(&self) {
        let node = self.spec.node;
        if !self.stage.target.has_node(node) {
            log::warn!("[parallax] {}: render node missing, binder dormant", self.name);
            return;
        }
        let rest = self.initial_props();
        if let Err(e) = self.stage.target.write(node, &rest) {
            log::error!("[parallax] {}: initial write failed: {e}", self.name);
            self.disable();
            return;
        }
        self.status.set(BinderStatus::Active);

        let on_offset = self.me.clone();
        let on_resize = self.me.clone();
        let mut subs = self.subscriptions.borrow_mut();
        subs.push(self.stage.offsets.subscribe(move |_| {
            if let Some(core) = on_offset.upgrade() {
                core.retarget();
            }
        }));
        subs.push(self.stage.viewport.subscribe(move |_| {
            if let Some(core) = on_resize.upgrade() {
                core.retarget();
            }
        }));
        drop(subs);
        self.retarget();
    }

    fn initial_props(&self) -> SmallVec<[(Property, f32); 4]> {
        let c = self.spec.channels;
        let mut props = SmallVec::new();
        if c.pos_x {
            props.push((Property::TranslateX, self.spec.base.x));
        }
        if c.pos_y {
            props.push((Property::TranslateY, self.spec.base.y));
        }
        if c.skew {
            props.push((Property::SkewX, NEUTRAL_SKEW));
        }
        if c.scale {
            props.push((Property::ScaleY, NEUTRAL_SCALE));
        }
        props
    }

    /// Recompute targets from the current offset and viewport.
    fn retarget(&self) {
        if self.status.get() != BinderStatus::Active {
            return;
        }
        let cfg = &self.stage.config;
        let offset = self.stage.offsets.get_offset();
        let large = self.stage.viewport.get().is_large(cfg.large_breakpoint);
        let (pos, scale, skew) = if large {
            let pos = parallax_target(
                self.spec.base,
                offset.dist,
                self.spec.modifier,
                cfg.parallax_damping,
            );
            (pos, offset.scale, offset.skew)
        } else {
            (self.spec.base, NEUTRAL_SCALE, NEUTRAL_SKEW)
        };

        let now = self.stage.ticker.now();
        let c = self.spec.channels;
        let mut moved = false;
        {
            let mut ch = self.channels.borrow_mut();
            if c.pos_x {
                moved |= ch.x.retarget(pos.x, now);
            }
            if c.pos_y {
                moved |= ch.y.retarget(pos.y, now);
            }
            if c.skew {
                moved |= ch.skew.retarget(skew, now);
            }
            if c.scale {
                moved |= ch.scale.retarget(scale, now);
            }
        }
        if moved {
            let me: Weak<dyn Animate> = self.me.clone();
            self.stage.ticker.wake(me);
        }
    }

    fn disable(&self) {
        self.status.set(BinderStatus::Disabled);
        self.channels.borrow_mut().cancel();
        self.subscriptions.borrow_mut().clear();
    }

    fn dispose(&self) {
        self.status.set(BinderStatus::Disposed);
        self.channels.borrow_mut().cancel();
        // unsubscribe outside the borrow
        let subs = std::mem::take(&mut *self.subscriptions.borrow_mut());
        drop(subs);
    }
}

impl Animate for BinderCore {
    fn advance(&self, now: f64) -> bool {
        if self.status.get() != BinderStatus::Active {
            return false;
        }
        let mut props: SmallVec<[(Property, f32); 4]> = SmallVec::new();
        let animating = {
            let mut ch = self.channels.borrow_mut();
            if let Some(v) = ch.x.advance(now) {
                props.push((Property::TranslateX, v));
            }
            if let Some(v) = ch.y.advance(now) {
                props.push((Property::TranslateY, v));
            }
            if let Some(v) = ch.skew.advance(now) {
                props.push((Property::SkewX, v));
            }
            if let Some(v) = ch.scale.advance(now) {
                props.push((Property::ScaleY, v));
            }
            ch.is_animating()
        };
        if props.is_empty() {
            return animating;
        }
        match self.stage.target.write(self.spec.node, &props) {
            Ok(()) => animating,
            Err(e) => {
                log::error!("[parallax] {}: {e}; binder disabled", self.name);
                self.disable();
                false
            }
        }
    }
}
