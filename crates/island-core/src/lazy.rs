//! One-shot visibility latch.
//!
//! A gate starts inactive and flips to active the first time its node
//! intersects the (margin-expanded) viewport. The observer is disconnected at
//! that moment; leaving the viewport afterwards changes nothing.

use crate::config::VisibilityFallback;
use crate::constants::{LAZY_ROOT_MARGIN_PX, LAZY_THRESHOLD};
use crate::error::VisibilityError;
use crate::target::NodeId;
use fnv::{FnvHashMap, FnvHashSet};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateOptions {
    /// Pre-trigger margin around the viewport.
    pub root_margin_px: f32,
    pub threshold: f32,
    /// When false the gate is active from the start.
    pub enabled: bool,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            root_margin_px: LAZY_ROOT_MARGIN_PX,
            threshold: LAZY_THRESHOLD,
            enabled: true,
        }
    }
}

impl GateOptions {
    pub fn with_margin(mut self, px: f32) -> Self {
        self.root_margin_px = px;
        self
    }

    pub fn eager() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Called with `(node, is_intersecting)` for every observed change.
pub type VisibilityCallback = Rc<dyn Fn(NodeId, bool)>;

pub trait VisibilityObserver {
    fn observe(&self, node: NodeId);
    fn unobserve(&self, node: NodeId);
    fn disconnect(&self);
}

/// Host intersection-detection capability.
pub trait VisibilityApi {
    fn create(
        &self,
        options: &GateOptions,
        callback: VisibilityCallback,
    ) -> Result<Box<dyn VisibilityObserver>, VisibilityError>;
}

struct GateInner {
    node: NodeId,
    active: bool,
    observer: Option<Box<dyn VisibilityObserver>>,
    on_active: Vec<Box<dyn FnOnce()>>,
}

pub struct LazyGate {
    inner: Rc<RefCell<GateInner>>,
}

impl LazyGate {
    pub fn observe(
        api: &dyn VisibilityApi,
        node: NodeId,
        options: GateOptions,
        fallback: VisibilityFallback,
    ) -> Self {
        let inner = Rc::new(RefCell::new(GateInner {
            node,
            active: !options.enabled,
            observer: None,
            on_active: Vec::new(),
        }));
        if !options.enabled {
            return Self { inner };
        }

        let weak: Weak<RefCell<GateInner>> = Rc::downgrade(&inner);
        let callback: VisibilityCallback = Rc::new(move |seen: NodeId, intersecting: bool| {
            if !intersecting {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                if inner.borrow().node == seen {
                    latch(&inner);
                }
            }
        });

        match api.create(&options, callback) {
            Ok(observer) => {
                // a host may report synchronously from observe()
                observer.observe(node);
                let mut gate = inner.borrow_mut();
                if gate.active {
                    drop(gate);
                    observer.disconnect();
                } else {
                    gate.observer = Some(observer);
                }
            }
            Err(e) => match fallback {
                VisibilityFallback::FailOpen => {
                    log::warn!("[lazy] {node}: {e}; activating eagerly");
                    inner.borrow_mut().active = true;
                }
                VisibilityFallback::FailClosed => {
                    log::warn!("[lazy] {node}: {e}; content stays hidden");
                }
            },
        }
        Self { inner }
    }

    pub fn is_active(&self) -> bool {
        self.inner.borrow().active
    }

    pub fn is_observing(&self) -> bool {
        self.inner.borrow().observer.is_some()
    }

    /// Run `f` once the gate activates, or right away if it already has.
    pub fn on_activate(&self, f: impl FnOnce() + 'static) {
        let mut inner = self.inner.borrow_mut();
        if inner.active {
            drop(inner);
            f();
        } else {
            inner.on_active.push(Box::new(f));
        }
    }
}

fn latch(inner: &Rc<RefCell<GateInner>>) {
    let (node, observer, callbacks) = {
        let mut gate = inner.borrow_mut();
        if gate.active {
            return;
        }
        gate.active = true;
        log::debug!("[lazy] {} active", gate.node);
        (gate.node, gate.observer.take(), std::mem::take(&mut gate.on_active))
    };
    if let Some(observer) = observer {
        observer.unobserve(node);
        observer.disconnect();
    }
    for f in callbacks {
        f();
    }
}

impl Drop for GateInner {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

struct Entry {
    options: GateOptions,
    callback: VisibilityCallback,
    nodes: FnvHashSet<NodeId>,
}

#[derive(Default)]
struct ManualInner {
    next_id: u64,
    failing: bool,
    observers: FnvHashMap<u64, Entry>,
}

/// Scriptable visibility source: intersection changes happen only when
/// [`ManualVisibility::set_intersecting`] is called.
#[derive(Clone, Default)]
pub struct ManualVisibility {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make observer construction fail from now on.
    pub fn fail_construction(&self, failing: bool) {
        self.inner.borrow_mut().failing = failing;
    }

    pub fn set_intersecting(&self, node: NodeId, intersecting: bool) {
        let callbacks: Vec<VisibilityCallback> = self
            .inner
            .borrow()
            .observers
            .values()
            .filter(|e| e.nodes.contains(&node))
            .map(|e| e.callback.clone())
            .collect();
        for cb in callbacks {
            cb(node, intersecting);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.inner
            .borrow()
            .observers
            .values()
            .any(|e| e.nodes.contains(&node))
    }

    /// Options of the observer watching `node`, if any.
    pub fn options_for(&self, node: NodeId) -> Option<GateOptions> {
        self.inner
            .borrow()
            .observers
            .values()
            .find(|e| e.nodes.contains(&node))
            .map(|e| e.options)
    }
}

impl VisibilityApi for ManualVisibility {
    fn create(
        &self,
        options: &GateOptions,
        callback: VisibilityCallback,
    ) -> Result<Box<dyn VisibilityObserver>, VisibilityError> {
        let mut inner = self.inner.borrow_mut();
        if inner.failing {
            return Err(VisibilityError::Unavailable(
                "observer construction refused".into(),
            ));
        }
        let id = inner.next_id;
        inner.next_id += 1;
        inner.observers.insert(
            id,
            Entry {
                options: *options,
                callback,
                nodes: FnvHashSet::default(),
            },
        );
        Ok(Box::new(ManualObserver {
            id,
            registry: Rc::downgrade(&self.inner),
        }))
    }
}

struct ManualObserver {
    id: u64,
    registry: Weak<RefCell<ManualInner>>,
}

impl VisibilityObserver for ManualObserver {
    fn observe(&self, node: NodeId) {
        if let Some(reg) = self.registry.upgrade() {
            if let Some(e) = reg.borrow_mut().observers.get_mut(&self.id) {
                e.nodes.insert(node);
            }
        }
    }

    fn unobserve(&self, node: NodeId) {
        if let Some(reg) = self.registry.upgrade() {
            if let Some(e) = reg.borrow_mut().observers.get_mut(&self.id) {
                e.nodes.remove(&node);
            }
        }
    }

    fn disconnect(&self) {
        if let Some(reg) = self.registry.upgrade() {
            reg.borrow_mut().observers.remove(&self.id);
        }
    }
}
