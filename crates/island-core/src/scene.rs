//! Scene: mounts elements (binder + ambient loops behind an optional lazy
//! gate) on one stage and owns them until unmount.

use crate::ambient::{AmbientLoop, AmbientSpec};
use crate::lazy::{GateOptions, LazyGate};
use crate::offset::Viewport;
use crate::parallax::{BinderStatus, ParallaxBinder, ParallaxSpec};
use crate::pointer::{PointerSample, PointerSignal, SceneMetrics};
use crate::stage::Stage;
use crate::target::NodeId;
use fnv::FnvHashMap;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub struct ElementSpec {
    pub name: String,
    /// Node the lazy gate observes and reveals.
    pub node: NodeId,
    pub parallax: Option<ParallaxSpec>,
    pub ambient: Vec<AmbientSpec>,
    pub lazy: Option<GateOptions>,
}

impl ElementSpec {
    pub fn new(name: impl Into<String>, node: NodeId) -> Self {
        Self {
            name: name.into(),
            node,
            parallax: None,
            ambient: Vec::new(),
            lazy: None,
        }
    }

    pub fn parallax(mut self, spec: ParallaxSpec) -> Self {
        self.parallax = Some(spec);
        self
    }

    pub fn ambient(mut self, spec: AmbientSpec) -> Self {
        self.ambient.push(spec);
        self
    }

    pub fn lazy(mut self, options: GateOptions) -> Self {
        self.lazy = Some(options);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

/// Live animation state of an active element.
struct Runtime {
    binder: Option<ParallaxBinder>,
    loops: Vec<AmbientLoop>,
}

struct Mounted {
    name: String,
    gate: Option<LazyGate>,
    runtime: Rc<RefCell<Option<Runtime>>>,
}

pub struct Scene {
    stage: Stage,
    pointer: Option<PointerSignal>,
    elements: FnvHashMap<ElementId, Mounted>,
    next_id: u32,
}

impl Scene {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            pointer: None,
            elements: FnvHashMap::default(),
            next_id: 0,
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Start listening to pointer samples measured with `metrics`.
    pub fn attach_pointer(&mut self, metrics: Rc<dyn SceneMetrics>) {
        self.pointer = Some(PointerSignal::attach(&self.stage, metrics));
    }

    pub fn pointer(&self) -> Option<&PointerSignal> {
        self.pointer.as_ref()
    }

    pub fn pointer_moved(&self, sample: PointerSample) {
        if let Some(pointer) = &self.pointer {
            pointer.pointer_moved(sample);
        }
    }

    pub fn resize(&self, viewport: Viewport) {
        if self.stage.viewport.get() != viewport {
            log::debug!("[scene] viewport {}x{}", viewport.width, viewport.height);
            self.stage.viewport.set(viewport);
        }
    }

    pub fn mount(&mut self, spec: ElementSpec) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;

        let runtime: Rc<RefCell<Option<Runtime>>> = Rc::new(RefCell::new(None));
        let gate = spec.lazy.map(|options| {
            LazyGate::observe(
                self.stage.visibility.as_ref(),
                spec.node,
                options,
                self.stage.config.visibility_fallback,
            )
        });
        let name = spec.name.clone();
        match &gate {
            Some(gate) => {
                let slot = Rc::downgrade(&runtime);
                let stage = self.stage.clone();
                gate.on_activate(move || {
                    if let Some(slot) = slot.upgrade() {
                        activate(&stage, &spec, &slot);
                    }
                });
            }
            None => activate(&self.stage, &spec, &runtime),
        }
        self.elements.insert(
            id,
            Mounted {
                name,
                gate,
                runtime,
            },
        );
        id
    }

    pub fn mount_all(&mut self, specs: impl IntoIterator<Item = ElementSpec>) -> Vec<ElementId> {
        specs.into_iter().map(|s| self.mount(s)).collect()
    }

    /// Cancel everything the element owns. Returns false for unknown ids.
    pub fn unmount(&mut self, id: ElementId) -> bool {
        let Some(mounted) = self.elements.remove(&id) else {
            return false;
        };
        log::debug!("[scene] unmount {}", mounted.name);
        let runtime = mounted.runtime.borrow_mut().take();
        drop(runtime);
        drop(mounted.gate);
        true
    }

    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, m)| m.name == name)
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn is_active(&self, id: ElementId) -> bool {
        self.elements
            .get(&id)
            .is_some_and(|m| m.runtime.borrow().is_some())
    }

    pub fn binder_status(&self, id: ElementId) -> Option<BinderStatus> {
        let m = self.elements.get(&id)?;
        let runtime = m.runtime.borrow();
        runtime.as_ref()?.binder.as_ref().map(|b| b.status())
    }

    pub fn running_loops(&self, id: ElementId) -> usize {
        self.elements.get(&id).map_or(0, |m| {
            m.runtime
                .borrow()
                .as_ref()
                .map_or(0, |r| r.loops.iter().filter(|l| l.is_running()).count())
        })
    }

    /// Detach the pointer source and unmount every element.
    pub fn teardown(&mut self) {
        if self.pointer.is_none() && self.elements.is_empty() {
            return;
        }
        self.pointer = None;
        let mut ids: Vec<ElementId> = self.elements.keys().copied().collect();
        ids.sort();
        for id in ids {
            self.unmount(id);
        }
        self.stage.ticker.clear();
        log::info!("[scene] torn down");
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn activate(stage: &Stage, spec: &ElementSpec, slot: &RefCell<Option<Runtime>>) {
    if slot.borrow().is_some() {
        return;
    }
    if spec.lazy.is_some() {
        if let Err(e) = stage.target.reveal(spec.node) {
            log::warn!("[scene] {}: reveal failed: {e}", spec.name);
        }
    }
    let runtime = Runtime {
        binder: spec.parallax.map(|p| ParallaxBinder::bind(stage, p)),
        loops: spec
            .ambient
            .iter()
            .map(|a| AmbientLoop::start(stage, a.clone()))
            .collect(),
    };
    log::debug!(
        "[scene] {} active ({} loops)",
        spec.name,
        runtime.loops.len()
    );
    *slot.borrow_mut() = Some(runtime);
}
