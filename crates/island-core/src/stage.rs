use crate::ambient::RandomSource;
use crate::config::SceneConfig;
use crate::constants::STREAM_MIX;
use crate::lazy::VisibilityApi;
use crate::offset::{Offset, OffsetStore, Viewport, ViewportStore};
use crate::scheduler::{Scheduler, Ticker};
use crate::target::{NodeId, NodeRegistry, RenderTarget};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Everything a scene element needs from its host, shared by every binder,
/// loop and gate of one scene.
#[derive(Clone)]
pub struct Stage {
    pub config: Rc<SceneConfig>,
    pub ticker: Ticker,
    pub offsets: OffsetStore,
    pub viewport: ViewportStore,
    pub target: Rc<dyn RenderTarget>,
    pub visibility: Rc<dyn VisibilityApi>,
    pub registry: Rc<RefCell<NodeRegistry>>,
    streams: Rc<Cell<u64>>,
}

impl Stage {
    pub fn new(
        config: SceneConfig,
        scheduler: Rc<dyn Scheduler>,
        target: Rc<dyn RenderTarget>,
        visibility: Rc<dyn VisibilityApi>,
    ) -> Self {
        Self {
            config: Rc::new(config),
            ticker: Ticker::new(scheduler),
            offsets: OffsetStore::new(Offset::default()),
            viewport: ViewportStore::new(Viewport::default()),
            target,
            visibility,
            registry: Rc::new(RefCell::new(NodeRegistry::new())),
            streams: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_registry(mut self, registry: NodeRegistry) -> Self {
        self.registry = Rc::new(RefCell::new(registry));
        self
    }

    pub fn with_viewport(self, viewport: Viewport) -> Self {
        self.viewport.set(viewport);
        self
    }

    /// A fresh random stream. Streams are derived from the configured seed in
    /// allocation order, so a scene mounted the same way replays identically.
    pub fn next_random(&self) -> Box<dyn RandomSource> {
        let n = self.streams.get();
        self.streams.set(n + 1);
        let seed = self.config.seed ^ n.wrapping_add(1).wrapping_mul(STREAM_MIX);
        Box::new(StdRng::seed_from_u64(seed))
    }

    pub fn node_name(&self, node: NodeId) -> String {
        self.registry
            .borrow()
            .name(node)
            .map(str::to_owned)
            .unwrap_or_else(|| node.to_string())
    }
}
