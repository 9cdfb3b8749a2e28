//! Render nodes: stable handles, animatable properties and the write
//! capability the core animates through.

use crate::error::{RenderError, SceneError};
use fnv::{FnvHashMap, FnvHashSet};
use glam::Vec2;
use std::cell::RefCell;
use std::fmt;
use std::fmt::Write as _;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    TranslateX,
    TranslateY,
    Rotation,
    SkewX,
    ScaleY,
    Opacity,
    Hue,
}

impl Property {
    #[inline]
    pub fn neutral(self) -> f32 {
        match self {
            Property::ScaleY | Property::Opacity => 1.0,
            _ => 0.0,
        }
    }
}

/// Full animatable state of one node. Angles are degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
    pub translate: Vec2,
    pub rotation: f32,
    pub skew_x: f32,
    pub scale_y: f32,
    pub opacity: f32,
    pub hue: f32,
    /// Pivot for rotation, skew and scale, in the node's local space.
    pub origin: Vec2,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation: 0.0,
            skew_x: 0.0,
            scale_y: 1.0,
            opacity: 1.0,
            hue: 0.0,
            origin: Vec2::ZERO,
        }
    }
}

impl NodeStyle {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            translate: Vec2::new(x, y),
            ..Self::default()
        }
    }

    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin = Vec2::new(x, y);
        self
    }

    pub fn get(&self, property: Property) -> f32 {
        match property {
            Property::TranslateX => self.translate.x,
            Property::TranslateY => self.translate.y,
            Property::Rotation => self.rotation,
            Property::SkewX => self.skew_x,
            Property::ScaleY => self.scale_y,
            Property::Opacity => self.opacity,
            Property::Hue => self.hue,
        }
    }

    pub fn set(&mut self, property: Property, value: f32) {
        match property {
            Property::TranslateX => self.translate.x = value,
            Property::TranslateY => self.translate.y = value,
            Property::Rotation => self.rotation = value,
            Property::SkewX => self.skew_x = value,
            Property::ScaleY => self.scale_y = value,
            Property::Opacity => self.opacity = value,
            Property::Hue => self.hue = value,
        }
    }

    /// SVG `transform` attribute value for this style.
    pub fn svg_transform(&self) -> String {
        let mut out = format!("translate({},{})", self.translate.x, self.translate.y);
        let pivoted = self.rotation != 0.0 || self.skew_x != 0.0 || self.scale_y != 1.0;
        if !pivoted {
            return out;
        }
        let pivot = self.origin != Vec2::ZERO;
        if pivot {
            _ = write!(out, " translate({},{})", self.origin.x, self.origin.y);
        }
        if self.rotation != 0.0 {
            _ = write!(out, " rotate({})", self.rotation);
        }
        if self.skew_x != 0.0 {
            _ = write!(out, " skewX({})", self.skew_x);
        }
        if self.scale_y != 1.0 {
            _ = write!(out, " scale(1,{})", self.scale_y);
        }
        if pivot {
            _ = write!(out, " translate({},{})", -self.origin.x, -self.origin.y);
        }
        out
    }
}

#[derive(Clone, Debug)]
pub struct NodeInfo {
    pub name: String,
    pub rest: NodeStyle,
}

/// Arena of named render nodes. Ids are dense and never reused.
#[derive(Default, Debug)]
pub struct NodeRegistry {
    nodes: Vec<NodeInfo>,
    by_name: FnvHashMap<String, NodeId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with its rest style. Re-registering a name returns the
    /// existing id and keeps the first rest style.
    pub fn register(&mut self, name: impl Into<String>, rest: NodeStyle) -> NodeId {
        let name = name.into();
        if let Some(id) = self.by_name.get(&name) {
            return *id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.nodes.push(NodeInfo { name, rest });
        id
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<NodeId, SceneError> {
        self.lookup(name)
            .ok_or_else(|| SceneError::UnknownNode(name.to_owned()))
    }

    pub fn info(&self, id: NodeId) -> Option<&NodeInfo> {
        self.nodes.get(id.0 as usize)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.info(id).map(|n| n.name.as_str())
    }

    pub fn rest(&self, id: NodeId) -> NodeStyle {
        self.info(id).map(|n| n.rest).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeInfo)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }
}

/// Where animated values end up.
pub trait RenderTarget {
    fn has_node(&self, node: NodeId) -> bool;
    fn write(&self, node: NodeId, props: &[(Property, f32)]) -> Result<(), RenderError>;
    /// Replace a lazy placeholder with the node's full content.
    fn reveal(&self, node: NodeId) -> Result<(), RenderError>;
}

#[derive(Default)]
struct MemoryInner {
    styles: FnvHashMap<NodeId, NodeStyle>,
    writes: FnvHashMap<NodeId, usize>,
    failing: FnvHashSet<NodeId>,
    revealed: FnvHashSet<NodeId>,
}

/// In-memory render target. Records the latest style and write count per
/// node; nodes must be attached before they accept writes.
#[derive(Default)]
pub struct MemoryTarget {
    inner: RefCell<MemoryInner>,
}

impl MemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach every registered node at its rest style.
    pub fn from_registry(registry: &NodeRegistry) -> Self {
        let target = Self::new();
        for (id, info) in registry.iter() {
            target.attach(id, info.rest);
        }
        target
    }

    pub fn attach(&self, node: NodeId, rest: NodeStyle) {
        self.inner.borrow_mut().styles.insert(node, rest);
    }

    pub fn detach(&self, node: NodeId) {
        self.inner.borrow_mut().styles.remove(&node);
    }

    /// Make every later write to `node` fail.
    pub fn fail_writes(&self, node: NodeId) {
        self.inner.borrow_mut().failing.insert(node);
    }

    pub fn style(&self, node: NodeId) -> Option<NodeStyle> {
        self.inner.borrow().styles.get(&node).copied()
    }

    pub fn write_count(&self, node: NodeId) -> usize {
        self.inner.borrow().writes.get(&node).copied().unwrap_or(0)
    }

    pub fn total_writes(&self) -> usize {
        self.inner.borrow().writes.values().sum()
    }

    pub fn is_revealed(&self, node: NodeId) -> bool {
        self.inner.borrow().revealed.contains(&node)
    }
}

impl RenderTarget for MemoryTarget {
    fn has_node(&self, node: NodeId) -> bool {
        self.inner.borrow().styles.contains_key(&node)
    }

    fn write(&self, node: NodeId, props: &[(Property, f32)]) -> Result<(), RenderError> {
        let mut inner = self.inner.borrow_mut();
        if inner.failing.contains(&node) {
            return Err(RenderError::Rejected {
                node,
                reason: "write refused".into(),
            });
        }
        let style = inner
            .styles
            .get_mut(&node)
            .ok_or(RenderError::Detached(node))?;
        for (property, value) in props {
            style.set(*property, *value);
        }
        *inner.writes.entry(node).or_insert(0) += 1;
        Ok(())
    }

    fn reveal(&self, node: NodeId) -> Result<(), RenderError> {
        let mut inner = self.inner.borrow_mut();
        if !inner.styles.contains_key(&node) {
            return Err(RenderError::Detached(node));
        }
        inner.revealed.insert(node);
        Ok(())
    }
}
