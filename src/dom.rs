use crate::constants::*;
use fnv::FnvHashMap;
use island_core::{
    NodeId, NodeRegistry, NodeStyle, Property, RenderError, RenderTarget, SceneMetrics, Viewport,
};
use std::cell::RefCell;
use web_sys as web;

pub fn viewport() -> Viewport {
    let size = web::window().and_then(|w| {
        let width = w.inner_width().ok()?.as_f64()?;
        let height = w.inner_height().ok()?.as_f64()?;
        Some(Viewport::new(width as f32, height as f32))
    });
    size.unwrap_or(Viewport::new(FALLBACK_VIEWPORT_W, FALLBACK_VIEWPORT_H))
}

/// SVG render target: each registry node maps to the element with the same id.
pub struct DomTarget {
    elements: FnvHashMap<NodeId, web::Element>,
    styles: RefCell<FnvHashMap<NodeId, NodeStyle>>,
}

impl DomTarget {
    pub fn resolve(document: &web::Document, registry: &NodeRegistry) -> Self {
        let mut elements = FnvHashMap::default();
        let mut styles = FnvHashMap::default();
        for (id, info) in registry.iter() {
            match document.get_element_by_id(&info.name) {
                Some(el) => {
                    elements.insert(id, el);
                    styles.insert(id, info.rest);
                }
                None => log::debug!("[scene] no element #{}", info.name),
            }
        }
        log::info!(
            "[scene] resolved {}/{} render nodes",
            elements.len(),
            registry.len()
        );
        Self {
            elements,
            styles: RefCell::new(styles),
        }
    }

    pub fn element(&self, node: NodeId) -> Option<&web::Element> {
        self.elements.get(&node)
    }
}

fn rejected(node: NodeId, e: wasm_bindgen::JsValue) -> RenderError {
    RenderError::Rejected {
        node,
        reason: format!("{:?}", e),
    }
}

impl RenderTarget for DomTarget {
    fn has_node(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|el| el.is_connected())
    }

    fn write(&self, node: NodeId, props: &[(Property, f32)]) -> Result<(), RenderError> {
        let el = self
            .element(node)
            .filter(|el| el.is_connected())
            .ok_or(RenderError::Detached(node))?;
        let mut styles = self.styles.borrow_mut();
        let style = styles.entry(node).or_default();
        let mut transform = false;
        for &(property, value) in props {
            style.set(property, value);
            match property {
                Property::Opacity => el
                    .set_attribute(ATTR_OPACITY, &format_attr(value))
                    .map_err(|e| rejected(node, e))?,
                Property::Hue => el
                    .set_attribute(ATTR_HUE_VALUES, &format_attr(value))
                    .map_err(|e| rejected(node, e))?,
                _ => transform = true,
            }
        }
        if transform {
            el.set_attribute(ATTR_TRANSFORM, &style.svg_transform())
                .map_err(|e| rejected(node, e))?;
        }
        Ok(())
    }

    fn reveal(&self, node: NodeId) -> Result<(), RenderError> {
        let el = self.element(node).ok_or(RenderError::Detached(node))?;
        el.class_list()
            .remove_1(LAZY_PLACEHOLDER_CLASS)
            .map_err(|e| rejected(node, e))
    }
}

/// Live measurements of the scene element.
pub struct DomMetrics {
    scene: web::Element,
}

impl DomMetrics {
    pub fn new(scene: web::Element) -> Self {
        Self { scene }
    }
}

impl SceneMetrics for DomMetrics {
    fn rendered_width(&self) -> Option<f32> {
        let width = self.scene.get_bounding_client_rect().width() as f32;
        (width > 0.0).then_some(width)
    }

    fn viewport_height(&self) -> f32 {
        web::window()
            .and_then(|w| w.inner_height().ok())
            .and_then(|h| h.as_f64())
            .map_or(0.0, |h| h as f32)
    }
}
