use crate::constants::root_margin_css;
use crate::dom::DomTarget;
use island_core::{
    GateOptions, NodeId, VisibilityApi, VisibilityCallback, VisibilityError, VisibilityObserver,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Visibility capability over `IntersectionObserver`.
pub struct DomVisibility {
    target: Rc<DomTarget>,
}

impl DomVisibility {
    pub fn new(target: Rc<DomTarget>) -> Self {
        Self { target }
    }
}

type Watched = Rc<RefCell<Vec<(web::Element, NodeId)>>>;

impl VisibilityApi for DomVisibility {
    fn create(
        &self,
        options: &GateOptions,
        callback: VisibilityCallback,
    ) -> Result<Box<dyn VisibilityObserver>, VisibilityError> {
        let watched: Watched = Rc::new(RefCell::new(Vec::new()));
        let lookup = watched.clone();
        let on_entries = Closure::wrap(Box::new(move |entries: js_sys::Array| {
            for entry in entries.iter() {
                let entry: web::IntersectionObserverEntry = entry.unchecked_into();
                let el = entry.target();
                let node = lookup
                    .borrow()
                    .iter()
                    .find(|(e, _)| *e == el)
                    .map(|(_, n)| *n);
                if let Some(node) = node {
                    callback(node, entry.is_intersecting());
                }
            }
        }) as Box<dyn FnMut(js_sys::Array)>);
        // owned by the JS side from here on; the observer may be dropped from
        // inside this very callback
        let on_entries = on_entries.into_js_value();

        let init = web::IntersectionObserverInit::new();
        init.set_root_margin(&root_margin_css(options.root_margin_px));
        init.set_threshold(&JsValue::from_f64(options.threshold as f64));
        let observer =
            web::IntersectionObserver::new_with_options(on_entries.unchecked_ref(), &init)
                .map_err(|e| VisibilityError::Unavailable(format!("{:?}", e)))?;
        Ok(Box::new(DomObserver {
            observer,
            target: self.target.clone(),
            watched,
        }))
    }
}

struct DomObserver {
    observer: web::IntersectionObserver,
    target: Rc<DomTarget>,
    watched: Watched,
}

impl VisibilityObserver for DomObserver {
    fn observe(&self, node: NodeId) {
        match self.target.element(node) {
            Some(el) => {
                self.watched.borrow_mut().push((el.clone(), node));
                self.observer.observe(el);
            }
            None => log::warn!("[lazy] {node}: no element to observe"),
        }
    }

    fn unobserve(&self, node: NodeId) {
        if let Some(el) = self.target.element(node) {
            self.observer.unobserve(el);
        }
    }

    fn disconnect(&self) {
        self.observer.disconnect();
    }
}
