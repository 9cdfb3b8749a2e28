#![cfg(target_arch = "wasm32")]
use island_core::{composition, NodeRegistry, Scene, SceneConfig, Stage};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod constants;
mod dom;
mod events;
mod frame;
mod tasks;
mod visibility;

use constants::SCENE_ELEMENT_ID;

struct App {
    scene: Scene,
    _listeners: events::SceneListeners,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Run `f` against the mounted scene, if any.
pub(crate) fn with_scene(f: impl FnOnce(&Scene)) {
    APP.with(|app| {
        if let Some(app) = app.borrow().as_ref() {
            f(&app.scene);
        }
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("island-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;
    let scene_el = document
        .get_element_by_id(SCENE_ELEMENT_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", SCENE_ELEMENT_ID))?;

    let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let config = SceneConfig::default().with_seed(seed);
    let mut registry = NodeRegistry::new();
    let elements = composition::island(&mut registry, &config);

    let target = Rc::new(dom::DomTarget::resolve(&document, &registry));
    let visibility = Rc::new(visibility::DomVisibility::new(target.clone()));
    let scheduler = Rc::new(frame::WebScheduler::new()?);
    let stage = Stage::new(config, scheduler, target, visibility)
        .with_registry(registry)
        .with_viewport(dom::viewport());

    let mut scene = Scene::new(stage);
    scene.attach_pointer(Rc::new(dom::DomMetrics::new(scene_el)));
    let mounted = scene.mount_all(elements);
    log::info!("[scene] mounted {} elements", mounted.len());

    let listeners = events::SceneListeners::attach(window)?;
    let previous = APP.with(|app| {
        app.borrow_mut().replace(App {
            scene,
            _listeners: listeners,
        })
    });
    drop(previous);
    Ok(())
}

/// Tear the scene down: listeners removed, every loop and binder cancelled.
#[wasm_bindgen]
pub fn stop() {
    let app = APP.with(|app| app.borrow_mut().take());
    if app.is_some() {
        drop(app);
        log::info!("island-web stopped");
    }
}
