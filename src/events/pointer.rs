use crate::dom;
use island_core::PointerSample;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Window listeners feeding the running scene. Dropping removes them.
pub struct SceneListeners {
    window: web::Window,
    pointermove: Closure<dyn FnMut(web::PointerEvent)>,
    resize: Closure<dyn FnMut()>,
}

impl SceneListeners {
    pub fn attach(window: web::Window) -> anyhow::Result<Self> {
        let pointermove = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let sample = PointerSample::new(ev.client_x() as f32, ev.client_y() as f32);
            crate::with_scene(|scene| scene.pointer_moved(sample));
        }) as Box<dyn FnMut(_)>);
        let resize = Closure::wrap(Box::new(move || {
            let viewport = dom::viewport();
            crate::with_scene(|scene| scene.resize(viewport));
        }) as Box<dyn FnMut()>);

        // built first so a failed registration below is undone by Drop
        let listeners = Self {
            window,
            pointermove,
            resize,
        };
        listeners
            .window
            .add_event_listener_with_callback(
                "pointermove",
                listeners.pointermove.as_ref().unchecked_ref(),
            )
            .map_err(|e| anyhow::anyhow!("pointermove listener: {:?}", e))?;
        listeners
            .window
            .add_event_listener_with_callback("resize", listeners.resize.as_ref().unchecked_ref())
            .map_err(|e| anyhow::anyhow!("resize listener: {:?}", e))?;
        log::info!("[pointer] listening");
        Ok(listeners)
    }
}

impl Drop for SceneListeners {
    fn drop(&mut self) {
        _ = self.window.remove_event_listener_with_callback(
            "pointermove",
            self.pointermove.as_ref().unchecked_ref(),
        );
        _ = self
            .window
            .remove_event_listener_with_callback("resize", self.resize.as_ref().unchecked_ref());
        log::info!("[pointer] detached");
    }
}
