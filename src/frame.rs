use island_core::{FrameCallback, Scheduler, TaskId, TimerCallback};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::tasks::TaskSlots;

/// A scheduled browser task and the closure JS will call. Dropping it
/// frees the closure.
enum Task {
    Frame(i32, Closure<dyn FnMut(f64)>),
    Timer(i32, Closure<dyn FnMut()>),
}

/// Scheduler over `requestAnimationFrame` and `setTimeout`. Times are
/// `performance.now()` in seconds, the same timebase rAF reports.
pub struct WebScheduler {
    window: web::Window,
    performance: Option<web::Performance>,
    live: Rc<RefCell<TaskSlots<Task>>>,
}

impl WebScheduler {
    pub fn new() -> anyhow::Result<Self> {
        let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
        let performance = window.performance();
        if performance.is_none() {
            log::warn!("[frame] no performance clock; timestamps fall back to Date.now()");
        }
        Ok(Self {
            window,
            performance,
            live: Rc::new(RefCell::new(TaskSlots::new())),
        })
    }

    fn release(&self, task: Task) {
        match task {
            Task::Frame(h, _) => {
                _ = self.window.cancel_animation_frame(h);
            }
            Task::Timer(h, _) => self.window.clear_timeout_with_handle(h),
        }
    }
}

impl Scheduler for WebScheduler {
    fn now(&self) -> f64 {
        match &self.performance {
            Some(p) => p.now() / 1000.0,
            None => js_sys::Date::now() / 1000.0,
        }
    }

    fn request_frame(&self, callback: FrameCallback) -> TaskId {
        let id = self.live.borrow_mut().alloc();
        let live = self.live.clone();
        let js: Closure<dyn FnMut(f64)> = Closure::once(move |ts: f64| {
            // The slot holds this closure; wasm-bindgen frees it after the call returns.
            let fired = live.borrow_mut().remove(id);
            if fired.is_some() {
                callback(ts / 1000.0);
            }
        });
        match self.window.request_animation_frame(js.as_ref().unchecked_ref()) {
            Ok(h) => self.live.borrow_mut().insert(id, Task::Frame(h, js)),
            Err(e) => log::error!("[frame] requestAnimationFrame failed: {:?}", e),
        }
        TaskId(id)
    }

    fn set_timer(&self, delay: Duration, callback: TimerCallback) -> TaskId {
        let id = self.live.borrow_mut().alloc();
        let live = self.live.clone();
        let js: Closure<dyn FnMut()> = Closure::once(move || {
            let fired = live.borrow_mut().remove(id);
            if fired.is_some() {
                callback();
            }
        });
        let ms = delay.as_millis().min(i32::MAX as u128) as i32;
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(js.as_ref().unchecked_ref(), ms)
        {
            Ok(h) => self.live.borrow_mut().insert(id, Task::Timer(h, js)),
            Err(e) => log::error!("[frame] setTimeout failed: {:?}", e),
        }
        TaskId(id)
    }

    fn cancel(&self, task: TaskId) {
        let removed = self.live.borrow_mut().remove(task.0);
        if let Some(task) = removed {
            self.release(task);
        }
    }
}

impl Drop for WebScheduler {
    fn drop(&mut self) {
        let pending = self.live.borrow_mut().drain();
        if !pending.is_empty() {
            log::debug!("[frame] cancelling {} pending task(s)", pending.len());
        }
        for task in pending {
            self.release(task);
        }
    }
}
