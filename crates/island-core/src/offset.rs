//! Shared pointer offset and viewport state.
//!
//! A [`Store`] holds one value and synchronously notifies subscribers on every
//! write. Writes always replace the whole value; there is no merging. The scene
//! uses one store for the pointer-derived [`Offset`] (single writer: the
//! pointer signal) and one for the [`Viewport`] size.

use glam::Vec2;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Pointer-derived parallax signal.
///
/// `pos` is the raw pointer position in viewport pixels, `dist` the pointer
/// displacement from the scene center in scene units. `scale` is the vertical
/// pointer fraction and `skew` the horizontal displacement mapped to degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Offset {
    pub pos: Vec2,
    pub dist: Vec2,
    pub scale: f32,
    pub skew: f32,
}

impl Default for Offset {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            dist: Vec2::ZERO,
            scale: 1.0,
            skew: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_large(&self, breakpoint: f32) -> bool {
        self.width >= breakpoint
    }
}

type Listener<T> = Rc<dyn Fn(&T)>;

struct StoreInner<T> {
    value: T,
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

/// Single-value store with synchronous change notification.
pub struct Store<T> {
    inner: Rc<RefCell<StoreInner<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                value,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replace the value and notify every current subscriber.
    ///
    /// No borrow is held while listeners run, so a listener may read the store,
    /// subscribe or unsubscribe. A listener removed by an earlier listener in
    /// the same pass is not called.
    pub fn set(&self, value: T) {
        let ids: Vec<u64> = {
            let mut inner = self.inner.borrow_mut();
            inner.value = value.clone();
            inner.listeners.iter().map(|(id, _)| *id).collect()
        };
        for id in ids {
            let listener = self
                .inner
                .borrow()
                .listeners
                .iter()
                .find(|(lid, _)| *lid == id)
                .map(|(_, f)| f.clone());
            if let Some(f) = listener {
                f(&value);
            }
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, Rc::new(listener)));
            id
        };
        let weak: Weak<RefCell<StoreInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

pub type OffsetStore = Store<Offset>;
pub type ViewportStore = Store<Viewport>;

impl Store<Offset> {
    pub fn get_offset(&self) -> Offset {
        self.get()
    }

    pub fn set_offset(&self, offset: Offset) {
        self.set(offset)
    }
}

/// Listener registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}
