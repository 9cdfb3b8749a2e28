// Host-side tests for the shared offset and viewport stores.

use glam::Vec2;
use island_core::{Offset, OffsetStore, Viewport, ViewportStore};
use std::cell::RefCell;
use std::rc::Rc;

fn offset(dx: f32, dy: f32) -> Offset {
    Offset {
        pos: Vec2::new(dx + 500.0, dy + 200.0),
        dist: Vec2::new(dx, dy),
        scale: 0.5,
        skew: dx * -0.05,
    }
}

#[test]
fn initial_offset_is_neutral() {
    let store = OffsetStore::new(Offset::default());
    let o = store.get_offset();
    assert_eq!(o.dist, Vec2::ZERO);
    assert_eq!(o.scale, 1.0);
    assert_eq!(o.skew, 0.0);
}

#[test]
fn get_returns_exactly_the_last_write() {
    let store = OffsetStore::new(Offset::default());
    for (dx, dy) in [(1.0, 2.0), (-40.0, 13.5), (0.0, 0.0), (9999.0, -9999.0)] {
        let o = offset(dx, dy);
        store.set_offset(o);
        assert_eq!(store.get_offset(), o);
    }
}

#[test]
fn writes_replace_the_whole_value() {
    let store = OffsetStore::new(Offset::default());
    store.set_offset(offset(10.0, 10.0));
    let partial = Offset {
        dist: Vec2::new(3.0, 4.0),
        ..Offset::default()
    };
    store.set_offset(partial);
    let o = store.get_offset();
    assert_eq!(o.pos, Vec2::ZERO);
    assert_eq!(o.scale, 1.0);
    assert_eq!(o.dist, Vec2::new(3.0, 4.0));
}

#[test]
fn every_write_notifies_every_subscriber_synchronously() {
    let store = OffsetStore::new(Offset::default());
    let seen_a = Rc::new(RefCell::new(Vec::new()));
    let seen_b = Rc::new(RefCell::new(Vec::new()));
    let a = seen_a.clone();
    let b = seen_b.clone();
    let _sa = store.subscribe(move |o| a.borrow_mut().push(o.dist.x));
    let _sb = store.subscribe(move |o| b.borrow_mut().push(o.dist.x));

    store.set_offset(offset(1.0, 0.0));
    assert_eq!(*seen_a.borrow(), vec![1.0]);
    store.set_offset(offset(1.0, 0.0));
    store.set_offset(offset(2.0, 0.0));
    assert_eq!(*seen_a.borrow(), vec![1.0, 1.0, 2.0]);
    assert_eq!(*seen_b.borrow(), *seen_a.borrow());
}

#[test]
fn dropping_subscription_unsubscribes() {
    let store = OffsetStore::new(Offset::default());
    let count = Rc::new(RefCell::new(0));
    let c = count.clone();
    let sub = store.subscribe(move |_| *c.borrow_mut() += 1);
    assert_eq!(store.subscriber_count(), 1);
    store.set_offset(offset(1.0, 1.0));
    drop(sub);
    assert_eq!(store.subscriber_count(), 0);
    store.set_offset(offset(2.0, 2.0));
    assert_eq!(*count.borrow(), 1);

    let c = count.clone();
    let sub = store.subscribe(move |_| *c.borrow_mut() += 1);
    sub.unsubscribe();
    store.set_offset(offset(3.0, 3.0));
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn listener_may_read_the_store_it_listens_to() {
    let store = OffsetStore::new(Offset::default());
    let reader = store.clone();
    let seen = Rc::new(RefCell::new(None));
    let s = seen.clone();
    let _sub = store.subscribe(move |o| {
        *s.borrow_mut() = Some(reader.get_offset() == *o);
    });
    store.set_offset(offset(5.0, 6.0));
    assert_eq!(*seen.borrow(), Some(true));
}

#[test]
fn viewport_breakpoint_is_inclusive() {
    let store = ViewportStore::new(Viewport::new(1199.0, 800.0));
    assert!(!store.get().is_large(1200.0));
    store.set(Viewport::new(1200.0, 800.0));
    assert!(store.get().is_large(1200.0));
}
