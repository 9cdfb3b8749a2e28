// Host-side tests for the browser scheduler's pending-task bookkeeping.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod tasks {
    include!("../src/tasks.rs");
}

use std::rc::Rc;
use tasks::TaskSlots;

#[test]
fn ids_are_never_reused() {
    let mut slots: TaskSlots<()> = TaskSlots::new();
    let a = slots.alloc();
    slots.insert(a, ());
    assert!(slots.remove(a).is_some());
    let b = slots.alloc();
    assert_ne!(a, b);
}

#[test]
fn cancelling_releases_the_stored_callback() {
    let mut slots = TaskSlots::new();
    let captured = Rc::new(());
    let id = slots.alloc();
    slots.insert(id, Rc::clone(&captured));
    assert_eq!(Rc::strong_count(&captured), 2);

    drop(slots.remove(id));
    assert_eq!(Rc::strong_count(&captured), 1);
    assert!(slots.is_empty());
}

#[test]
fn a_fired_task_cannot_be_cancelled_again() {
    let mut slots = TaskSlots::new();
    let id = slots.alloc();
    slots.insert(id, "frame");
    assert_eq!(slots.remove(id), Some("frame"));
    assert!(!slots.contains(id));
    assert_eq!(slots.remove(id), None);
}

#[test]
fn cancelling_one_task_leaves_the_others() {
    let mut slots = TaskSlots::new();
    let a = slots.alloc();
    let b = slots.alloc();
    slots.insert(a, 'a');
    slots.insert(b, 'b');
    assert_eq!(slots.remove(a), Some('a'));
    assert!(slots.contains(b));
    assert_eq!(slots.len(), 1);
}

#[test]
fn draining_releases_every_pending_callback() {
    let mut slots = TaskSlots::new();
    let captured = Rc::new(());
    for _ in 0..3 {
        let id = slots.alloc();
        slots.insert(id, Rc::clone(&captured));
    }
    assert_eq!(Rc::strong_count(&captured), 4);

    let pending = slots.drain();
    assert_eq!(pending.len(), 3);
    drop(pending);
    assert_eq!(Rc::strong_count(&captured), 1);
    assert!(slots.is_empty());
}
