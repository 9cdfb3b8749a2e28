// Host-side tests for easing curves and the eased setter.

use island_core::{Ease, Interpolator, TweenState};

const EPS: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
}

#[test]
fn eases_hit_both_endpoints() {
    for ease in [Ease::Linear, Ease::Power1InOut, Ease::Power3Out, Ease::SineInOut] {
        assert!(approx(ease.apply(0.0), 0.0), "{ease:?} at 0");
        assert!(approx(ease.apply(1.0), 1.0), "{ease:?} at 1");
    }
}

#[test]
fn eases_clamp_their_input() {
    for ease in [Ease::Linear, Ease::Power1InOut, Ease::Power3Out, Ease::SineInOut] {
        assert!(approx(ease.apply(-0.5), 0.0));
        assert!(approx(ease.apply(1.5), 1.0));
    }
}

#[test]
fn eases_are_monotonic() {
    for ease in [Ease::Linear, Ease::Power1InOut, Ease::Power3Out, Ease::SineInOut] {
        let mut prev = ease.apply(0.0);
        for i in 1..=100 {
            let v = ease.apply(i as f32 / 100.0);
            assert!(v >= prev - EPS, "{ease:?} dips at {i}");
            prev = v;
        }
    }
}

#[test]
fn power3_out_front_loads_motion() {
    assert!(approx(Ease::Power3Out.apply(0.5), 0.9375));
    assert!(approx(Ease::Power1InOut.apply(0.5), 0.5));
    assert!(approx(Ease::SineInOut.apply(0.5), 0.5));
}

#[test]
fn new_interpolator_is_idle_at_its_value() {
    let x = Interpolator::new(3.0, 0.75, Ease::Power3Out);
    assert_eq!(x.value(), 3.0);
    assert_eq!(x.target(), 3.0);
    assert_eq!(x.state(), TweenState::Idle);
}

#[test]
fn retarget_mid_flight_continues_from_current_value() {
    let mut x = Interpolator::new(0.0, 1.0, Ease::Linear);
    assert!(x.retarget(10.0, 0.0));
    assert_eq!(x.advance(0.5), Some(5.0));

    assert!(x.retarget(0.0, 0.5));
    assert_eq!(
        x.state(),
        TweenState::Animating {
            from: 5.0,
            to: 0.0,
            start: 0.5
        }
    );
    assert_eq!(x.advance(1.0), Some(2.5));
    assert_eq!(x.advance(1.5), Some(0.0));
    assert_eq!(x.state(), TweenState::Idle);
    assert_eq!(x.advance(2.0), None);
}

#[test]
fn retarget_to_same_target_is_idempotent() {
    let mut x = Interpolator::new(0.0, 1.0, Ease::Linear);
    assert!(x.retarget(4.0, 0.0));
    assert!(!x.retarget(4.0, 0.3));
    // the curve was not restarted at 0.3
    assert_eq!(x.advance(0.5), Some(2.0));
}

#[test]
fn zero_duration_jumps_straight_to_target() {
    let mut x = Interpolator::new(1.0, 0.0, Ease::Power3Out);
    assert!(x.retarget(7.0, 0.0));
    assert_eq!(x.value(), 7.0);
    assert!(!x.is_animating());
}

#[test]
fn cancelled_interpolator_ignores_later_calls() {
    let mut x = Interpolator::new(1.0, 1.0, Ease::Linear);
    x.retarget(2.0, 0.0);
    x.cancel();
    assert_eq!(x.advance(0.5), None);
    assert!(!x.retarget(3.0, 0.5));
    x.jump(9.0);
    assert_eq!(x.value(), 1.0);
    assert_eq!(x.state(), TweenState::Cancelled);
}

#[test]
fn jump_skips_easing() {
    let mut x = Interpolator::new(0.0, 1.0, Ease::Linear);
    x.retarget(10.0, 0.0);
    x.jump(4.0);
    assert_eq!(x.value(), 4.0);
    assert_eq!(x.target(), 4.0);
    assert_eq!(x.advance(0.5), None);
}
