use crate::easing::Ease;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenState {
    Idle,
    Animating { from: f32, to: f32, start: f64 },
    Cancelled,
}

/// One eased setter: interpolates a live value toward a target over a fixed
/// duration. Retargeting mid-flight restarts the curve from the current value,
/// never from zero.
#[derive(Clone, Debug)]
pub struct Interpolator {
    value: f32,
    target: f32,
    duration: f64,
    ease: Ease,
    state: TweenState,
}

impl Interpolator {
    pub fn new(value: f32, duration: f64, ease: Ease) -> Self {
        Self {
            value,
            target: value,
            duration,
            ease,
            state: TweenState::Idle,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn state(&self) -> TweenState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, TweenState::Animating { .. })
    }

    /// Returns true if the call started or changed an interpolation.
    pub fn retarget(&mut self, to: f32, now: f64) -> bool {
        match self.state {
            TweenState::Cancelled => false,
            _ if to == self.target => false,
            _ => {
                self.target = to;
                if self.duration <= 0.0 {
                    self.value = to;
                    self.state = TweenState::Idle;
                } else {
                    self.state = TweenState::Animating {
                        from: self.value,
                        to,
                        start: now,
                    };
                }
                true
            }
        }
    }

    /// Step to `now`. Returns the new value when it changed.
    pub fn advance(&mut self, now: f64) -> Option<f32> {
        let TweenState::Animating { from, to, start } = self.state else {
            return None;
        };
        let t = ((now - start) / self.duration).clamp(0.0, 1.0);
        let next = if t >= 1.0 {
            self.state = TweenState::Idle;
            to
        } else {
            from + (to - from) * self.ease.apply(t as f32)
        };
        if next == self.value {
            return None;
        }
        self.value = next;
        Some(next)
    }

    /// Set value and target without easing.
    pub fn jump(&mut self, value: f32) {
        if self.state == TweenState::Cancelled {
            return;
        }
        self.value = value;
        self.target = value;
        self.state = TweenState::Idle;
    }

    /// Stop for good; later calls are ignored.
    pub fn cancel(&mut self) {
        self.state = TweenState::Cancelled;
    }
}

