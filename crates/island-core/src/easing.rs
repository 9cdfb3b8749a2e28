use std::f32::consts::PI;

/// Easing curves used by the scene. Names follow the usual power/sine naming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    Power1InOut,
    #[default]
    Power3Out,
    SineInOut,
}

impl Ease {
    /// Map linear progress `t` in \[0, 1\] to eased progress. Input is clamped.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
            Ease::Power3Out => {
                let u = 1.0 - t;
                1.0 - u * u * u * u
            }
            Ease::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}
