use crate::constants::*;
use crate::easing::Ease;
use glam::Vec2;

/// What a lazy gate does when the host cannot observe visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VisibilityFallback {
    /// Activate immediately.
    #[default]
    FailOpen,
    /// Stay a placeholder for the element's lifetime.
    FailClosed,
}

#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub scene_size: Vec2,
    pub parallax_enabled: bool,
    pub parallax_damping: f32,
    pub parallax_ease: Ease,
    pub parallax_duration: f64,
    pub large_breakpoint: f32,
    pub clouds_speed: f32,
    pub visibility_fallback: VisibilityFallback,
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            scene_size: Vec2::new(SCENE_WIDTH, SCENE_HEIGHT),
            parallax_enabled: true,
            parallax_damping: PARALLAX_DAMPING,
            parallax_ease: Ease::Power3Out,
            parallax_duration: PARALLAX_EASE_SEC,
            large_breakpoint: LARGE_VIEWPORT_MIN_PX,
            clouds_speed: CLOUDS_SPEED,
            visibility_fallback: VisibilityFallback::FailOpen,
            seed: 42,
        }
    }
}

impl SceneConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
