// Shared scene and motion tuning constants used by both web and native frontends.

// Scene coordinate space (SVG viewBox)
pub const SCENE_WIDTH: f32 = 1000.0;
pub const SCENE_HEIGHT: f32 = 400.0;

// Parallax
pub const PARALLAX_DAMPING: f32 = 300.0; // divides dist * modifier into scene units
pub const PARALLAX_EASE_SEC: f64 = 0.75; // eased setter duration
pub const SKEW_FACTOR: f32 = 0.5; // horizontal displacement percent -> skewX degrees
pub const LARGE_VIEWPORT_MIN_PX: f32 = 1200.0; // at or above: parallax on

// Lazy activation
pub const LAZY_ROOT_MARGIN_PX: f32 = 200.0;
pub const LAZY_THRESHOLD: f32 = 0.01;

// Ambient loops
pub const CLOUDS_SPEED: f32 = 1.0; // multiplies cloud drift durations
pub const MIN_SEGMENT_SEC: f64 = 1.0e-3; // floor for randomly drawn durations

// Neutral pose written when parallax is disabled for the viewport
pub const NEUTRAL_SCALE: f32 = 1.0;
pub const NEUTRAL_SKEW: f32 = 0.0;

// Derives independent per-loop RNG streams from one scene seed
pub const STREAM_MIX: u64 = 0x9E37_79B9_7F4A_7C15;
