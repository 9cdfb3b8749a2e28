pub mod ambient;
pub mod composition;
pub mod config;
pub mod constants;
pub mod easing;
pub mod error;
pub mod lazy;
pub mod offset;
pub mod parallax;
pub mod pointer;
pub mod scene;
pub mod scheduler;
pub mod stage;
pub mod target;
pub mod tween;

pub use ambient::{AmbientLoop, AmbientSpec, LoopStatus, RandomSource, Sample, ScriptedRandom};
pub use config::{SceneConfig, VisibilityFallback};
pub use easing::Ease;
pub use error::{RenderError, SceneError, VisibilityError};
pub use lazy::{
    GateOptions, LazyGate, ManualVisibility, VisibilityApi, VisibilityCallback, VisibilityObserver,
};
pub use offset::{Offset, OffsetStore, Store, Subscription, Viewport, ViewportStore};
pub use parallax::{BinderStatus, Channels, DepthModifier, ParallaxBinder, ParallaxSpec, Pose};
pub use pointer::{derive_offset, FixedMetrics, PointerSample, PointerSignal, SceneMetrics};
pub use scene::{ElementId, ElementSpec, Scene};
pub use scheduler::{
    Animate, FrameCallback, FrameStats, ManualScheduler, Scheduler, TaskId, Ticker, TimerCallback,
};
pub use stage::Stage;
pub use target::{MemoryTarget, NodeId, NodeRegistry, NodeStyle, Property, RenderTarget};
pub use tween::{Interpolator, TweenState};
