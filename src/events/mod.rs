mod pointer;

pub use pointer::SceneListeners;
