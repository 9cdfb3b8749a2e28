use crate::target::NodeId;
use thiserror::Error;

/// Failure writing to a render node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("render node {0} is not attached")]
    Detached(NodeId),
    #[error("render node {node} rejected write: {reason}")]
    Rejected { node: NodeId, reason: String },
}

/// The host cannot provide viewport intersection detection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VisibilityError {
    #[error("visibility detection unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("no render node registered as `{0}`")]
    UnknownNode(String),
}
