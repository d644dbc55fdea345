//! Scene management
//!
//! Retained node tree the UI frame attaches forms, backdrop masks and input
//! blockers to. Rendering the tree is the application's concern.

pub mod scene_graph;

pub use scene_graph::{Node, NodeFlags, SceneError, SceneTree};
pub use crate::foundation::collections::NodeId;
