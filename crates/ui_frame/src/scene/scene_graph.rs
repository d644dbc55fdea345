//! Scene tree
//!
//! Nodes live in a slot map and link to each other through [`NodeId`]
//! handles. A parent owns its children: removing a node removes its whole
//! subtree. Siblings draw in ascending z-order, ties broken by insertion
//! order.

use bitflags::bitflags;
use thiserror::Error;

use crate::foundation::collections::{HandleMap, NodeId};
use crate::foundation::math::Vec2;

bitflags! {
    /// Behaviors attached to a node
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u32 {
        /// Swallows every input event that reaches it
        const SWALLOW_INPUT = 1 << 0;
        /// Darkening backdrop drawn beneath a pop-up
        const MASK = 1 << 1;
    }
}

/// Scene tree errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// Handle does not refer to a live node
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// The root node is owned by the tree itself
    #[error("The root node cannot be removed")]
    CannotRemoveRoot,
}

/// A single node in the tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Node name, used by the binder to find children
    pub name: String,
    /// Parent node (None only for the root)
    pub parent: Option<NodeId>,
    /// Child nodes in insertion order
    pub children: Vec<NodeId>,
    /// Draw order among siblings (higher = on top)
    pub z_order: i32,
    /// Content size in pixels
    pub size: Vec2,
    /// Scale factors
    pub scale: Vec2,
    /// Opacity in [0, 1]
    pub opacity: f32,
    /// Inactive nodes and their subtrees neither draw nor receive input
    pub active: bool,
    /// Attached behaviors
    pub flags: NodeFlags,
}

impl Node {
    fn new(name: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            name: name.into(),
            parent,
            children: Vec::new(),
            z_order: 0,
            size: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            opacity: 1.0,
            active: true,
            flags: NodeFlags::empty(),
        }
    }
}

/// Retained scene tree
#[derive(Debug)]
pub struct SceneTree {
    nodes: HandleMap<NodeId, Node>,
    root: NodeId,
}

impl SceneTree {
    /// Create a tree holding only the root node
    pub fn new() -> Self {
        let mut nodes = HandleMap::with_key();
        let root = nodes.insert(Node::new("Canvas", None));
        Self { nodes, root }
    }

    /// Root node handle
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root remains
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Whether the handle refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get a node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get a node mutably
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Create a node under `parent`
    pub fn create_node(&mut self, name: impl Into<String>, parent: NodeId) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let id = self.nodes.insert(Node::new(name, Some(parent)));
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Remove a node and its whole subtree, returning how many nodes were removed
    pub fn remove_node(&mut self, id: NodeId) -> Result<usize, SceneError> {
        if id == self.root {
            return Err(SceneError::CannotRemoveRoot);
        }
        let parent = self.get(id).ok_or(SceneError::NodeNotFound(id))?.parent;
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|child| *child != id);
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Set a node's draw order among its siblings
    pub fn set_z_order(&mut self, id: NodeId, z_order: i32) -> Result<(), SceneError> {
        self.node_mut(id)?.z_order = z_order;
        Ok(())
    }

    /// Set a node's content size
    pub fn set_size(&mut self, id: NodeId, size: Vec2) -> Result<(), SceneError> {
        self.node_mut(id)?.size = size;
        Ok(())
    }

    /// Set a node's scale
    pub fn set_scale(&mut self, id: NodeId, scale: Vec2) -> Result<(), SceneError> {
        self.node_mut(id)?.scale = scale;
        Ok(())
    }

    /// Set a node's opacity, clamped to `0.0..=1.0`
    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) -> Result<(), SceneError> {
        self.node_mut(id)?.opacity = opacity.clamp(0.0, 1.0);
        Ok(())
    }

    /// Set whether a node is active
    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<(), SceneError> {
        self.node_mut(id)?.active = active;
        Ok(())
    }

    /// Add behaviors to a node
    pub fn insert_flags(&mut self, id: NodeId, flags: NodeFlags) -> Result<(), SceneError> {
        self.node_mut(id)?.flags.insert(flags);
        Ok(())
    }

    /// Get a node's scale
    pub fn scale(&self, id: NodeId) -> Option<Vec2> {
        self.get(id).map(|node| node.scale)
    }

    /// Children of a node sorted by draw order (bottom first)
    pub fn children_in_draw_order(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.get(id) else {
            return Vec::new();
        };
        let mut children: Vec<(usize, NodeId)> = node.children.iter().copied().enumerate().collect();
        children.sort_by_key(|(index, child)| {
            (self.get(*child).map_or(0, |n| n.z_order), *index)
        });
        children.into_iter().map(|(_, child)| child).collect()
    }

    /// All descendants of a node in depth-first order, excluding the node itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self
            .get(id)
            .map(|node| node.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(node) = self.get(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        result
    }

    /// First descendant of `id` with the given name, depth-first
    pub fn find_descendant(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|child| self.get(*child).is_some_and(|node| node.name == name))
    }

    /// Count the nodes in a subtree, including its root, carrying all of `flags`
    pub fn count_with_flags(&self, id: NodeId, flags: NodeFlags) -> usize {
        std::iter::once(id)
            .chain(self.descendants(id))
            .filter(|node| self.get(*node).is_some_and(|n| n.flags.contains(flags)))
            .count()
    }

    /// Whether input aimed at `id` is swallowed before reaching it
    ///
    /// Walks from the node up to the root. At every level, any active sibling
    /// branch drawn above the current branch that holds an active
    /// input-swallowing node covers everything beneath it.
    pub fn is_input_blocked(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.get(current).and_then(|node| node.parent) {
            let order = self.children_in_draw_order(parent);
            let Some(position) = order.iter().position(|child| *child == current) else {
                return false;
            };
            if order[position + 1..]
                .iter()
                .any(|sibling| self.subtree_swallows_input(*sibling))
            {
                return true;
            }
            current = parent;
        }
        false
    }

    fn subtree_swallows_input(&self, id: NodeId) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        if !node.active {
            return false;
        }
        node.flags.contains(NodeFlags::SWALLOW_INPUT)
            || node.children.iter().any(|child| self.subtree_swallows_input(*child))
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}
