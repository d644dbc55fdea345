//! Input blocker node
//!
//! An [`InputBlocker`] owns one full-viewport node flagged to swallow input.
//! Turning the blocker off removes the node through the scene directly.
//! Dropping the handle also removes it, so a form that is torn down can
//! never leave its blocker behind.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::foundation::math::Vec2;
use crate::scene::{NodeFlags, NodeId, SceneError, SceneTree};

/// Name given to blocker nodes
pub const BLOCKER_NODE_NAME: &str = "block_input_events";

/// Exclusively owned input-swallowing overlay node
#[derive(Debug)]
pub struct InputBlocker {
    scene: Weak<RefCell<SceneTree>>,
    node: NodeId,
}

impl InputBlocker {
    /// Create the blocker node under `parent`
    pub fn create(
        scene: &Rc<RefCell<SceneTree>>,
        parent: NodeId,
        size: Vec2,
        z_order: i32,
    ) -> Result<Self, SceneError> {
        let mut tree = scene.borrow_mut();
        let node = tree.create_node(BLOCKER_NODE_NAME, parent)?;
        tree.set_size(node, size)?;
        tree.set_z_order(node, z_order)?;
        tree.insert_flags(node, NodeFlags::SWALLOW_INPUT)?;
        log::debug!("Input blocker {:?} created under {:?} ({}x{})", node, parent, size.x, size.y);

        Ok(Self {
            scene: Rc::downgrade(scene),
            node,
        })
    }

    /// Blocker node handle
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Drop for InputBlocker {
    fn drop(&mut self) {
        let Some(scene) = self.scene.upgrade() else {
            return;
        };
        let Ok(mut tree) = scene.try_borrow_mut() else {
            log::warn!("Scene busy, input blocker {:?} left in place", self.node);
            return;
        };
        // The node is gone already when its form's subtree was removed first.
        if tree.contains(self.node) {
            if let Err(e) = tree.remove_node(self.node) {
                log::warn!("Failed to remove input blocker {:?}: {}", self.node, e);
            } else {
                log::debug!("Input blocker {:?} destroyed", self.node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_removes_node() {
        let scene = Rc::new(RefCell::new(SceneTree::new()));
        let root = scene.borrow().root();
        let blocker = InputBlocker::create(&scene, root, Vec2::new(800.0, 600.0), i32::MAX).unwrap();
        let node = blocker.node();
        {
            let tree = scene.borrow();
            let created = tree.get(node).unwrap();
            assert_eq!(created.name, BLOCKER_NODE_NAME);
            assert!(created.flags.contains(NodeFlags::SWALLOW_INPUT));
            assert_eq!(created.size, Vec2::new(800.0, 600.0));
        }

        drop(blocker);
        assert!(!scene.borrow().contains(node));
    }

    #[test]
    fn test_drop_after_parent_removed() {
        let scene = Rc::new(RefCell::new(SceneTree::new()));
        let root = scene.borrow().root();
        let form = scene.borrow_mut().create_node("Dialog", root).unwrap();
        let blocker = InputBlocker::create(&scene, form, Vec2::new(10.0, 10.0), 0).unwrap();

        scene.borrow_mut().remove_node(form).unwrap();
        drop(blocker);
        assert!(scene.borrow().is_empty());
    }
}
