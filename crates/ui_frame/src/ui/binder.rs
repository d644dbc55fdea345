//! Node binding
//!
//! Before a form loads, the binder collects the named nodes beneath its root
//! and hands them to [`UiForm::bind_nodes`](crate::ui::UiForm::bind_nodes),
//! where the form copies the handles it needs into its own fields.

use std::collections::HashMap;
use thiserror::Error;

use crate::scene::{NodeId, SceneTree};
use crate::ui::form::FormLifecycle;

/// Binding failures; fatal to the form being opened
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// A node the form requires is not in its subtree
    #[error("Form '{form}' has no child node named '{node}'")]
    MissingNode {
        /// Form path
        form: String,
        /// Missing node name
        node: String,
    },

    /// The form root is not in the scene
    #[error("Root node of form '{0}' is not in the scene")]
    MissingRoot(String),
}

/// Named descendants of a form root
#[derive(Debug)]
pub struct NodeLookup {
    form: String,
    root: NodeId,
    nodes: HashMap<String, NodeId>,
}

impl NodeLookup {
    /// Collect the named descendants of `root`; the first node wins a name clash
    pub fn collect(scene: &SceneTree, root: NodeId, form: &str) -> Result<Self, BindingError> {
        if !scene.contains(root) {
            return Err(BindingError::MissingRoot(form.to_string()));
        }
        let mut nodes = HashMap::new();
        for id in scene.descendants(root) {
            if let Some(node) = scene.get(id) {
                nodes.entry(node.name.clone()).or_insert(id);
            }
        }
        Ok(Self {
            form: form.to_string(),
            root,
            nodes,
        })
    }

    /// Form root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node with the given name, if present
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.nodes.get(name).copied()
    }

    /// Node with the given name, or a binding error naming it
    pub fn require(&self, name: &str) -> Result<NodeId, BindingError> {
        self.get(name).ok_or_else(|| BindingError::MissingNode {
            form: self.form.clone(),
            node: name.to_string(),
        })
    }

    /// Number of named nodes found
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the root has no descendants
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Wires a form's named child nodes onto the form
pub trait NodeBinder {
    /// Bind the subtree under `root` onto `form`
    fn bind(&self, form: &mut dyn FormLifecycle, scene: &SceneTree, root: NodeId) -> Result<(), BindingError>;
}

/// Binder that resolves nodes by name within the form's subtree
#[derive(Debug, Default, Clone, Copy)]
pub struct SceneBinder;

impl NodeBinder for SceneBinder {
    fn bind(&self, form: &mut dyn FormLifecycle, scene: &SceneTree, root: NodeId) -> Result<(), BindingError> {
        let lookup = NodeLookup::collect(scene, root, form.core().path())?;
        log::trace!("Binding {} with {} named node(s)", form.type_name(), lookup.len());
        form.bind_nodes(&lookup)
    }
}
