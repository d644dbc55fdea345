//! Form lifecycle errors

use std::fmt::Display;
use thiserror::Error;

use super::FormState;
use crate::scene::SceneError;
use crate::ui::animation::AnimationError;
use crate::ui::binder::BindingError;

/// Errors raised while opening, showing, hiding or closing a form
#[derive(Debug, Error)]
pub enum FormError {
    /// Auto-binding could not find a required node; the form is unusable
    #[error("Binding failed: {0}")]
    Binding(#[from] BindingError),

    /// A form's `load` hook failed
    #[error("Load failed for {form}: {reason}")]
    Load {
        /// Form path
        form: String,
        /// What went wrong
        reason: String,
    },

    /// An animation failed and the caller chose to surface it
    #[error("Animation failed: {0}")]
    Animation(#[from] AnimationError),

    /// Scene tree operation failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// No form type is registered under the path or name
    #[error("No form registered for '{0}'")]
    NotRegistered(String),

    /// Another open for the same path is still in flight
    #[error("Form '{0}' is already being opened")]
    Busy(String),

    /// The form is borrowed by other code while the registry needs it
    #[error("Form '{0}' is in use elsewhere")]
    InUse(String),

    /// Open parameters do not match the form's parameter type
    #[error("Parameters for '{path}' must be {expected}")]
    ParamsMismatch {
        /// Form path
        path: String,
        /// Expected parameter type
        expected: &'static str,
    },

    /// The registry returned a form of a different type than requested
    #[error("Form at '{0}' is not of the requested type")]
    TypeMismatch(String),

    /// Lifecycle hook called in the wrong state
    #[error("Invalid lifecycle transition {from:?} -> {to:?}")]
    InvalidState {
        /// Current state
        from: FormState,
        /// Requested state
        to: FormState,
    },

    /// The form has no root node yet
    #[error("Form is not attached to a scene node")]
    Detached,

    /// The loading overlay failed to show or hide
    #[error("Loading overlay failed: {0}")]
    Overlay(String),
}

impl FormError {
    /// Build a load error for the form at `form`
    pub fn load(form: impl Into<String>, reason: impl Display) -> Self {
        Self::Load {
            form: form.into(),
            reason: reason.to_string(),
        }
    }
}
