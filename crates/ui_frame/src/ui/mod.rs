//! UI Form Module
//!
//! Window lifecycle core and the collaborators it is driven through.
//!
//! Architecture:
//! - form/: form base, lifecycle drivers, result future, input blocker
//! - services: collaborator traits and the `UiContext` that carries them
//! - manager: reference registry (`FormManager`)
//! - binder, screen, animation: reference collaborators

pub mod animation;
pub mod binder;
pub mod form;
pub mod manager;
pub mod screen;
pub mod services;

pub use manager::FormManager;
pub use screen::FixedScreen;

// Re-export the form base
pub use form::{
    DisplayKind, FormCore, FormDescriptor, FormError, FormId, FormKey, FormLifecycle,
    FormParams, FormRef, FormState, FormType, InputBlocker, MaskKind, MaskOpacity,
    ResultError, ResultFuture, UiForm, BLOCKER_NODE_NAME,
};

// Re-export collaborators
pub use animation::{AnimationError, AnimationRunner, AnimationSpec, InstantRunner, TweenRunner};
pub use binder::{BindingError, NodeBinder, NodeLookup, SceneBinder};
pub use services::{
    FormRegistry, HeadlessOverlay, LoadingOverlay, ScreenAdapter, UiContext, UiContextBuilder,
};

#[cfg(test)]
mod tests;
