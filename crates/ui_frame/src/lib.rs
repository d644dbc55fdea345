//! # UI Frame
//!
//! Form lifecycle core for a game UI window framework.
//!
//! ## Features
//!
//! - **Form Lifecycle**: pre-init (bind and load), show, hide and destroy hooks
//! - **Static Entry Points**: `open_view`, `open_view_with_loading` and `close_view` per form type
//! - **Result Future**: openers await a value the form resolves later
//! - **Input Blocking**: per-form overlay node that swallows input
//! - **Reference Collaborators**: registry, node binder, screen adapter and tween runner
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use ui_frame::prelude::*;
//!
//! struct Dialog {
//!     core: FormCore,
//! }
//!
//! impl UiForm for Dialog {
//!     type Params = String;
//!     type Output = bool;
//!
//!     fn core(&self) -> &FormCore {
//!         &self.core
//!     }
//!
//!     fn core_mut(&mut self) -> &mut FormCore {
//!         &mut self.core
//!     }
//! }
//!
//! impl FormType for Dialog {
//!     form_descriptor!();
//!
//!     fn create(_ctx: &UiContext) -> Self {
//!         Self { core: FormCore::new(DisplayKind::PopUp) }
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = Rc::new(FormManager::new());
//!     manager.register::<Dialog>();
//!     let ctx = UiContext::builder(manager).build()?;
//!
//!     futures::executor::block_on(async {
//!         let dialog = Dialog::open_view(&ctx, "Quit?".to_string()).await?;
//!         let answer = dialog.borrow_mut().wait_promise();
//!         dialog.borrow_mut().resolve(true);
//!         assert!(answer.await?);
//!         Dialog::close_view(&ctx).await?;
//!         Ok::<_, Box<dyn std::error::Error>>(())
//!     })
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core modules
pub mod config;
pub mod core;
pub mod foundation;

// Subsystems
pub mod assets;
pub mod scene;
pub mod ui;

/// Common imports for frame users
pub mod prelude {
    pub use crate::{
        core::config::{AnimationConfig, FrameConfig},
        foundation::math::{Easing, Vec2},
        form_descriptor,
        scene::{NodeId, SceneTree},
        ui::{
            DisplayKind, FormCore, FormError, FormKey, FormManager, FormRef, FormRegistry,
            FormType, LoadingOverlay, MaskKind, MaskOpacity, TweenRunner, UiContext, UiForm,
        },
    };
}
