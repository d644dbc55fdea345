//! Lifecycle drivers
//!
//! Registries call these to move a form through its states. Each driver
//! holds the form's mutable borrow across its awaits; registries serialize
//! operations per instance, so no other code borrows the form meanwhile.
#![allow(clippy::await_holding_refcell_ref)]

use std::any::Any;

use super::{FormError, FormRef, FormState};
use crate::ui::services::UiContext;

/// Bind (when `auto_bind` is set) and then load
///
/// Runs once per instance; binding finishes before `load` is awaited.
pub async fn pre_init(form: &FormRef, ctx: &UiContext) -> Result<(), FormError> {
    let mut form = form.try_borrow_mut()?;
    let state = form.core().state();
    if state != FormState::Constructed {
        return Err(FormError::InvalidState { from: state, to: FormState::Loaded });
    }

    if form.core().auto_bind {
        let root = form.core().node().ok_or(FormError::Detached)?;
        let scene = ctx.scene();
        ctx.binder().bind(&mut *form, &scene, root)?;
    }

    form.load(ctx).await?;
    form.core_mut().transition(FormState::Loaded)
}

/// Activate the root node, play the show animation, then call `on_show`
///
/// A failed animation is logged and the form still becomes visible, so it
/// is never stranded half-shown.
pub async fn show(form: &FormRef, ctx: &UiContext, params: &dyn Any) -> Result<(), FormError> {
    let mut form = form.try_borrow_mut()?;
    let state = form.core().state();
    if state != FormState::Loaded {
        return Err(FormError::InvalidState { from: state, to: FormState::Visible });
    }
    form.check_params(params)?;

    if let Some(node) = form.core().node() {
        ctx.scene_mut().set_active(node, true)?;
    }
    if let Err(e) = form.show_animation(ctx).await {
        log::warn!("Show animation of {} failed: {}", form.core().path(), e);
    }

    form.core_mut().transition(FormState::Visible)?;
    form.show_with(params)
}

/// Play the hide animation, call `on_hide`, then deactivate the root node
pub async fn hide(form: &FormRef, ctx: &UiContext) -> Result<(), FormError> {
    let mut form = form.try_borrow_mut()?;
    let state = form.core().state();
    if state != FormState::Visible {
        return Err(FormError::InvalidState { from: state, to: FormState::Loaded });
    }

    if let Err(e) = form.hide_animation(ctx).await {
        log::warn!("Hide animation of {} failed: {}", form.core().path(), e);
    }
    form.on_hide();
    form.core_mut().transition(FormState::Loaded)?;

    if let Some(node) = form.core().node() {
        ctx.scene_mut().set_active(node, false)?;
    }
    Ok(())
}

/// Release the blocker and abandon any pending result
///
/// Scene nodes and cached resources are the registry's to release.
pub fn destroy(form: &FormRef) -> Result<(), FormError> {
    form.try_borrow_mut()?.core_mut().destroy()
}
