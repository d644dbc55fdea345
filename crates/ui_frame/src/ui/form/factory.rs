//! Static factory surface
//!
//! Every concrete form type gets `open_view`, `open_view_with_loading` and
//! `close_view`. Callers name the type; the registry decides whether that
//! means a new instance, a cached one, or the one already on screen.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;

use super::{FormDescriptor, FormError, FormKey, UiForm};
use crate::ui::services::UiContext;

/// Type-level entry points of a form
#[async_trait(?Send)]
pub trait FormType: UiForm + Sized {
    /// The type's descriptor; implement with [`form_descriptor!`](crate::form_descriptor)
    fn descriptor() -> &'static FormDescriptor;

    /// Build a fresh, unattached instance
    fn create(ctx: &UiContext) -> Self;

    /// Prefab path of this type, resolved on first use and memoized
    fn prefab_path(ctx: &UiContext) -> &'static str {
        let config = ctx.config();
        Self::descriptor().resolve::<Self>(&config.ui_path_root)
    }

    /// Open this form, forwarding `params` to its `on_show`
    async fn open_view(ctx: &UiContext, params: Self::Params) -> Result<Rc<RefCell<Self>>, FormError> {
        let path = Self::prefab_path(ctx);
        let form = ctx.registry().open(ctx, path, Box::new(params)).await?;
        form.downcast::<Self>()
            .ok_or_else(|| FormError::TypeMismatch(path.to_string()))
    }

    /// Open this form behind the loading overlay
    ///
    /// The overlay is hidden exactly once whether or not the open succeeds.
    /// An open error takes precedence over an overlay error.
    async fn open_view_with_loading(
        ctx: &UiContext,
        params: Self::Params,
    ) -> Result<Rc<RefCell<Self>>, FormError> {
        let loading = ctx.loading();
        let opened = match loading.show_loading_form().await {
            Ok(()) => Self::open_view(ctx, params).await,
            Err(e) => Err(e),
        };
        let hidden = loading.hide_loading_form().await;

        let form = opened?;
        hidden?;
        Ok(form)
    }

    /// Close the open instance of this form; false when none was open
    async fn close_view(ctx: &UiContext) -> Result<bool, FormError> {
        let path = Self::prefab_path(ctx);
        ctx.registry().close(ctx, FormKey::Path(path)).await
    }
}
