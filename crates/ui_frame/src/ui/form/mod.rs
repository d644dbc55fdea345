//! Form base
//!
//! A form is a self-contained UI window with its own lifecycle:
//!
//! ```text
//! [Constructed] --pre_init--> [Loaded] --show--> [Visible]
//! [Visible] --hide--> [Loaded] --show--> [Visible]        (reuse cycle)
//! [Loaded] | [Visible] --destroy--> [Destroyed]
//! ```
//!
//! Concrete forms embed a [`FormCore`] and implement [`UiForm`], overriding
//! only the hooks they need. The registry drives them through the object-safe
//! [`FormLifecycle`] trait, which every `UiForm` gets for free.

pub mod blocker;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod lifecycle;
pub mod result;

pub use blocker::{InputBlocker, BLOCKER_NODE_NAME};
pub use descriptor::{simple_type_name, FormDescriptor};
pub use error::FormError;
pub use factory::FormType;
pub use result::{ResultError, ResultFuture, ResultSlot};

use std::any::{type_name, Any};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use futures::future::{self, FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::scene::{NodeId, SceneError, SceneTree};
use crate::ui::animation::{self, AnimationError};
use crate::ui::binder::{BindingError, NodeLookup};
use crate::ui::services::UiContext;

/// Opaque open parameters, downcast to the form's `Params` type at show time
pub type FormParams = Box<dyn Any>;

/// Registry-assigned form instance id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormId(pub u64);

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form#{}", self.0)
    }
}

/// How a form is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayKind {
    /// Full-screen form replacing what is beneath it
    #[default]
    Screen,
    /// Fixed element such as a HUD bar
    Fixed,
    /// Regular window
    Window,
    /// Pop-up with a backdrop mask and scale-in animation
    PopUp,
    /// Transient notification
    Tips,
}

/// Backdrop opacity beneath a pop-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaskOpacity {
    /// No backdrop at all
    None,
    /// Invisible backdrop that still swallows input
    Transparent,
    /// Light darkening
    Lucency,
    /// Heavy darkening
    #[default]
    Dark,
}

impl MaskOpacity {
    /// Backdrop node opacity
    pub fn alpha(self) -> f32 {
        match self {
            Self::None | Self::Transparent => 0.0,
            Self::Lucency => 0.4,
            Self::Dark => 0.75,
        }
    }
}

/// Backdrop style, meaningful only for pop-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MaskKind {
    /// Backdrop opacity
    pub opacity: MaskOpacity,
}

impl MaskKind {
    /// Mask with the given opacity
    pub fn new(opacity: MaskOpacity) -> Self {
        Self { opacity }
    }
}

/// Lifecycle state of a form instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormState {
    /// Created, not yet bound or loaded
    Constructed,
    /// Bound and loaded, not on screen
    Loaded,
    /// On screen
    Visible,
    /// Torn down; terminal
    Destroyed,
}

impl FormState {
    /// Whether the lifecycle allows moving from `self` to `to`
    pub fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Constructed, Self::Loaded)
                | (Self::Loaded, Self::Visible)
                | (Self::Visible, Self::Loaded)
                | (Self::Constructed | Self::Loaded | Self::Visible, Self::Destroyed)
        )
    }
}

/// Identifies an open form for closing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey<'a> {
    /// Type-level prefab path
    Path(&'a str),
    /// Instance id
    Id(FormId),
}

/// State every form carries
///
/// The registry assigns `id`, `path` and `node`; window logic only reads them.
#[derive(Debug)]
pub struct FormCore {
    /// Presentation mode
    pub display: DisplayKind,
    /// Backdrop style (pop-ups only)
    pub mask: MaskKind,
    /// Release the instance and its resources when closed
    pub destroy_on_close: bool,
    /// Bind named child nodes before loading
    pub auto_bind: bool,
    id: Option<FormId>,
    path: Option<String>,
    node: Option<NodeId>,
    state: FormState,
    result: ResultSlot,
    blocker: Option<InputBlocker>,
}

impl FormCore {
    /// Create a core with the given display kind
    pub fn new(display: DisplayKind) -> Self {
        Self {
            display,
            mask: MaskKind::default(),
            destroy_on_close: false,
            auto_bind: true,
            id: None,
            path: None,
            node: None,
            state: FormState::Constructed,
            result: ResultSlot::new(),
            blocker: None,
        }
    }

    /// Set the backdrop style
    pub fn with_mask(mut self, mask: MaskKind) -> Self {
        self.mask = mask;
        self
    }

    /// Set whether closing destroys the instance
    pub fn with_destroy_on_close(mut self, destroy: bool) -> Self {
        self.destroy_on_close = destroy;
        self
    }

    /// Set whether pre-init binds nodes
    pub fn with_auto_bind(mut self, auto_bind: bool) -> Self {
        self.auto_bind = auto_bind;
        self
    }

    /// Registry-assigned id
    pub fn id(&self) -> Option<FormId> {
        self.id
    }

    /// Prefab path the form was opened under
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("<unattached>")
    }

    /// Root node of the form
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Current lifecycle state
    pub fn state(&self) -> FormState {
        self.state
    }

    /// Whether an input blocker is active
    pub fn is_blocking_input(&self) -> bool {
        self.blocker.is_some()
    }

    /// Whether an opener is waiting for a result
    pub fn has_pending_result(&self) -> bool {
        self.result.is_pending()
    }

    /// Result mailbox
    pub fn result_slot(&mut self) -> &mut ResultSlot {
        &mut self.result
    }

    pub(crate) fn attach(&mut self, id: FormId, path: &str, node: NodeId) {
        self.id = Some(id);
        self.path = Some(path.to_string());
        self.node = Some(node);
    }

    pub(crate) fn transition(&mut self, to: FormState) -> Result<(), FormError> {
        if !self.state.can_transition(to) {
            return Err(FormError::InvalidState { from: self.state, to });
        }
        log::debug!("{} ({}) {:?} -> {:?}", self.path(), self.id.map_or(0, |id| id.0), self.state, to);
        self.state = to;
        Ok(())
    }

    /// Turn the input blocker on or off
    ///
    /// Turning it on twice keeps a single blocker; turning it off without one
    /// does nothing.
    pub fn set_block_input(&mut self, ctx: &UiContext, block: bool) -> Result<(), FormError> {
        match (block, self.blocker.is_some()) {
            (true, false) => {
                let node = self.node.ok_or(FormError::Detached)?;
                let size = ctx.screen().visible_size();
                let z_order = ctx.config().blocker_z_order;
                self.blocker = Some(InputBlocker::create(ctx.scene_handle(), node, size, z_order)?);
            }
            (false, true) => {
                if let Some(blocker) = self.blocker.take() {
                    let node = blocker.node();
                    let mut scene = ctx.scene_mut();
                    if scene.contains(node) {
                        scene.remove_node(node)?;
                    }
                    // Drop runs after the scene borrow ends and finds nothing left.
                    drop(scene);
                    drop(blocker);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Tear down instance-owned state: the blocker and any pending result
    pub(crate) fn destroy(&mut self) -> Result<(), FormError> {
        self.transition(FormState::Destroyed)?;
        self.blocker = None;
        self.result.abandon();
        Ok(())
    }
}

impl Default for FormCore {
    fn default() -> Self {
        Self::new(DisplayKind::default())
    }
}

/// Lifecycle hooks and helpers of a concrete form
///
/// Every hook has a default, so a form implements only `core`/`core_mut` plus
/// whatever it customizes. `Params` is what openers pass in and `on_show`
/// receives; `Output` is what `wait_promise` resolves to.
#[async_trait(?Send)]
pub trait UiForm: 'static {
    /// Parameters forwarded from open to `on_show`
    type Params: 'static;
    /// Value delivered through `wait_promise`
    type Output: 'static;

    /// Shared form state
    fn core(&self) -> &FormCore;

    /// Shared form state, mutably
    fn core_mut(&mut self) -> &mut FormCore;

    /// Populate the freshly created root node with the form's child nodes
    fn instantiate(&self, _scene: &mut SceneTree, _root: NodeId) -> Result<(), SceneError> {
        Ok(())
    }

    /// Wire named child nodes onto fields
    fn bind_nodes(&mut self, _nodes: &NodeLookup) -> Result<(), BindingError> {
        Ok(())
    }

    /// Fetch form-specific resources
    async fn load(&mut self, _ctx: &UiContext) -> Result<(), FormError> {
        Ok(())
    }

    /// Called once per show with the parameters passed to open
    fn on_show(&mut self, _params: &Self::Params) {}

    /// Called once per hide
    fn on_hide(&mut self) {}

    /// Transition played when the form appears
    async fn show_animation(&mut self, ctx: &UiContext) -> Result<(), AnimationError> {
        animation::pop_up_scale_in(UiForm::core(self), ctx).await
    }

    /// Transition played when the form disappears
    async fn hide_animation(&mut self, _ctx: &UiContext) -> Result<(), AnimationError> {
        Ok(())
    }

    /// Park a resolver and return the future the opener awaits
    fn wait_promise(&mut self) -> ResultFuture<Self::Output> {
        UiForm::core_mut(self).result_slot().wait()
    }

    /// Hand `value` to whoever awaits `wait_promise`
    fn resolve(&mut self, value: Self::Output) -> bool {
        UiForm::core_mut(self).result_slot().resolve(value)
    }

    /// Turn the input blocker on or off
    fn set_block_input(&mut self, ctx: &UiContext, block: bool) -> Result<(), FormError> {
        UiForm::core_mut(self).set_block_input(ctx, block)
    }

    /// Open another form by registered path or name
    ///
    /// The future does not borrow `self`.
    fn show_ui_form<P: 'static>(
        &self,
        ctx: &UiContext,
        name: &str,
        params: P,
    ) -> LocalBoxFuture<'static, Result<FormRef, FormError>> {
        let ctx = ctx.clone();
        let name = name.to_string();
        async move {
            let registry = ctx.registry();
            registry.open(&ctx, &name, Box::new(params)).await
        }
        .boxed_local()
    }

    /// Close this form by its assigned id
    ///
    /// The future does not borrow `self`; release any borrow of the form
    /// before awaiting it, since closing runs the hide hooks.
    fn close_ui_form(&self, ctx: &UiContext) -> LocalBoxFuture<'static, Result<bool, FormError>> {
        let Some(id) = UiForm::core(self).id() else {
            return future::ready(Ok(false)).boxed_local();
        };
        let ctx = ctx.clone();
        async move {
            let registry = ctx.registry();
            registry.close(&ctx, FormKey::Id(id)).await
        }
        .boxed_local()
    }
}

/// Object-safe view of a form used by registries
#[async_trait(?Send)]
pub trait FormLifecycle {
    /// Shared form state
    fn core(&self) -> &FormCore;
    /// Shared form state, mutably
    fn core_mut(&mut self) -> &mut FormCore;
    /// Form type name for diagnostics
    fn type_name(&self) -> &'static str;
    /// See [`UiForm::instantiate`]
    fn instantiate(&self, scene: &mut SceneTree, root: NodeId) -> Result<(), SceneError>;
    /// See [`UiForm::bind_nodes`]
    fn bind_nodes(&mut self, nodes: &NodeLookup) -> Result<(), BindingError>;
    /// See [`UiForm::load`]
    async fn load(&mut self, ctx: &UiContext) -> Result<(), FormError>;
    /// Check that `params` is this form's parameter type
    fn check_params(&self, params: &dyn Any) -> Result<(), FormError>;
    /// Downcast `params` and call [`UiForm::on_show`]
    fn show_with(&mut self, params: &dyn Any) -> Result<(), FormError>;
    /// See [`UiForm::on_hide`]
    fn on_hide(&mut self);
    /// See [`UiForm::show_animation`]
    async fn show_animation(&mut self, ctx: &UiContext) -> Result<(), AnimationError>;
    /// See [`UiForm::hide_animation`]
    async fn hide_animation(&mut self, ctx: &UiContext) -> Result<(), AnimationError>;
}

#[async_trait(?Send)]
impl<T: UiForm> FormLifecycle for T {
    fn core(&self) -> &FormCore {
        UiForm::core(self)
    }

    fn core_mut(&mut self) -> &mut FormCore {
        UiForm::core_mut(self)
    }

    fn type_name(&self) -> &'static str {
        simple_type_name::<T>()
    }

    fn instantiate(&self, scene: &mut SceneTree, root: NodeId) -> Result<(), SceneError> {
        UiForm::instantiate(self, scene, root)
    }

    fn bind_nodes(&mut self, nodes: &NodeLookup) -> Result<(), BindingError> {
        UiForm::bind_nodes(self, nodes)
    }

    async fn load(&mut self, ctx: &UiContext) -> Result<(), FormError> {
        UiForm::load(self, ctx).await
    }

    fn check_params(&self, params: &dyn Any) -> Result<(), FormError> {
        if params.is::<T::Params>() {
            Ok(())
        } else {
            Err(FormError::ParamsMismatch {
                path: UiForm::core(self).path().to_string(),
                expected: type_name::<T::Params>(),
            })
        }
    }

    fn show_with(&mut self, params: &dyn Any) -> Result<(), FormError> {
        FormLifecycle::check_params(self, params)?;
        if let Some(params) = params.downcast_ref::<T::Params>() {
            UiForm::on_show(self, params);
        }
        Ok(())
    }

    fn on_hide(&mut self) {
        UiForm::on_hide(self);
    }

    async fn show_animation(&mut self, ctx: &UiContext) -> Result<(), AnimationError> {
        UiForm::show_animation(self, ctx).await
    }

    async fn hide_animation(&mut self, ctx: &UiContext) -> Result<(), AnimationError> {
        UiForm::hide_animation(self, ctx).await
    }
}

/// Shared handle to a live form
///
/// Holds the same allocation twice: once as the lifecycle trait object the
/// registry drives, once as `Any` so openers can recover the concrete type.
#[derive(Clone)]
pub struct FormRef {
    form: Rc<RefCell<dyn FormLifecycle>>,
    any: Rc<dyn Any>,
}

impl FormRef {
    /// Wrap a new form instance
    pub fn new<T: UiForm>(form: T) -> Self {
        let form = Rc::new(RefCell::new(form));
        Self {
            form: form.clone(),
            any: form,
        }
    }

    /// Borrow the form
    pub fn borrow(&self) -> Ref<'_, dyn FormLifecycle + 'static> {
        self.form.borrow()
    }

    /// Borrow the form mutably, failing when it is already borrowed
    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, dyn FormLifecycle + 'static>, FormError> {
        self.form.try_borrow_mut().map_err(|_| {
            let path = self
                .form
                .try_borrow()
                .map_or_else(|_| "<borrowed>".to_string(), |form| form.core().path().to_string());
            FormError::InUse(path)
        })
    }

    /// Recover the concrete form type
    pub fn downcast<T: UiForm>(&self) -> Option<Rc<RefCell<T>>> {
        self.any.clone().downcast::<RefCell<T>>().ok()
    }

    /// Registry-assigned id
    pub fn id(&self) -> Option<FormId> {
        self.form.try_borrow().ok().and_then(|form| form.core().id())
    }

    /// Whether both handles point at the same instance
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.any, &other.any)
    }
}

impl fmt::Debug for FormRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.form.try_borrow() {
            Ok(form) => f
                .debug_struct("FormRef")
                .field("type", &form.type_name())
                .field("id", &form.core().id())
                .field("state", &form.core().state())
                .finish(),
            Err(_) => f.debug_struct("FormRef").finish_non_exhaustive(),
        }
    }
}
