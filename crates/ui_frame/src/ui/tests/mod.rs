//! End-to-end form scenarios
//!
//! Every scenario runs against a real [`FormManager`] and scene tree. Fixture
//! forms report their hook calls through a per-thread [`HookCalls`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;

use crate::form_descriptor;
use crate::foundation::math::Vec2;
use crate::scene::{NodeId, SceneError, SceneTree};
use crate::ui::animation::{AnimationError, AnimationSpec};
use crate::ui::binder::{BindingError, NodeLookup};
use crate::ui::form::{DisplayKind, FormCore, FormError, FormType, MaskKind, MaskOpacity, UiForm};
use crate::ui::services::{LoadingOverlay, UiContext};
use crate::ui::{FormManager, TweenRunner};

mod loading;
mod navigation;

/// Asset every fixture form that loads anything shares
pub(super) const SHARED_ATLAS: &str = "atlas/common";

/// Hook call counters
#[derive(Default)]
pub(super) struct HookCalls {
    pub loads: Cell<u32>,
    pub shows: Cell<u32>,
    pub hides: Cell<u32>,
}

impl HookCalls {
    fn bump(counter: &Cell<u32>) {
        counter.set(counter.get() + 1);
    }
}

thread_local! {
    static HOOK_CALLS: RefCell<Rc<HookCalls>> = RefCell::new(Rc::default());
}

pub(super) fn hook_calls() -> Rc<HookCalls> {
    HOOK_CALLS.with(|calls| calls.borrow().clone())
}

/// Loading overlay that counts calls and can be told to fail
#[derive(Default)]
pub(super) struct CountingOverlay {
    pub shows: Cell<u32>,
    pub hides: Cell<u32>,
    pub fail_show: Cell<bool>,
    pub fail_hide: Cell<bool>,
}

impl CountingOverlay {
    pub fn visible(&self) -> bool {
        self.shows.get() > self.hides.get()
    }
}

#[async_trait(?Send)]
impl LoadingOverlay for CountingOverlay {
    async fn show_loading_form(&self) -> Result<(), FormError> {
        if self.fail_show.get() {
            return Err(FormError::Overlay("show refused".to_string()));
        }
        HookCalls::bump(&self.shows);
        Ok(())
    }

    async fn hide_loading_form(&self) -> Result<(), FormError> {
        HookCalls::bump(&self.hides);
        if self.fail_hide.get() {
            return Err(FormError::Overlay("hide refused".to_string()));
        }
        Ok(())
    }
}

pub(super) struct Harness {
    pub ctx: UiContext,
    pub manager: Rc<FormManager>,
    pub overlay: Rc<CountingOverlay>,
}

impl Harness {
    /// Instant animations
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Frame-driven animations; call `update` on the returned runner
    pub fn with_tweens() -> (Self, Rc<TweenRunner>) {
        let tweens = Rc::new(TweenRunner::new());
        (Self::build(Some(tweens.clone())), tweens)
    }

    fn build(tweens: Option<Rc<TweenRunner>>) -> Self {
        HOOK_CALLS.with(|calls| *calls.borrow_mut() = Rc::default());

        let manager = Rc::new(FormManager::new());
        manager.register::<Dialog>();
        manager.register::<Hud>();
        manager.register::<Broken>();
        manager.register::<FailingLoad>();
        manager.register::<Drawer>();
        manager.register::<Glitchy>();

        let overlay = Rc::new(CountingOverlay::default());
        let mut builder = UiContext::builder(manager.clone()).loading(overlay.clone());
        if let Some(tweens) = tweens {
            builder = builder.animator(tweens);
        }
        let ctx = builder.build().unwrap();

        Self {
            ctx,
            manager,
            overlay,
        }
    }

    pub fn root_child(&self, name: &str) -> Option<NodeId> {
        let scene = self.ctx.scene();
        scene.find_descendant(scene.root(), name)
    }
}

/// Pop-up confirmation dialog, destroyed on close
pub(super) struct Dialog {
    core: FormCore,
    pub confirm: Option<NodeId>,
    pub message: String,
}

impl Dialog {
    /// Simulated click on the confirm button
    pub fn click_confirm(&mut self) -> bool {
        self.resolve(true)
    }
}

#[async_trait(?Send)]
impl UiForm for Dialog {
    type Params = String;
    type Output = bool;

    fn core(&self) -> &FormCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FormCore {
        &mut self.core
    }

    fn instantiate(&self, scene: &mut SceneTree, root: NodeId) -> Result<(), SceneError> {
        let panel = scene.create_node("panel", root)?;
        scene.create_node("title", panel)?;
        scene.create_node("confirm", panel)?;
        Ok(())
    }

    fn bind_nodes(&mut self, nodes: &NodeLookup) -> Result<(), BindingError> {
        self.confirm = Some(nodes.require("confirm")?);
        Ok(())
    }

    async fn load(&mut self, ctx: &UiContext) -> Result<(), FormError> {
        HookCalls::bump(&hook_calls().loads);
        let id = self.core.id().ok_or(FormError::Detached)?;
        ctx.resources_mut().retain(SHARED_ATLAS, id);
        Ok(())
    }

    fn on_show(&mut self, message: &String) {
        HookCalls::bump(&hook_calls().shows);
        self.message.clone_from(message);
    }

    fn on_hide(&mut self) {
        HookCalls::bump(&hook_calls().hides);
    }
}

impl FormType for Dialog {
    form_descriptor!();

    fn create(_ctx: &UiContext) -> Self {
        Self {
            core: FormCore::new(DisplayKind::PopUp).with_destroy_on_close(true),
            confirm: None,
            message: String::new(),
        }
    }
}

/// Fixed HUD kept alive between opens
pub(super) struct Hud {
    core: FormCore,
}

#[async_trait(?Send)]
impl UiForm for Hud {
    type Params = ();
    type Output = ();

    fn core(&self) -> &FormCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FormCore {
        &mut self.core
    }

    async fn load(&mut self, ctx: &UiContext) -> Result<(), FormError> {
        HookCalls::bump(&hook_calls().loads);
        let id = self.core.id().ok_or(FormError::Detached)?;
        ctx.resources_mut().retain(SHARED_ATLAS, id);
        Ok(())
    }

    fn on_show(&mut self, _params: &()) {
        HookCalls::bump(&hook_calls().shows);
    }

    fn on_hide(&mut self) {
        HookCalls::bump(&hook_calls().hides);
    }
}

impl FormType for Hud {
    form_descriptor!("hud/Main");

    fn create(_ctx: &UiContext) -> Self {
        Self {
            core: FormCore::new(DisplayKind::Fixed),
        }
    }
}

/// Window whose prefab lacks a node it binds
pub(super) struct Broken {
    core: FormCore,
}

impl UiForm for Broken {
    type Params = ();
    type Output = ();

    fn core(&self) -> &FormCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FormCore {
        &mut self.core
    }

    fn bind_nodes(&mut self, nodes: &NodeLookup) -> Result<(), BindingError> {
        nodes.require("missing").map(|_| ())
    }
}

impl FormType for Broken {
    form_descriptor!();

    fn create(_ctx: &UiContext) -> Self {
        Self {
            core: FormCore::new(DisplayKind::Window).with_destroy_on_close(true),
        }
    }
}

/// Pop-up whose load fails after it has retained an asset
pub(super) struct FailingLoad {
    core: FormCore,
}

#[async_trait(?Send)]
impl UiForm for FailingLoad {
    type Params = ();
    type Output = ();

    fn core(&self) -> &FormCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FormCore {
        &mut self.core
    }

    fn instantiate(&self, scene: &mut SceneTree, root: NodeId) -> Result<(), SceneError> {
        scene.create_node("content", root).map(|_| ())
    }

    async fn load(&mut self, ctx: &UiContext) -> Result<(), FormError> {
        HookCalls::bump(&hook_calls().loads);
        let id = self.core.id().ok_or(FormError::Detached)?;
        ctx.resources_mut().retain(SHARED_ATLAS, id);
        Err(FormError::load(self.core.path(), "disk unavailable"))
    }
}

impl FormType for FailingLoad {
    form_descriptor!();

    fn create(_ctx: &UiContext) -> Self {
        Self {
            core: FormCore::new(DisplayKind::PopUp)
                .with_mask(MaskKind::new(MaskOpacity::Lucency))
                .with_destroy_on_close(true),
        }
    }
}

/// Side panel kept between opens, sliding shut through the animation runner
pub(super) struct Drawer {
    core: FormCore,
}

#[async_trait(?Send)]
impl UiForm for Drawer {
    type Params = ();
    type Output = ();

    fn core(&self) -> &FormCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FormCore {
        &mut self.core
    }

    async fn load(&mut self, ctx: &UiContext) -> Result<(), FormError> {
        HookCalls::bump(&hook_calls().loads);
        let id = self.core.id().ok_or(FormError::Detached)?;
        ctx.resources_mut().retain(SHARED_ATLAS, id);
        Ok(())
    }

    fn on_show(&mut self, _params: &()) {
        HookCalls::bump(&hook_calls().shows);
    }

    fn on_hide(&mut self) {
        HookCalls::bump(&hook_calls().hides);
    }

    async fn hide_animation(&mut self, ctx: &UiContext) -> Result<(), AnimationError> {
        let Some(node) = self.core.node() else {
            return Ok(());
        };
        let spec = AnimationSpec::scale_to(Vec2::zeros(), ctx.config().show_animation);
        ctx.animator().run(ctx.scene_handle(), node, spec).await
    }
}

impl FormType for Drawer {
    form_descriptor!();

    fn create(_ctx: &UiContext) -> Self {
        Self {
            core: FormCore::new(DisplayKind::Window),
        }
    }
}

/// Window whose transitions always fail
pub(super) struct Glitchy {
    core: FormCore,
}

#[async_trait(?Send)]
impl UiForm for Glitchy {
    type Params = ();
    type Output = ();

    fn core(&self) -> &FormCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FormCore {
        &mut self.core
    }

    fn on_show(&mut self, _params: &()) {
        HookCalls::bump(&hook_calls().shows);
    }

    fn on_hide(&mut self) {
        HookCalls::bump(&hook_calls().hides);
    }

    async fn show_animation(&mut self, _ctx: &UiContext) -> Result<(), AnimationError> {
        let Some(node) = self.core.node() else {
            return Ok(());
        };
        Err(AnimationError::Interrupted(node))
    }

    async fn hide_animation(&mut self, _ctx: &UiContext) -> Result<(), AnimationError> {
        let Some(node) = self.core.node() else {
            return Ok(());
        };
        Err(AnimationError::Interrupted(node))
    }
}

impl FormType for Glitchy {
    form_descriptor!();

    fn create(_ctx: &UiContext) -> Self {
        Self {
            core: FormCore::new(DisplayKind::Window),
        }
    }
}
