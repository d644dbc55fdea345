//! Collaborator contracts and the context that carries them
//!
//! The form core never reaches for globals. Its collaborators and the shared
//! scene and resource state travel in a cheaply cloned [`UiContext`].

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use async_trait::async_trait;

use crate::assets::ResourceCache;
use crate::core::config::{ConfigError, FrameConfig};
use crate::foundation::math::Vec2;
use crate::scene::SceneTree;
use crate::ui::animation::{AnimationRunner, InstantRunner};
use crate::ui::binder::{NodeBinder, SceneBinder};
use crate::ui::form::{FormError, FormKey, FormParams, FormRef};
use crate::ui::screen::FixedScreen;

/// Owns the open/close bookkeeping and instance policy
#[async_trait(?Send)]
pub trait FormRegistry {
    /// Open (or surface) the form registered under `path`
    async fn open(&self, ctx: &UiContext, path: &str, params: FormParams) -> Result<FormRef, FormError>;

    /// Close the form identified by `key`; false when none was open
    async fn close(&self, ctx: &UiContext, key: FormKey<'_>) -> Result<bool, FormError>;
}

/// Reports the visible viewport
pub trait ScreenAdapter {
    /// Current visible size in pixels
    fn visible_size(&self) -> Vec2;
}

/// Blocking loading indicator
#[async_trait(?Send)]
pub trait LoadingOverlay {
    /// Show the indicator
    async fn show_loading_form(&self) -> Result<(), FormError>;

    /// Hide the indicator
    async fn hide_loading_form(&self) -> Result<(), FormError>;
}

/// Overlay for headless runs; it only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessOverlay;

#[async_trait(?Send)]
impl LoadingOverlay for HeadlessOverlay {
    async fn show_loading_form(&self) -> Result<(), FormError> {
        log::debug!("Loading overlay shown");
        Ok(())
    }

    async fn hide_loading_form(&self) -> Result<(), FormError> {
        log::debug!("Loading overlay hidden");
        Ok(())
    }
}

struct ContextInner {
    config: RefCell<FrameConfig>,
    scene: Rc<RefCell<SceneTree>>,
    resources: RefCell<ResourceCache>,
    registry: Rc<dyn FormRegistry>,
    binder: Rc<dyn NodeBinder>,
    screen: Rc<dyn ScreenAdapter>,
    loading: Rc<dyn LoadingOverlay>,
    animator: Rc<dyn AnimationRunner>,
}

/// Shared handle to the UI frame's services
#[derive(Clone)]
pub struct UiContext {
    inner: Rc<ContextInner>,
}

impl UiContext {
    /// Start building a context around `registry`
    pub fn builder(registry: Rc<dyn FormRegistry>) -> UiContextBuilder {
        UiContextBuilder {
            config: FrameConfig::default(),
            registry,
            scene: None,
            binder: None,
            screen: None,
            loading: None,
            animator: None,
        }
    }

    /// Frame configuration
    pub fn config(&self) -> Ref<'_, FrameConfig> {
        self.inner.config.borrow()
    }

    /// Frame configuration, mutably
    ///
    /// Changing `ui_path_root` only affects form types whose path has not
    /// been resolved yet.
    pub fn config_mut(&self) -> RefMut<'_, FrameConfig> {
        self.inner.config.borrow_mut()
    }

    /// Scene tree
    pub fn scene(&self) -> Ref<'_, SceneTree> {
        self.inner.scene.borrow()
    }

    /// Scene tree, mutably
    pub fn scene_mut(&self) -> RefMut<'_, SceneTree> {
        self.inner.scene.borrow_mut()
    }

    /// Shared scene handle, for owners that outlive a single borrow
    pub fn scene_handle(&self) -> &Rc<RefCell<SceneTree>> {
        &self.inner.scene
    }

    /// Resource cache
    pub fn resources(&self) -> Ref<'_, ResourceCache> {
        self.inner.resources.borrow()
    }

    /// Resource cache, mutably
    pub fn resources_mut(&self) -> RefMut<'_, ResourceCache> {
        self.inner.resources.borrow_mut()
    }

    /// Form registry
    pub fn registry(&self) -> Rc<dyn FormRegistry> {
        self.inner.registry.clone()
    }

    /// Node binder
    pub fn binder(&self) -> &dyn NodeBinder {
        self.inner.binder.as_ref()
    }

    /// Screen adapter
    pub fn screen(&self) -> &dyn ScreenAdapter {
        self.inner.screen.as_ref()
    }

    /// Loading overlay
    pub fn loading(&self) -> Rc<dyn LoadingOverlay> {
        self.inner.loading.clone()
    }

    /// Animation runner
    pub fn animator(&self) -> Rc<dyn AnimationRunner> {
        self.inner.animator.clone()
    }
}

/// Builder for [`UiContext`]
///
/// Unset collaborators fall back to the scene binder, a fixed 1280x720
/// screen, the headless overlay and the instant animation runner.
pub struct UiContextBuilder {
    config: FrameConfig,
    registry: Rc<dyn FormRegistry>,
    scene: Option<Rc<RefCell<SceneTree>>>,
    binder: Option<Rc<dyn NodeBinder>>,
    screen: Option<Rc<dyn ScreenAdapter>>,
    loading: Option<Rc<dyn LoadingOverlay>>,
    animator: Option<Rc<dyn AnimationRunner>>,
}

impl UiContextBuilder {
    /// Use `config`
    pub fn config(mut self, config: FrameConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing scene tree
    pub fn scene(mut self, scene: Rc<RefCell<SceneTree>>) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Use a custom node binder
    pub fn binder(mut self, binder: Rc<dyn NodeBinder>) -> Self {
        self.binder = Some(binder);
        self
    }

    /// Use a custom screen adapter
    pub fn screen(mut self, screen: Rc<dyn ScreenAdapter>) -> Self {
        self.screen = Some(screen);
        self
    }

    /// Use a custom loading overlay
    pub fn loading(mut self, loading: Rc<dyn LoadingOverlay>) -> Self {
        self.loading = Some(loading);
        self
    }

    /// Use a custom animation runner
    pub fn animator(mut self, animator: Rc<dyn AnimationRunner>) -> Self {
        self.animator = Some(animator);
        self
    }

    /// Validate the configuration and build the context
    pub fn build(self) -> Result<UiContext, ConfigError> {
        self.config.validate()?;
        log::info!("UI frame ready (path root '{}')", self.config.ui_path_root);

        Ok(UiContext {
            inner: Rc::new(ContextInner {
                config: RefCell::new(self.config),
                scene: self.scene.unwrap_or_default(),
                resources: RefCell::new(ResourceCache::new()),
                registry: self.registry,
                binder: self.binder.unwrap_or_else(|| Rc::new(SceneBinder)),
                screen: self.screen.unwrap_or_else(|| Rc::new(FixedScreen::default())),
                loading: self.loading.unwrap_or_else(|| Rc::new(HeadlessOverlay)),
                animator: self.animator.unwrap_or_else(|| Rc::new(InstantRunner)),
            }),
        })
    }
}
