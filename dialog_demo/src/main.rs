//! Dialog demo application
//!
//! Opens a pop-up confirmation dialog behind the loading overlay, plays its
//! scale-in animation from a fixed-step update loop and answers it with a
//! simulated button press.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use futures::executor::LocalPool;
use futures::task::{LocalSpawnExt, SpawnError};
use thiserror::Error;

use ui_frame::core::ConfigError;
use ui_frame::foundation::logging;
use ui_frame::prelude::*;
use ui_frame::scene::SceneError;
use ui_frame::ui::{BindingError, NodeLookup, ResultError};

/// Fixed update step (60 Hz)
const FRAME_TIME: f32 = 1.0 / 60.0;
/// Frame at which the simulated player clicks
const CLICK_FRAME: u32 = 45;
/// Give up after ten seconds of simulated time
const MAX_FRAMES: u32 = 600;

#[derive(Debug, Error)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Form error: {0}")]
    Form(#[from] FormError),

    #[error("No answer: {0}")]
    Result(#[from] ResultError),

    #[error("Failed to spawn the dialog task: {0}")]
    Spawn(#[from] SpawnError),

    #[error("Dialog still open after {0} frames")]
    Stalled(u32),
}

/// Yes/no question shown as a pop-up
struct ConfirmDialog {
    core: FormCore,
    question: String,
    confirm: Option<NodeId>,
    cancel: Option<NodeId>,
}

impl ConfirmDialog {
    /// Simulated button press; blocks further input until the dialog closes
    fn press(&mut self, ctx: &UiContext, confirmed: bool) -> Result<bool, FormError> {
        let button = if confirmed { self.confirm } else { self.cancel };
        log::info!("Pressed {:?} on '{}'", button, self.question);
        self.set_block_input(ctx, true)?;
        Ok(self.resolve(confirmed))
    }
}

#[async_trait(?Send)]
impl UiForm for ConfirmDialog {
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
        scene.create_node("question", panel)?;
        let buttons = scene.create_node("buttons", panel)?;
        scene.create_node("confirm", buttons)?;
        scene.create_node("cancel", buttons)?;
        Ok(())
    }

    fn bind_nodes(&mut self, nodes: &NodeLookup) -> Result<(), BindingError> {
        self.confirm = Some(nodes.require("confirm")?);
        self.cancel = Some(nodes.require("cancel")?);
        Ok(())
    }

    async fn load(&mut self, ctx: &UiContext) -> Result<(), FormError> {
        let id = self.core.id().ok_or(FormError::Detached)?;
        ctx.resources_mut().retain("atlas/dialog_frame", id);
        ctx.resources_mut().retain("fonts/body", id);
        Ok(())
    }

    fn on_show(&mut self, question: &String) {
        log::info!("Dialog shown: {}", question);
        self.question.clone_from(question);
    }

    fn on_hide(&mut self) {
        log::info!("Dialog hidden");
    }
}

impl FormType for ConfirmDialog {
    form_descriptor!();

    fn create(_ctx: &UiContext) -> Self {
        Self {
            core: FormCore::new(DisplayKind::PopUp)
                .with_mask(MaskKind::new(MaskOpacity::Lucency))
                .with_destroy_on_close(true),
            question: String::new(),
            confirm: None,
            cancel: None,
        }
    }
}

/// Loading indicator that reports to the log
#[derive(Default)]
struct StatusOverlay {
    visible: Cell<bool>,
}

#[async_trait(?Send)]
impl LoadingOverlay for StatusOverlay {
    async fn show_loading_form(&self) -> Result<(), FormError> {
        self.visible.set(true);
        log::info!("Loading...");
        Ok(())
    }

    async fn hide_loading_form(&self) -> Result<(), FormError> {
        self.visible.set(false);
        log::info!("Loading done");
        Ok(())
    }
}

/// Open the dialog, wait for the player's answer, then close it
async fn ask(ctx: &UiContext, question: &str) -> Result<bool, DemoError> {
    let dialog = ConfirmDialog::open_view_with_loading(ctx, question.to_string()).await?;
    let pending = dialog.borrow_mut().wait_promise();
    let answer = pending.await?;
    ConfirmDialog::close_view(ctx).await?;
    Ok(answer)
}

/// Press confirm on the dialog currently on screen
fn click_confirm(manager: &FormManager, ctx: &UiContext) -> Result<bool, FormError> {
    let path = ConfirmDialog::prefab_path(ctx);
    let Some(dialog) = manager
        .get(FormKey::Path(path))
        .and_then(|form| form.downcast::<ConfirmDialog>())
    else {
        log::warn!("No dialog on screen to click");
        return Ok(false);
    };
    let Ok(mut dialog) = dialog.try_borrow_mut() else {
        log::warn!("Dialog busy, click ignored");
        return Ok(false);
    };
    dialog.press(ctx, true)
}

fn main() -> Result<(), DemoError> {
    let config = FrameConfig::default();
    logging::init_with_level(&config.log_level);
    log::info!("Starting dialog demo...");

    let manager = Rc::new(FormManager::new());
    manager.register::<ConfirmDialog>();
    let tweens = Rc::new(TweenRunner::new());
    let ctx = UiContext::builder(manager.clone())
        .config(config)
        .loading(Rc::new(StatusOverlay::default()))
        .animator(tweens.clone())
        .build()?;

    let answer = Rc::new(RefCell::new(None));
    let mut pool = LocalPool::new();
    {
        let (ctx, answer) = (ctx.clone(), answer.clone());
        pool.spawner().spawn_local(async move {
            let outcome = ask(&ctx, "Quit to the main menu?").await;
            *answer.borrow_mut() = Some(outcome);
        })?;
    }

    for frame in 0..MAX_FRAMES {
        tweens.update(FRAME_TIME);
        pool.run_until_stalled();

        let outcome = answer.borrow_mut().take();
        if let Some(outcome) = outcome {
            let confirmed = outcome?;
            log::info!(
                "Player answered {} after {} frames; {} asset(s) still loaded",
                if confirmed { "yes" } else { "no" },
                frame,
                ctx.resources().loaded_count()
            );
            return Ok(());
        }

        if frame == CLICK_FRAME && !click_confirm(&manager, &ctx)? {
            log::warn!("Click at frame {} had no effect", frame);
        }
    }

    Err(DemoError::Stalled(MAX_FRAMES))
}
