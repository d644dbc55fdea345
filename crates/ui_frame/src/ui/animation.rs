//! Form transitions
//!
//! The lifecycle only needs one transition: pop-ups scale in from zero. It
//! hands an [`AnimationSpec`] to whatever [`AnimationRunner`] the context
//! carries and awaits completion.
//!
//! [`TweenRunner`] is the frame-driven runner: the update loop calls
//! [`TweenRunner::update`] with the frame delta, which advances every active
//! tween and completes its future when the duration has elapsed.
//! [`InstantRunner`] jumps straight to the end state.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use async_trait::async_trait;
use futures::channel::oneshot;
use thiserror::Error;

use crate::core::config::AnimationConfig;
use crate::foundation::math::{lerp, Easing, Vec2};
use crate::scene::{NodeId, SceneTree};
use crate::ui::form::{DisplayKind, FormCore};
use crate::ui::services::UiContext;

/// Animation failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnimationError {
    /// The animated node does not exist
    #[error("Animated node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// The tween stopped before finishing (node removed or runner dropped)
    #[error("Animation on {0:?} was interrupted")]
    Interrupted(NodeId),

    /// Duration is negative or not finite
    #[error("Invalid animation duration: {0}")]
    InvalidDuration(String),
}

/// Scale transition description
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    /// Scale at completion
    pub target_scale: Vec2,
    /// Duration in seconds
    pub duration: f32,
    /// Easing curve
    pub easing: Easing,
}

impl AnimationSpec {
    /// Scale the node to `target_scale` from whatever scale it has now
    pub fn scale_to(target_scale: Vec2, config: AnimationConfig) -> Self {
        Self {
            target_scale,
            duration: config.duration,
            easing: config.easing,
        }
    }

    fn validate(&self) -> Result<(), AnimationError> {
        if self.duration.is_finite() && self.duration >= 0.0 {
            Ok(())
        } else {
            Err(AnimationError::InvalidDuration(self.duration.to_string()))
        }
    }
}

/// Executes a transition and resolves when it completes
#[async_trait(?Send)]
pub trait AnimationRunner {
    /// Run `spec` on `node`
    async fn run(
        &self,
        scene: &Rc<RefCell<SceneTree>>,
        node: NodeId,
        spec: AnimationSpec,
    ) -> Result<(), AnimationError>;
}

/// Scale a pop-up form from zero to full size
///
/// Non-pop-up forms, and forms without a root node, resolve immediately
/// without touching the scene.
pub async fn pop_up_scale_in(core: &FormCore, ctx: &UiContext) -> Result<(), AnimationError> {
    if core.display != DisplayKind::PopUp {
        return Ok(());
    }
    let Some(node) = core.node() else {
        return Ok(());
    };

    ctx.scene_mut()
        .set_scale(node, Vec2::zeros())
        .map_err(|_| AnimationError::NodeNotFound(node))?;
    let spec = AnimationSpec::scale_to(Vec2::new(1.0, 1.0), ctx.config().show_animation);
    ctx.animator().run(ctx.scene_handle(), node, spec).await
}

struct Tween {
    scene: Weak<RefCell<SceneTree>>,
    node: NodeId,
    from: Vec2,
    spec: AnimationSpec,
    elapsed: f32,
    done: oneshot::Sender<Result<(), AnimationError>>,
}

impl Tween {
    /// Advance by `delta`, yielding the outcome once the tween has finished
    fn step(&mut self, delta: f32) -> Option<Result<(), AnimationError>> {
        let Some(scene) = self.scene.upgrade() else {
            return Some(Err(AnimationError::Interrupted(self.node)));
        };
        let Ok(mut tree) = scene.try_borrow_mut() else {
            // Retry next frame.
            return None;
        };

        self.elapsed += delta;
        let finished = self.elapsed >= self.spec.duration;
        let scale = if finished {
            self.spec.target_scale
        } else {
            let progress = self.spec.easing.apply(self.elapsed / self.spec.duration);
            lerp(self.from, self.spec.target_scale, progress)
        };

        if tree.set_scale(self.node, scale).is_err() {
            return Some(Err(AnimationError::Interrupted(self.node)));
        }
        finished.then_some(Ok(()))
    }
}

/// Frame-driven tween runner
#[derive(Default)]
pub struct TweenRunner {
    tweens: RefCell<Vec<Tween>>,
}

impl TweenRunner {
    /// Create a runner with no active tweens
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tweens still running
    pub fn active_count(&self) -> usize {
        self.tweens.borrow().len()
    }

    /// Advance all tweens by `delta` seconds, returning how many finished
    pub fn update(&self, delta: f32) -> usize {
        let tweens = std::mem::take(&mut *self.tweens.borrow_mut());
        let mut running = Vec::with_capacity(tweens.len());
        let mut completed = 0;

        for mut tween in tweens {
            match tween.step(delta) {
                None => running.push(tween),
                Some(outcome) => {
                    completed += 1;
                    if let Err(e) = &outcome {
                        log::warn!("Tween on {:?} ended early: {}", tween.node, e);
                    }
                    // The awaiting side may already be gone.
                    let _ = tween.done.send(outcome);
                }
            }
        }

        // Tweens started after the take stay queued behind the running ones.
        self.tweens.borrow_mut().splice(0..0, running);
        completed
    }
}

#[async_trait(?Send)]
impl AnimationRunner for TweenRunner {
    async fn run(
        &self,
        scene: &Rc<RefCell<SceneTree>>,
        node: NodeId,
        spec: AnimationSpec,
    ) -> Result<(), AnimationError> {
        spec.validate()?;
        let from = scene
            .borrow()
            .scale(node)
            .ok_or(AnimationError::NodeNotFound(node))?;

        let (done, finished) = oneshot::channel();
        self.tweens.borrow_mut().push(Tween {
            scene: Rc::downgrade(scene),
            node,
            from,
            spec,
            elapsed: 0.0,
            done,
        });
        log::trace!("Tween started on {:?}: {:?}", node, spec);

        finished
            .await
            .unwrap_or(Err(AnimationError::Interrupted(node)))
    }
}

/// Runner that applies the end state immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantRunner;

#[async_trait(?Send)]
impl AnimationRunner for InstantRunner {
    async fn run(
        &self,
        scene: &Rc<RefCell<SceneTree>>,
        node: NodeId,
        spec: AnimationSpec,
    ) -> Result<(), AnimationError> {
        spec.validate()?;
        scene
            .borrow_mut()
            .set_scale(node, spec.target_scale)
            .map_err(|_| AnimationError::NodeNotFound(node))
    }
}
